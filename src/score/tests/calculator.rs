use std::sync::Arc;

use serde_json::json;

use super::common::*;
use crate::score::{
    CalculationError, QuestionnaireValidator, RuleCatalog, ScoreCalculator,
};

#[test]
fn characterization_sums_four_sub_steps() {
    let questionnaire = validated(&valid_answers());
    let points = calculator()
        .characterization_points(questionnaire.characterization())
        .expect("step 1 priced");
    assert_eq!(points, 0.0 + 1.0 + 0.5 + 0.5);
}

#[test]
fn typing_method_uses_its_option_points() {
    let questionnaire = validated(&valid_answers());
    let points = calculator()
        .typing_points(questionnaire.typing())
        .expect("step 2 priced");
    assert_eq!(points, 3.0);
}

#[test]
fn statistics_with_single_selections() {
    let questionnaire = validated(&valid_answers());
    let points = calculator()
        .statistics_points(questionnaire.statistics())
        .expect("step 3 priced");
    assert_eq!(points, 1.0 + 1.0 + 1.0);
}

#[test]
fn statistics_with_list_selections_sum_each_option() {
    let raw = valid_answers();
    let raw = with_answer(
        raw,
        "step_3",
        "a_statistics_p_value",
        json!("GWAS <1x10e-14, Non-GWAS <0.0001"),
    );
    let raw = with_answer(
        raw,
        "step_3",
        "b_multiple_testing_correction",
        json!([
            "Overall correction for multiple testing",
            "2-step p-value correction"
        ]),
    );
    let raw = with_answer(
        raw,
        "step_3",
        "c_statistics_effect_size",
        json!([
            "OR/RR: ≥2 or ≤0.5, Beta: ≥0.5 or ≤-0.5",
            "CI does not cross 1 (OR/RR) or 0 (beta)"
        ]),
    );

    let questionnaire = validated(&raw);
    let points = calculator()
        .statistics_points(questionnaire.statistics())
        .expect("step 3 priced");
    assert_eq!(points, 2.0 + (1.0 + 2.0) + (1.0 + 1.0));
}

#[test]
fn list_order_does_not_change_step_three() {
    let forward = with_answer(
        valid_answers(),
        "step_3",
        "b_multiple_testing_correction",
        json!([
            "Overall correction for multiple testing",
            "2-step p-value correction"
        ]),
    );
    let reversed = with_answer(
        valid_answers(),
        "step_3",
        "b_multiple_testing_correction",
        json!([
            "2-step p-value correction",
            "Overall correction for multiple testing"
        ]),
    );

    let calculator = calculator();
    let forward = calculator
        .statistics_points(validated(&forward).statistics())
        .expect("priced");
    let reversed = calculator
        .statistics_points(validated(&reversed).statistics())
        .expect("priced");
    assert_eq!(forward, reversed);
}

#[test]
fn cohort_and_phenotype_are_priced_from_their_own_fields() {
    let raw = with_answer(
        valid_answers(),
        "step_5",
        "additional_phenotypes",
        json!("specific disease-related phenotype"),
    );
    let questionnaire = validated(&raw);
    let calculator = calculator();

    assert_eq!(
        calculator.cohort_points(questionnaire.cohort()).expect("step 4"),
        2.0
    );
    assert_eq!(
        calculator
            .phenotype_points(questionnaire.phenotype())
            .expect("step 5"),
        2.0
    );

    let breakdown = calculator.breakdown(&questionnaire).expect("scored");
    assert_eq!(breakdown.step_4, 2.0);
    assert_eq!(breakdown.step_5, 2.0);
    assert_eq!(breakdown.additive_total, 2.0 + 3.0 + 3.0 + 2.0 + 2.0);
}

#[test]
fn weighting_multiplies_both_factors() {
    let questionnaire = validated(&valid_answers());
    let factor = calculator()
        .weighting_factor(questionnaire.weighting())
        .expect("step 6 priced");
    assert_eq!(factor, 1.0 * 0.5);
}

#[test]
fn final_score_weights_the_additive_total() {
    let questionnaire = validated(&valid_answers());
    let breakdown = calculator().breakdown(&questionnaire).expect("scored");

    assert_eq!(breakdown.additive_total, 10.0);
    assert_eq!(breakdown.weighting_factor, 0.5);
    assert_eq!(breakdown.score, 5.0);
    assert_eq!(
        breakdown.score,
        (breakdown.step_1 + breakdown.step_2 + breakdown.step_3 + breakdown.step_4 + breakdown.step_5)
            * breakdown.weighting_factor
    );
}

#[test]
fn insignificant_association_zeroes_only_the_product() {
    let raw = with_answer(
        valid_answers(),
        "step_6",
        "a_weighing_association",
        json!("no significant association with disease"),
    );
    let breakdown = calculator()
        .breakdown(&validated(&raw))
        .expect("scored");

    assert_eq!(breakdown.additive_total, 10.0);
    assert_eq!(breakdown.weighting_factor, 0.0);
    assert_eq!(breakdown.score, 0.0);
}

#[test]
fn calculation_is_bit_for_bit_repeatable() {
    let questionnaire = validated(&valid_answers());
    let calculator = calculator();
    let first = calculator.calculate(&questionnaire).expect("scored");
    let second = calculator.calculate(&questionnaire.clone()).expect("scored");
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn breakdown_records_every_sub_step() {
    let breakdown = calculator()
        .breakdown(&validated(&valid_answers()))
        .expect("scored");

    let ids: Vec<_> = breakdown
        .contributions
        .iter()
        .map(|contribution| contribution.step_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["1A", "1B", "1C", "1D", "2", "3A", "3B", "3C", "4", "5", "6A", "6B"]
    );

    let zygosity = &breakdown.contributions[2];
    assert_eq!(zygosity.display_name, "Zygosity");
    assert_eq!(zygosity.selections, vec!["Biallelic (homozygous)".to_string()]);
    assert_eq!(zygosity.points, 0.5);
}

#[test]
fn mismatched_catalog_aborts_instead_of_defaulting() {
    let questionnaire = validated(&valid_answers());
    let other = RuleCatalog::new(
        RuleCatalog::standard()
            .steps()
            .iter()
            .filter(|step| step.step_id != "2")
            .cloned()
            .collect(),
    )
    .expect("reduced catalog is well formed");

    let err = ScoreCalculator::new(Arc::new(other))
        .calculate(&questionnaire)
        .expect_err("step 2 cannot be priced");

    assert_eq!(
        err,
        CalculationError::UnknownOption {
            step_id: "2".to_string(),
            option: "Low Resolution Typing".to_string(),
        }
    );
}

#[test]
fn substituted_catalog_changes_pricing_consistently() {
    let catalog = Arc::new(catalog_with_phenotype_points(5.0, 1.0));
    let validator = QuestionnaireValidator::new(Arc::clone(&catalog)).expect("validator builds");
    let calculator = ScoreCalculator::new(catalog);

    let questionnaire = validator.validate(&valid_answers()).expect("valid");
    let breakdown = calculator.breakdown(&questionnaire).expect("scored");

    assert_eq!(breakdown.step_5, 1.0);
    assert_eq!(breakdown.score, (10.0 + 1.0) * 0.5);
}
