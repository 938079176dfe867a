use serde_json::json;

use super::common::*;
use crate::score::{ScoreError, ScoringEngine};

#[test]
fn scores_valid_answers_end_to_end() {
    let outcome = engine().score(&valid_answers()).expect("scored");
    assert_eq!(outcome.score(), 5.0);
    assert_eq!(
        outcome.questionnaire.cohort().cohort_size(),
        "GWAS 2,500-4,999, Non-GWAS 100-249"
    );
}

#[test]
fn invalid_answers_never_produce_a_score() {
    let raw = with_answer(
        valid_answers(),
        "step_1",
        "a_allele_or_haplotype",
        json!("Genotype"),
    );

    match engine().score(&raw) {
        Err(ScoreError::Validation(err)) => {
            assert!(err.issue_for_step("1A").is_some());
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn schema_lists_fields_with_their_options() {
    let schema = engine().schema().expect("schema builds");

    assert_eq!(schema.len(), 12);
    let correction = schema
        .iter()
        .find(|field| field.step_id == "3B")
        .expect("3B present");
    assert_eq!(correction.field, "step_3.b_multiple_testing_correction");
    assert_eq!(correction.display_name, "Multiple Testing Correction");
    assert!(correction.accepts_list);
    assert_eq!(
        correction.options,
        vec![
            "Overall correction for multiple testing".to_string(),
            "2-step p-value correction".to_string()
        ]
    );
    assert!(schema
        .iter()
        .filter(|field| field.step_id != "3B" && field.step_id != "3C")
        .all(|field| !field.accepts_list));
}

#[test]
fn engine_refuses_a_catalog_missing_questionnaire_steps() {
    let reduced = crate::score::RuleCatalog::new(
        crate::score::RuleCatalog::standard()
            .steps()
            .iter()
            .filter(|step| step.step_id != "6B")
            .cloned()
            .collect(),
    )
    .expect("reduced catalog is well formed");

    let err = ScoringEngine::new(std::sync::Arc::new(reduced)).expect_err("6B required");
    assert_eq!(err.to_string(), "no scoring step registered for '6B'");
}

#[test]
fn validated_questionnaire_serialises_with_input_keys() {
    let questionnaire = engine().validate(&valid_answers()).expect("valid");
    let json = serde_json::to_value(&questionnaire).expect("serialises");
    assert_eq!(json, valid_answers());
}
