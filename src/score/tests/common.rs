use std::sync::Arc;

use serde_json::{json, Value};

use crate::score::{
    AnswerOption, Questionnaire, QuestionnaireValidator, RuleCatalog, ScoreCalculator,
    ScoringEngine, Step,
};

pub(super) fn standard_catalog() -> Arc<RuleCatalog> {
    Arc::new(RuleCatalog::standard())
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard().expect("standard engine builds")
}

pub(super) fn validator() -> QuestionnaireValidator {
    QuestionnaireValidator::new(standard_catalog()).expect("validator builds")
}

pub(super) fn calculator() -> ScoreCalculator {
    ScoreCalculator::new(standard_catalog())
}

/// A complete questionnaire worth (2 + 3 + 3 + 2 + 0) * 0.5 = 5.0.
pub(super) fn valid_answers() -> Value {
    json!({
        "step_1": {
            "a_allele_or_haplotype": "Allele",
            "b_allele_resolution": "2-field",
            "c_zygosity": "Biallelic (homozygous)",
            "d_phase": "Phase confirmed"
        },
        "step_2": {
            "typing_method": "Low Resolution Typing"
        },
        "step_3": {
            "a_statistics_p_value": "GWAS <5x10e-8, Non-GWAS <0.01",
            "b_multiple_testing_correction": "Overall correction for multiple testing",
            "c_statistics_effect_size": "OR/RR: ≥2 or ≤0.5, Beta: ≥0.5 or ≤-0.5"
        },
        "step_4": {
            "cohort_size": "GWAS 2,500-4,999, Non-GWAS 100-249"
        },
        "step_5": {
            "additional_phenotypes": "only disease tested"
        },
        "step_6": {
            "a_weighing_association": "significant association with disease",
            "b_low_field_resolution": "1-field resolution (from Step 1B)"
        }
    })
}

pub(super) fn with_answer(mut raw: Value, section: &str, key: &str, value: Value) -> Value {
    raw[section][key] = value;
    raw
}

pub(super) fn without_answer(mut raw: Value, section: &str, key: &str) -> Value {
    if let Some(section) = raw.get_mut(section).and_then(Value::as_object_mut) {
        section.remove(key);
    }
    raw
}

pub(super) fn validated(raw: &Value) -> Questionnaire {
    validator().validate(raw).expect("answers validate")
}

/// Standard catalog with step 5 re-priced, for catalog substitution tests.
pub(super) fn catalog_with_phenotype_points(specific: f64, only_disease: f64) -> RuleCatalog {
    let steps = RuleCatalog::standard()
        .steps()
        .iter()
        .cloned()
        .map(|step| {
            if step.step_id == "5" {
                Step::new(
                    step.step_id,
                    step.display_name,
                    vec![
                        AnswerOption::new("specific disease-related phenotype", specific),
                        AnswerOption::new("only disease tested", only_disease),
                    ],
                )
            } else {
                step
            }
        })
        .collect();
    RuleCatalog::new(steps).expect("re-priced catalog is well formed")
}
