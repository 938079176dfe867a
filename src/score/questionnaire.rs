use serde::Serialize;

use super::catalog::step_ids;

/// Answer to a step that accepts either one option or a set of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Single(String),
    Multiple(Vec<String>),
}

impl Selection {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Selection::Single(name) => vec![name.as_str()],
            Selection::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Where a questionnaire field lives in the raw input and which step scores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub section: &'static str,
    pub key: &'static str,
    pub step_id: &'static str,
    pub accepts_list: bool,
}

impl FieldSpec {
    const fn single(section: &'static str, key: &'static str, step_id: &'static str) -> Self {
        Self {
            section,
            key,
            step_id,
            accepts_list: false,
        }
    }

    const fn list(section: &'static str, key: &'static str, step_id: &'static str) -> Self {
        Self {
            section,
            key,
            step_id,
            accepts_list: true,
        }
    }

    /// Dotted path used in validation reports, e.g. `step_1.a_allele_or_haplotype`.
    pub fn path(&self) -> String {
        format!("{}.{}", self.section, self.key)
    }
}

pub const ALLELE_OR_HAPLOTYPE: FieldSpec =
    FieldSpec::single("step_1", "a_allele_or_haplotype", step_ids::ALLELE_OR_HAPLOTYPE);
pub const ALLELE_RESOLUTION: FieldSpec =
    FieldSpec::single("step_1", "b_allele_resolution", step_ids::ALLELE_RESOLUTION);
pub const ZYGOSITY: FieldSpec = FieldSpec::single("step_1", "c_zygosity", step_ids::ZYGOSITY);
pub const PHASE: FieldSpec = FieldSpec::single("step_1", "d_phase", step_ids::PHASE);
pub const TYPING_METHOD: FieldSpec =
    FieldSpec::single("step_2", "typing_method", step_ids::TYPING_METHOD);
pub const P_VALUE: FieldSpec =
    FieldSpec::single("step_3", "a_statistics_p_value", step_ids::P_VALUE);
pub const MULTIPLE_TESTING_CORRECTION: FieldSpec = FieldSpec::list(
    "step_3",
    "b_multiple_testing_correction",
    step_ids::MULTIPLE_TESTING_CORRECTION,
);
pub const EFFECT_SIZE: FieldSpec =
    FieldSpec::list("step_3", "c_statistics_effect_size", step_ids::EFFECT_SIZE);
pub const COHORT_SIZE: FieldSpec = FieldSpec::single("step_4", "cohort_size", step_ids::COHORT_SIZE);
pub const ADDITIONAL_PHENOTYPES: FieldSpec = FieldSpec::single(
    "step_5",
    "additional_phenotypes",
    step_ids::ADDITIONAL_PHENOTYPES,
);
pub const WEIGHING_ASSOCIATION: FieldSpec = FieldSpec::single(
    "step_6",
    "a_weighing_association",
    step_ids::WEIGHING_ASSOCIATION,
);
pub const LOW_FIELD_RESOLUTION: FieldSpec = FieldSpec::single(
    "step_6",
    "b_low_field_resolution",
    step_ids::LOW_FIELD_RESOLUTION,
);

/// Every questionnaire field in scoring order.
pub const QUESTIONNAIRE_FIELDS: [FieldSpec; 12] = [
    ALLELE_OR_HAPLOTYPE,
    ALLELE_RESOLUTION,
    ZYGOSITY,
    PHASE,
    TYPING_METHOD,
    P_VALUE,
    MULTIPLE_TESTING_CORRECTION,
    EFFECT_SIZE,
    COHORT_SIZE,
    ADDITIONAL_PHENOTYPES,
    WEIGHING_ASSOCIATION,
    LOW_FIELD_RESOLUTION,
];

/// Step 1: what was typed and how precisely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Characterization {
    #[serde(rename = "a_allele_or_haplotype")]
    pub(crate) allele_or_haplotype: String,
    #[serde(rename = "b_allele_resolution")]
    pub(crate) allele_resolution: String,
    #[serde(rename = "c_zygosity")]
    pub(crate) zygosity: String,
    #[serde(rename = "d_phase")]
    pub(crate) phase: String,
}

impl Characterization {
    pub fn allele_or_haplotype(&self) -> &str {
        &self.allele_or_haplotype
    }

    pub fn allele_resolution(&self) -> &str {
        &self.allele_resolution
    }

    pub fn zygosity(&self) -> &str {
        &self.zygosity
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }
}

/// Step 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypingMethod {
    pub(crate) typing_method: String,
}

impl TypingMethod {
    pub fn typing_method(&self) -> &str {
        &self.typing_method
    }
}

/// Step 3: significance, correction and effect size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticalSupport {
    #[serde(rename = "a_statistics_p_value")]
    pub(crate) p_value: String,
    #[serde(rename = "b_multiple_testing_correction")]
    pub(crate) multiple_testing_correction: Selection,
    #[serde(rename = "c_statistics_effect_size")]
    pub(crate) effect_size: Selection,
}

impl StatisticalSupport {
    pub fn p_value(&self) -> &str {
        &self.p_value
    }

    pub fn multiple_testing_correction(&self) -> &Selection {
        &self.multiple_testing_correction
    }

    pub fn effect_size(&self) -> &Selection {
        &self.effect_size
    }
}

/// Step 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortSize {
    pub(crate) cohort_size: String,
}

impl CohortSize {
    pub fn cohort_size(&self) -> &str {
        &self.cohort_size
    }
}

/// Step 5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhenotypeSpecificity {
    pub(crate) additional_phenotypes: String,
}

impl PhenotypeSpecificity {
    pub fn additional_phenotypes(&self) -> &str {
        &self.additional_phenotypes
    }
}

/// Step 6: multiplicative weighting factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Weighting {
    #[serde(rename = "a_weighing_association")]
    pub(crate) weighing_association: String,
    #[serde(rename = "b_low_field_resolution")]
    pub(crate) low_field_resolution: String,
}

impl Weighting {
    pub fn weighing_association(&self) -> &str {
        &self.weighing_association
    }

    pub fn low_field_resolution(&self) -> &str {
        &self.low_field_resolution
    }
}

/// A curator's answers after validation against the rule catalog.
///
/// Only [`QuestionnaireValidator`](super::QuestionnaireValidator) builds these,
/// so every value is a canonical option name for its step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Questionnaire {
    pub(crate) step_1: Characterization,
    pub(crate) step_2: TypingMethod,
    pub(crate) step_3: StatisticalSupport,
    pub(crate) step_4: CohortSize,
    pub(crate) step_5: PhenotypeSpecificity,
    pub(crate) step_6: Weighting,
}

impl Questionnaire {
    pub fn characterization(&self) -> &Characterization {
        &self.step_1
    }

    pub fn typing(&self) -> &TypingMethod {
        &self.step_2
    }

    pub fn statistics(&self) -> &StatisticalSupport {
        &self.step_3
    }

    pub fn cohort(&self) -> &CohortSize {
        &self.step_4
    }

    pub fn phenotype(&self) -> &PhenotypeSpecificity {
        &self.step_5
    }

    pub fn weighting(&self) -> &Weighting {
        &self.step_6
    }
}
