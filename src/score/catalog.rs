use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

/// Step identifiers used by the HLA scoring framework.
pub mod step_ids {
    pub const ALLELE_OR_HAPLOTYPE: &str = "1A";
    pub const ALLELE_RESOLUTION: &str = "1B";
    pub const ZYGOSITY: &str = "1C";
    pub const PHASE: &str = "1D";
    pub const TYPING_METHOD: &str = "2";
    pub const P_VALUE: &str = "3A";
    pub const MULTIPLE_TESTING_CORRECTION: &str = "3B";
    pub const EFFECT_SIZE: &str = "3C";
    pub const COHORT_SIZE: &str = "4";
    pub const ADDITIONAL_PHENOTYPES: &str = "5";
    pub const WEIGHING_ASSOCIATION: &str = "6A";
    pub const LOW_FIELD_RESOLUTION: &str = "6B";
}

/// Lookup and construction failures for the rule catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("no scoring step registered for '{0}'")]
    UnknownStep(String),
    #[error("scoring step '{0}' defines no options")]
    EmptyStep(String),
    #[error("scoring step '{0}' is defined more than once")]
    DuplicateStep(String),
    #[error("scoring step '{step_id}' repeats option '{option}'")]
    DuplicateOption { step_id: String, option: String },
}

/// A legal answer for one scoring step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOption {
    pub name: String,
    pub points: f64,
}

impl AnswerOption {
    pub fn new(name: impl Into<String>, points: f64) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// One question in the scoring framework with its ordered options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub step_id: String,
    pub display_name: String,
    pub options: Vec<AnswerOption>,
}

impl Step {
    pub fn new(
        step_id: impl Into<String>,
        display_name: impl Into<String>,
        options: Vec<AnswerOption>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            display_name: display_name.into(),
            options,
        }
    }
}

/// Immutable table of every scoring step, its legal options, and their points.
///
/// Built once and shared (usually behind an `Arc`) between the validator and
/// the calculator so both agree on what a legal answer is worth.
#[derive(Debug, Clone, Serialize)]
pub struct RuleCatalog {
    steps: Vec<Step>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl RuleCatalog {
    /// Build a catalog, enforcing non-empty option lists and unique names.
    pub fn new(steps: Vec<Step>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(steps.len());

        for (position, step) in steps.iter().enumerate() {
            if step.options.is_empty() {
                return Err(CatalogError::EmptyStep(step.step_id.clone()));
            }

            let mut seen = HashSet::with_capacity(step.options.len());
            for option in &step.options {
                if !seen.insert(option.name.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        step_id: step.step_id.clone(),
                        option: option.name.clone(),
                    });
                }
            }

            if index.insert(step.step_id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateStep(step.step_id.clone()));
            }
        }

        Ok(Self { steps, index })
    }

    /// The HLA framework catalog used for curation scoring.
    pub fn standard() -> Self {
        Self::new(standard_steps()).expect("built-in HLA scoring steps are well formed")
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.index.get(step_id).map(|&position| &self.steps[position])
    }

    /// Option names for `step_id`, in definition order.
    pub fn option_names(&self, step_id: &str) -> Result<Vec<&str>, CatalogError> {
        let step = self
            .step(step_id)
            .ok_or_else(|| CatalogError::UnknownStep(step_id.to_string()))?;

        Ok(step
            .options
            .iter()
            .map(|option| option.name.as_str())
            .collect())
    }

    /// Name to points table for `step_id`. Unknown steps yield an empty map.
    pub fn option_points_map(&self, step_id: &str) -> BTreeMap<&str, f64> {
        self.step(step_id)
            .map(|step| {
                step.options
                    .iter()
                    .map(|option| (option.name.as_str(), option.points))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn standard_steps() -> Vec<Step> {
    use step_ids::*;

    vec![
        Step::new(
            ALLELE_OR_HAPLOTYPE,
            "Allele or Haplotype",
            vec![
                AnswerOption::new("Allele", 0.0),
                AnswerOption::new("Haplotype", 2.0),
            ],
        ),
        Step::new(
            ALLELE_RESOLUTION,
            "Allele Resolution",
            vec![
                AnswerOption::new("1-field", 0.0),
                AnswerOption::new("2-field", 1.0),
                AnswerOption::new("3-field, G-group, P-group", 2.0),
                AnswerOption::new("4-field", 3.0),
            ],
        ),
        Step::new(
            ZYGOSITY,
            "Zygosity",
            vec![
                AnswerOption::new("Monoallelic (heterozygous)", 0.0),
                AnswerOption::new("Biallelic (homozygous)", 0.5),
            ],
        ),
        Step::new(
            PHASE,
            "Phase",
            vec![
                AnswerOption::new("Phase not confirmed", 0.0),
                AnswerOption::new("Phase confirmed", 0.5),
            ],
        ),
        Step::new(
            TYPING_METHOD,
            "Typing Method",
            vec![
                AnswerOption::new("Tag SNPs or Microarrays", 0.0),
                AnswerOption::new("Serological", 1.0),
                AnswerOption::new("Imputation", 2.0),
                AnswerOption::new("Low Resolution Typing", 3.0),
                AnswerOption::new("High Resolution Typing", 3.0),
                AnswerOption::new("Whole Exome Sequencing", 3.0),
                AnswerOption::new("Sanger Sequencing-Based Typing", 4.0),
                AnswerOption::new("Whole Gene Sequencing", 4.0),
                AnswerOption::new(
                    "Whole Genome Sequencing and/or Panel-Based NGS (>50x coverage)",
                    5.0,
                ),
            ],
        ),
        Step::new(
            P_VALUE,
            "Statistics (p-value)",
            vec![
                AnswerOption::new("GWAS >=1x10e-5, Non-GWAS >=0.05", 0.0),
                AnswerOption::new("GWAS <1x10e-5, Non-GWAS <0.05", 0.5),
                AnswerOption::new("GWAS <5x10e-8, Non-GWAS <0.01", 1.0),
                AnswerOption::new("GWAS <1x10e-11, Non-GWAS <0.0005", 1.5),
                AnswerOption::new("GWAS <1x10e-14, Non-GWAS <0.0001", 2.0),
            ],
        ),
        Step::new(
            MULTIPLE_TESTING_CORRECTION,
            "Multiple Testing Correction",
            vec![
                AnswerOption::new("Overall correction for multiple testing", 1.0),
                AnswerOption::new("2-step p-value correction", 2.0),
            ],
        ),
        Step::new(
            EFFECT_SIZE,
            "Statistics (Effect Size)",
            vec![
                AnswerOption::new("OR/RR: ≥2 or ≤0.5, Beta: ≥0.5 or ≤-0.5", 1.0),
                AnswerOption::new("CI does not cross 1 (OR/RR) or 0 (beta)", 1.0),
            ],
        ),
        Step::new(
            COHORT_SIZE,
            "Cohort Size",
            vec![
                AnswerOption::new("GWAS <1,000, Non-GWAS <50", 0.0),
                AnswerOption::new("GWAS 1,000-2,499, Non-GWAS 50-99", 1.0),
                AnswerOption::new("GWAS 2,500-4,999, Non-GWAS 100-249", 2.0),
                AnswerOption::new("GWAS 5,000-9,999, Non-GWAS 250-499", 3.0),
                AnswerOption::new("GWAS >=10,000, Non-GWAS >=500", 4.0),
            ],
        ),
        Step::new(
            ADDITIONAL_PHENOTYPES,
            "Additional Phenotypes",
            vec![
                AnswerOption::new("specific disease-related phenotype", 2.0),
                AnswerOption::new("only disease tested", 0.0),
            ],
        ),
        Step::new(
            WEIGHING_ASSOCIATION,
            "Weighing Association",
            vec![
                AnswerOption::new("significant association with disease", 1.0),
                AnswerOption::new("no significant association with disease", 0.0),
            ],
        ),
        Step::new(
            LOW_FIELD_RESOLUTION,
            "Low Field Resolution",
            vec![
                AnswerOption::new("1-field resolution (from Step 1B)", 0.5),
                AnswerOption::new(">1-field resolution", 1.0),
            ],
        ),
    ]
}
