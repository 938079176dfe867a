//! Map raw study facts onto canonical option names.
//!
//! Curation forms record a p-value as `significand x 10^exponent`, a cohort
//! size, and the allele resolution. These helpers pick the matching bucket so
//! curators do not have to read the threshold labels themselves.

use serde::Serialize;

use super::catalog::{step_ids, CatalogError, RuleCatalog};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeriveError {
    #[error("p-value {significand}x10^{exponent} is not a probability in (0, 1]")]
    InvalidPValue { significand: f64, exponent: i32 },
    #[error("'{0}' is not a recognised allele resolution")]
    UnknownAlleleResolution(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// GWAS and candidate-gene studies use different significance and size bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyDesign {
    Gwas,
    NonGwas,
}

/// A p-value held in normalised scientific notation, `1 <= significand < 10`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PValue {
    significand: f64,
    exponent: i32,
}

impl PValue {
    /// Accepts unnormalised input such as `40 x 10^-5`. Rejects anything that
    /// is not in `(0, 1]` or that cannot be represented as an `f64`.
    pub fn new(significand: f64, exponent: i32) -> Result<Self, DeriveError> {
        let invalid = || DeriveError::InvalidPValue {
            significand,
            exponent,
        };
        if !significand.is_finite() || significand <= 0.0 {
            return Err(invalid());
        }

        let (mut normalised, mut shifted) = (significand, exponent);
        while normalised >= 10.0 {
            normalised /= 10.0;
            shifted = shifted.checked_add(1).ok_or_else(invalid)?;
        }
        while normalised < 1.0 {
            normalised *= 10.0;
            shifted = shifted.checked_sub(1).ok_or_else(invalid)?;
        }

        let p_value = Self {
            significand: normalised,
            exponent: shifted,
        };
        if shifted > 0 || (shifted == 0 && normalised > 1.0) || p_value.value() == 0.0 {
            return Err(invalid());
        }
        Ok(p_value)
    }

    pub fn significand(&self) -> f64 {
        self.significand
    }

    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    pub fn value(&self) -> f64 {
        self.significand * 10f64.powi(self.exponent)
    }

    /// Exact comparison against a normalised threshold like 5x10^-8.
    fn is_below(&self, significand: f64, exponent: i32) -> bool {
        self.exponent < exponent || (self.exponent == exponent && self.significand < significand)
    }
}

const P_VALUE_OPTIONS: [&str; 5] = [
    "GWAS <1x10e-14, Non-GWAS <0.0001",
    "GWAS <1x10e-11, Non-GWAS <0.0005",
    "GWAS <5x10e-8, Non-GWAS <0.01",
    "GWAS <1x10e-5, Non-GWAS <0.05",
    "GWAS >=1x10e-5, Non-GWAS >=0.05",
];

const GWAS_P_THRESHOLDS: [(f64, i32); 4] = [(1.0, -14), (1.0, -11), (5.0, -8), (1.0, -5)];
const NON_GWAS_P_THRESHOLDS: [(f64, i32); 4] = [(1.0, -4), (5.0, -4), (1.0, -2), (5.0, -2)];

/// Step 3A bucket for a p-value. Bounds are strict, matching the `<` labels.
pub fn p_value_option(design: StudyDesign, p_value: PValue) -> &'static str {
    let thresholds = match design {
        StudyDesign::Gwas => &GWAS_P_THRESHOLDS,
        StudyDesign::NonGwas => &NON_GWAS_P_THRESHOLDS,
    };

    thresholds
        .iter()
        .position(|&(significand, exponent)| p_value.is_below(significand, exponent))
        .map(|index| P_VALUE_OPTIONS[index])
        .unwrap_or(P_VALUE_OPTIONS[4])
}

const COHORT_OPTIONS: [&str; 5] = [
    "GWAS <1,000, Non-GWAS <50",
    "GWAS 1,000-2,499, Non-GWAS 50-99",
    "GWAS 2,500-4,999, Non-GWAS 100-249",
    "GWAS 5,000-9,999, Non-GWAS 250-499",
    "GWAS >=10,000, Non-GWAS >=500",
];

const GWAS_COHORT_BOUNDS: [u32; 4] = [1_000, 2_500, 5_000, 10_000];
const NON_GWAS_COHORT_BOUNDS: [u32; 4] = [50, 100, 250, 500];

/// Step 4 bucket for the number of participants.
pub fn cohort_size_option(design: StudyDesign, participants: u32) -> &'static str {
    let bounds = match design {
        StudyDesign::Gwas => &GWAS_COHORT_BOUNDS,
        StudyDesign::NonGwas => &NON_GWAS_COHORT_BOUNDS,
    };
    let bucket = bounds.iter().filter(|&&bound| participants >= bound).count();
    COHORT_OPTIONS[bucket]
}

const ONE_FIELD_RESOLUTION: &str = "1-field";
const ONE_FIELD_WEIGHT: &str = "1-field resolution (from Step 1B)";
const HIGHER_FIELD_WEIGHT: &str = ">1-field resolution";

/// Step 6B follows from the step 1B answer.
pub fn low_field_resolution_option(
    catalog: &RuleCatalog,
    allele_resolution: &str,
) -> Result<&'static str, DeriveError> {
    let legal = catalog.option_names(step_ids::ALLELE_RESOLUTION)?;
    if !legal.contains(&allele_resolution) {
        return Err(DeriveError::UnknownAlleleResolution(
            allele_resolution.to_string(),
        ));
    }

    if allele_resolution == ONE_FIELD_RESOLUTION {
        Ok(ONE_FIELD_WEIGHT)
    } else {
        Ok(HIGHER_FIELD_WEIGHT)
    }
}
