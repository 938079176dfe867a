//! HLA evidence scoring: rule catalog, questionnaire validation and score calculation.

mod calculator;
pub mod catalog;
pub mod derive;
pub mod questionnaire;
mod validator;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use calculator::{CalculationError, ScoreBreakdown, ScoreCalculator, StepContribution};
pub use catalog::{step_ids, AnswerOption, CatalogError, RuleCatalog, Step};
pub use questionnaire::{
    Characterization, CohortSize, FieldSpec, PhenotypeSpecificity, Questionnaire, Selection,
    StatisticalSupport, TypingMethod, Weighting, QUESTIONNAIRE_FIELDS,
};
pub use validator::{FieldIssue, IssueReason, QuestionnaireValidator, ValidationError};

/// Failure while turning raw answers into a score.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

/// Describes one questionnaire field for form builders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub field: String,
    pub step_id: &'static str,
    pub display_name: String,
    pub accepts_list: bool,
    pub options: Vec<String>,
}

/// Validated answers together with the score they earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub questionnaire: Questionnaire,
    pub breakdown: ScoreBreakdown,
}

impl ScoreOutcome {
    pub fn score(&self) -> f64 {
        self.breakdown.score
    }
}

/// Validator and calculator sharing one rule catalog.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    validator: QuestionnaireValidator,
    calculator: ScoreCalculator,
}

impl ScoringEngine {
    pub fn new(catalog: Arc<RuleCatalog>) -> Result<Self, CatalogError> {
        Ok(Self {
            validator: QuestionnaireValidator::new(Arc::clone(&catalog))?,
            calculator: ScoreCalculator::new(catalog),
        })
    }

    /// Engine over the built-in HLA framework catalog.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::new(Arc::new(RuleCatalog::standard()))
    }

    pub fn catalog(&self) -> &RuleCatalog {
        self.calculator.catalog()
    }

    pub fn validator(&self) -> &QuestionnaireValidator {
        &self.validator
    }

    pub fn calculator(&self) -> &ScoreCalculator {
        &self.calculator
    }

    pub fn validate(&self, raw: &Value) -> Result<Questionnaire, ValidationError> {
        self.validator.validate(raw)
    }

    /// Validate then score. Nothing is scored unless every field is valid.
    pub fn score(&self, raw: &Value) -> Result<ScoreOutcome, ScoreError> {
        let questionnaire = self.validator.validate(raw)?;
        let breakdown = self.calculator.breakdown(&questionnaire)?;
        Ok(ScoreOutcome {
            questionnaire,
            breakdown,
        })
    }

    /// Field layout and legal options, in catalog order.
    pub fn schema(&self) -> Result<Vec<FieldSchema>, CatalogError> {
        let catalog = self.catalog();
        QUESTIONNAIRE_FIELDS
            .iter()
            .map(|field| {
                let step = catalog
                    .step(field.step_id)
                    .ok_or_else(|| CatalogError::UnknownStep(field.step_id.to_string()))?;
                Ok(FieldSchema {
                    field: field.path(),
                    step_id: field.step_id,
                    display_name: step.display_name.clone(),
                    accepts_list: field.accepts_list,
                    options: step.options.iter().map(|option| option.name.clone()).collect(),
                })
            })
            .collect()
    }
}
