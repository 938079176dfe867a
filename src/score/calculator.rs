use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use super::catalog::{step_ids, RuleCatalog};
use super::questionnaire::{
    Characterization, CohortSize, PhenotypeSpecificity, Questionnaire, Selection,
    StatisticalSupport, TypingMethod, Weighting,
};

/// A selection the catalog cannot price. Only reachable when the questionnaire
/// was validated against a different catalog than the calculator holds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("option '{option}' is not defined for scoring step '{step_id}'")]
    UnknownOption { step_id: String, option: String },
}

/// Points awarded for one sub-step, kept for auditing a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepContribution {
    pub step_id: String,
    pub display_name: String,
    pub selections: Vec<String>,
    pub points: f64,
}

/// Step totals behind a final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub step_1: f64,
    pub step_2: f64,
    pub step_3: f64,
    pub step_4: f64,
    pub step_5: f64,
    /// Sum of steps 1 through 5.
    pub additive_total: f64,
    /// Product of the 6A and 6B points.
    pub weighting_factor: f64,
    pub score: f64,
    pub contributions: Vec<StepContribution>,
}

/// Prices a validated questionnaire using the rule catalog.
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    catalog: Arc<RuleCatalog>,
}

impl ScoreCalculator {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<RuleCatalog> {
        &self.catalog
    }

    /// Final score: `(step 1 + .. + step 5) * 6A * 6B`.
    pub fn calculate(&self, questionnaire: &Questionnaire) -> Result<f64, CalculationError> {
        self.breakdown(questionnaire).map(|breakdown| breakdown.score)
    }

    pub fn breakdown(&self, questionnaire: &Questionnaire) -> Result<ScoreBreakdown, CalculationError> {
        let mut tally = Tally::new(&self.catalog);

        let totals = match step_totals(&mut tally, questionnaire) {
            Ok(totals) => totals,
            Err(err) => {
                error!(error = %err, "score calculation aborted");
                return Err(err);
            }
        };
        let StepTotals {
            step_1,
            step_2,
            step_3,
            step_4,
            step_5,
            weighting_factor,
        } = totals;

        let additive_total = step_1 + step_2 + step_3 + step_4 + step_5;
        let score = additive_total * weighting_factor;
        debug!(
            step_1,
            step_2,
            step_3,
            step_4,
            step_5,
            weighting_factor,
            score,
            "score calculated"
        );

        Ok(ScoreBreakdown {
            step_1,
            step_2,
            step_3,
            step_4,
            step_5,
            additive_total,
            weighting_factor,
            score,
            contributions: tally.contributions,
        })
    }

    /// Step 1: 1A + 1B + 1C + 1D.
    pub fn characterization_points(&self, answers: &Characterization) -> Result<f64, CalculationError> {
        characterization_points(&mut Tally::new(&self.catalog), answers)
    }

    pub fn typing_points(&self, answers: &TypingMethod) -> Result<f64, CalculationError> {
        typing_points(&mut Tally::new(&self.catalog), answers)
    }

    /// Step 3: 3A + 3B + 3C, where 3B and 3C may each sum several options.
    pub fn statistics_points(&self, answers: &StatisticalSupport) -> Result<f64, CalculationError> {
        statistics_points(&mut Tally::new(&self.catalog), answers)
    }

    pub fn cohort_points(&self, answers: &CohortSize) -> Result<f64, CalculationError> {
        cohort_points(&mut Tally::new(&self.catalog), answers)
    }

    pub fn phenotype_points(&self, answers: &PhenotypeSpecificity) -> Result<f64, CalculationError> {
        phenotype_points(&mut Tally::new(&self.catalog), answers)
    }

    /// Step 6: 6A * 6B.
    pub fn weighting_factor(&self, answers: &Weighting) -> Result<f64, CalculationError> {
        weighting_factor(&mut Tally::new(&self.catalog), answers)
    }
}

struct StepTotals {
    step_1: f64,
    step_2: f64,
    step_3: f64,
    step_4: f64,
    step_5: f64,
    weighting_factor: f64,
}

fn step_totals(
    tally: &mut Tally<'_>,
    questionnaire: &Questionnaire,
) -> Result<StepTotals, CalculationError> {
    Ok(StepTotals {
        step_1: characterization_points(tally, questionnaire.characterization())?,
        step_2: typing_points(tally, questionnaire.typing())?,
        step_3: statistics_points(tally, questionnaire.statistics())?,
        step_4: cohort_points(tally, questionnaire.cohort())?,
        step_5: phenotype_points(tally, questionnaire.phenotype())?,
        weighting_factor: weighting_factor(tally, questionnaire.weighting())?,
    })
}

fn characterization_points(
    tally: &mut Tally<'_>,
    answers: &Characterization,
) -> Result<f64, CalculationError> {
    Ok(tally.single(step_ids::ALLELE_OR_HAPLOTYPE, answers.allele_or_haplotype())?
        + tally.single(step_ids::ALLELE_RESOLUTION, answers.allele_resolution())?
        + tally.single(step_ids::ZYGOSITY, answers.zygosity())?
        + tally.single(step_ids::PHASE, answers.phase())?)
}

fn typing_points(tally: &mut Tally<'_>, answers: &TypingMethod) -> Result<f64, CalculationError> {
    tally.single(step_ids::TYPING_METHOD, answers.typing_method())
}

fn statistics_points(
    tally: &mut Tally<'_>,
    answers: &StatisticalSupport,
) -> Result<f64, CalculationError> {
    Ok(tally.single(step_ids::P_VALUE, answers.p_value())?
        + tally.selection(
            step_ids::MULTIPLE_TESTING_CORRECTION,
            answers.multiple_testing_correction(),
        )?
        + tally.selection(step_ids::EFFECT_SIZE, answers.effect_size())?)
}

fn cohort_points(tally: &mut Tally<'_>, answers: &CohortSize) -> Result<f64, CalculationError> {
    tally.single(step_ids::COHORT_SIZE, answers.cohort_size())
}

fn phenotype_points(
    tally: &mut Tally<'_>,
    answers: &PhenotypeSpecificity,
) -> Result<f64, CalculationError> {
    tally.single(step_ids::ADDITIONAL_PHENOTYPES, answers.additional_phenotypes())
}

fn weighting_factor(tally: &mut Tally<'_>, answers: &Weighting) -> Result<f64, CalculationError> {
    let association = tally.single(step_ids::WEIGHING_ASSOCIATION, answers.weighing_association())?;
    let resolution = tally.single(step_ids::LOW_FIELD_RESOLUTION, answers.low_field_resolution())?;
    Ok(association * resolution)
}

/// Resolves option names to points and records each sub-step contribution.
struct Tally<'a> {
    catalog: &'a RuleCatalog,
    contributions: Vec<StepContribution>,
}

impl<'a> Tally<'a> {
    fn new(catalog: &'a RuleCatalog) -> Self {
        Self {
            catalog,
            contributions: Vec::new(),
        }
    }

    fn single(&mut self, step_id: &str, option: &str) -> Result<f64, CalculationError> {
        let points = self.points_for(step_id, &[option])?;
        self.record(step_id, vec![option.to_string()], points);
        Ok(points)
    }

    fn selection(&mut self, step_id: &str, selection: &Selection) -> Result<f64, CalculationError> {
        let names = selection.names();
        let points = self.points_for(step_id, &names)?;
        self.record(step_id, names.into_iter().map(str::to_string).collect(), points);
        Ok(points)
    }

    fn points_for(&self, step_id: &str, options: &[&str]) -> Result<f64, CalculationError> {
        let table = self.catalog.option_points_map(step_id);
        options.iter().try_fold(0.0, |total, option| {
            table
                .get(option)
                .map(|points| total + points)
                .ok_or_else(|| CalculationError::UnknownOption {
                    step_id: step_id.to_string(),
                    option: option.to_string(),
                })
        })
    }

    fn record(&mut self, step_id: &str, selections: Vec<String>, points: f64) {
        let display_name = self
            .catalog
            .step(step_id)
            .map(|step| step.display_name.clone())
            .unwrap_or_default();
        self.contributions.push(StepContribution {
            step_id: step_id.to_string(),
            display_name,
            selections,
            points,
        });
    }
}
