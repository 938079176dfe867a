use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::catalog::{CatalogError, RuleCatalog};
use super::questionnaire::{
    self, Characterization, CohortSize, FieldSpec, PhenotypeSpecificity, Questionnaire,
    Selection, StatisticalSupport, TypingMethod, Weighting, QUESTIONNAIRE_FIELDS,
};

/// Why a raw field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueReason {
    Missing,
    NotAnObject,
    NotAString,
    NotAStringOrList,
    UnknownOption,
    EmptySelection,
    NonStringElement { index: usize },
    UnknownElement { index: usize },
    DuplicateElement { index: usize },
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueReason::Missing => write!(f, "required field is missing"),
            IssueReason::NotAnObject => write!(f, "expected an object"),
            IssueReason::NotAString => write!(f, "expected an option name"),
            IssueReason::NotAStringOrList => {
                write!(f, "expected an option name or a list of option names")
            }
            IssueReason::UnknownOption => write!(f, "not a recognised option for this step"),
            IssueReason::EmptySelection => write!(f, "at least one option must be selected"),
            IssueReason::NonStringElement { index } => {
                write!(f, "element {index} is not an option name")
            }
            IssueReason::UnknownElement { index } => {
                write!(f, "element {index} is not a recognised option for this step")
            }
            IssueReason::DuplicateElement { index } => {
                write!(f, "element {index} repeats an earlier selection")
            }
        }
    }
}

/// One rejected field, with enough context for a curator to fix the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub reason: IssueReason,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(step_id) = &self.step_id {
            write!(f, " (step {step_id})")?;
        }
        write!(f, ": {}", self.reason)?;
        if let Some(value) = &self.value {
            write!(f, " (got {value})")?;
        }
        Ok(())
    }
}

/// Raw answers did not conform to the rule catalog. Never partially scored.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("questionnaire rejected with {} issue(s): {}", .issues.len(), join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    /// First issue reported against `step_id`, if any.
    pub fn issue_for_step(&self, step_id: &str) -> Option<&FieldIssue> {
        self.issues
            .iter()
            .find(|issue| issue.step_id.as_deref() == Some(step_id))
    }

    pub fn fields(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.field.as_str()).collect()
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks raw curator answers against the catalog's legal option names.
#[derive(Debug, Clone)]
pub struct QuestionnaireValidator {
    catalog: Arc<RuleCatalog>,
    legal: HashMap<&'static str, HashSet<String>>,
}

impl QuestionnaireValidator {
    /// Materialise the legal option set for every questionnaire field.
    pub fn new(catalog: Arc<RuleCatalog>) -> Result<Self, CatalogError> {
        let mut legal = HashMap::with_capacity(QUESTIONNAIRE_FIELDS.len());
        for field in QUESTIONNAIRE_FIELDS {
            let names = catalog
                .option_names(field.step_id)?
                .into_iter()
                .map(str::to_string)
                .collect();
            legal.insert(field.step_id, names);
        }

        Ok(Self { catalog, legal })
    }

    pub fn catalog(&self) -> &Arc<RuleCatalog> {
        &self.catalog
    }

    /// Validate the whole questionnaire, collecting every field issue in one pass.
    pub fn validate(&self, raw: &Value) -> Result<Questionnaire, ValidationError> {
        let Some(root) = raw.as_object() else {
            let issues = vec![FieldIssue {
                field: "<root>".to_string(),
                step_id: None,
                value: Some(raw.clone()),
                reason: IssueReason::NotAnObject,
            }];
            warn!(issues = issues.len(), "questionnaire rejected");
            return Err(ValidationError { issues });
        };

        let mut reader = FieldReader::new(root, &self.legal);

        let step_1 = read_characterization(&mut reader);
        let step_2 = reader
            .single(&questionnaire::TYPING_METHOD)
            .map(|typing_method| TypingMethod { typing_method });
        let step_3 = read_statistics(&mut reader);
        let step_4 = reader
            .single(&questionnaire::COHORT_SIZE)
            .map(|cohort_size| CohortSize { cohort_size });
        let step_5 = reader
            .single(&questionnaire::ADDITIONAL_PHENOTYPES)
            .map(|additional_phenotypes| PhenotypeSpecificity {
                additional_phenotypes,
            });
        let step_6 = read_weighting(&mut reader);

        let issues = reader.finish();
        match (step_1, step_2, step_3, step_4, step_5, step_6) {
            (Some(step_1), Some(step_2), Some(step_3), Some(step_4), Some(step_5), Some(step_6))
                if issues.is_empty() =>
            {
                debug!("questionnaire validated");
                Ok(Questionnaire {
                    step_1,
                    step_2,
                    step_3,
                    step_4,
                    step_5,
                    step_6,
                })
            }
            _ => {
                warn!(issues = issues.len(), "questionnaire rejected");
                Err(ValidationError { issues })
            }
        }
    }
}

fn read_characterization(reader: &mut FieldReader<'_>) -> Option<Characterization> {
    let allele_or_haplotype = reader.single(&questionnaire::ALLELE_OR_HAPLOTYPE);
    let allele_resolution = reader.single(&questionnaire::ALLELE_RESOLUTION);
    let zygosity = reader.single(&questionnaire::ZYGOSITY);
    let phase = reader.single(&questionnaire::PHASE);

    Some(Characterization {
        allele_or_haplotype: allele_or_haplotype?,
        allele_resolution: allele_resolution?,
        zygosity: zygosity?,
        phase: phase?,
    })
}

fn read_statistics(reader: &mut FieldReader<'_>) -> Option<StatisticalSupport> {
    let p_value = reader.single(&questionnaire::P_VALUE);
    let multiple_testing_correction = reader.selection(&questionnaire::MULTIPLE_TESTING_CORRECTION);
    let effect_size = reader.selection(&questionnaire::EFFECT_SIZE);

    Some(StatisticalSupport {
        p_value: p_value?,
        multiple_testing_correction: multiple_testing_correction?,
        effect_size: effect_size?,
    })
}

fn read_weighting(reader: &mut FieldReader<'_>) -> Option<Weighting> {
    let weighing_association = reader.single(&questionnaire::WEIGHING_ASSOCIATION);
    let low_field_resolution = reader.single(&questionnaire::LOW_FIELD_RESOLUTION);

    Some(Weighting {
        weighing_association: weighing_association?,
        low_field_resolution: low_field_resolution?,
    })
}

/// Walks the raw mapping field by field, recording issues instead of stopping.
struct FieldReader<'a> {
    root: &'a Map<String, Value>,
    legal: &'a HashMap<&'static str, HashSet<String>>,
    reported_sections: HashSet<&'static str>,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(root: &'a Map<String, Value>, legal: &'a HashMap<&'static str, HashSet<String>>) -> Self {
        Self {
            root,
            legal,
            reported_sections: HashSet::new(),
            issues: Vec::new(),
        }
    }

    fn finish(self) -> Vec<FieldIssue> {
        self.issues
    }

    fn single(&mut self, field: &FieldSpec) -> Option<String> {
        let value = self.lookup(field)?;
        match value {
            Value::String(name) => self.checked_name(field, name, value),
            other => {
                self.report(field, Some(other.clone()), IssueReason::NotAString);
                None
            }
        }
    }

    fn selection(&mut self, field: &FieldSpec) -> Option<Selection> {
        let value = self.lookup(field)?;
        match value {
            Value::String(name) => self
                .checked_name(field, name, value)
                .map(Selection::Single),
            Value::Array(elements) => self.checked_list(field, elements).map(Selection::Multiple),
            other => {
                self.report(field, Some(other.clone()), IssueReason::NotAStringOrList);
                None
            }
        }
    }

    fn checked_name(&mut self, field: &FieldSpec, name: &str, value: &Value) -> Option<String> {
        if self.is_legal(field, name) {
            Some(name.to_string())
        } else {
            self.report(field, Some(value.clone()), IssueReason::UnknownOption);
            None
        }
    }

    fn checked_list(&mut self, field: &FieldSpec, elements: &[Value]) -> Option<Vec<String>> {
        if elements.is_empty() {
            self.report(field, Some(Value::Array(Vec::new())), IssueReason::EmptySelection);
            return None;
        }

        let mut names = Vec::with_capacity(elements.len());
        let mut valid = true;
        for (index, element) in elements.iter().enumerate() {
            let Value::String(name) = element else {
                self.report(
                    field,
                    Some(element.clone()),
                    IssueReason::NonStringElement { index },
                );
                valid = false;
                continue;
            };

            if !self.is_legal(field, name) {
                self.report(
                    field,
                    Some(element.clone()),
                    IssueReason::UnknownElement { index },
                );
                valid = false;
            } else if names.contains(name) {
                self.report(
                    field,
                    Some(element.clone()),
                    IssueReason::DuplicateElement { index },
                );
                valid = false;
            } else {
                names.push(name.clone());
            }
        }

        valid.then_some(names)
    }

    fn lookup(&mut self, field: &FieldSpec) -> Option<&'a Value> {
        let root = self.root;
        let section = match root.get(field.section) {
            None | Some(Value::Null) => {
                self.report(field, None, IssueReason::Missing);
                return None;
            }
            Some(Value::Object(section)) => section,
            Some(other) => {
                if self.reported_sections.insert(field.section) {
                    self.issues.push(FieldIssue {
                        field: field.section.to_string(),
                        step_id: None,
                        value: Some(other.clone()),
                        reason: IssueReason::NotAnObject,
                    });
                }
                return None;
            }
        };

        match section.get(field.key) {
            None | Some(Value::Null) => {
                self.report(field, None, IssueReason::Missing);
                None
            }
            Some(value) => Some(value),
        }
    }

    fn is_legal(&self, field: &FieldSpec, name: &str) -> bool {
        self.legal
            .get(field.step_id)
            .is_some_and(|names| names.contains(name))
    }

    fn report(&mut self, field: &FieldSpec, value: Option<Value>, reason: IssueReason) {
        self.issues.push(FieldIssue {
            field: field.path(),
            step_id: Some(field.step_id.to_string()),
            value,
            reason,
        });
    }
}
