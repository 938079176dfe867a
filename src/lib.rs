//! Evidence scoring core for HLA disease association curations.
//!
//! Curator answers flow through [`score::QuestionnaireValidator`] into a
//! [`score::Questionnaire`], which [`score::ScoreCalculator`] turns into a
//! numeric score. Both read from one shared [`score::RuleCatalog`].

pub mod config;
pub mod error;
pub mod score;
pub mod telemetry;
