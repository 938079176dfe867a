use crate::config::ConfigError;
use crate::score::derive::DeriveError;
use crate::score::{CatalogError, ScoreError};
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Catalog(CatalogError),
    Score(ScoreError),
    Derive(DeriveError),
}

impl AppError {
    /// Rejected curator input, as opposed to a broken installation.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            AppError::Json(_) | AppError::Score(ScoreError::Validation(_)) | AppError::Derive(_)
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "questionnaire is not valid JSON: {}", err),
            AppError::Catalog(err) => write!(f, "rule catalog error: {}", err),
            AppError::Score(err) => write!(f, "scoring error: {}", err),
            AppError::Derive(err) => write!(f, "cannot suggest an option: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Score(err) => Some(err),
            AppError::Derive(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<CatalogError> for AppError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

impl From<ScoreError> for AppError {
    fn from(value: ScoreError) -> Self {
        Self::Score(value)
    }
}

impl From<DeriveError> for AppError {
    fn from(value: DeriveError) -> Self {
        Self::Derive(value)
    }
}
