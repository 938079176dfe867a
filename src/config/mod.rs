use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log level used when `HCI_LOG_LEVEL` is unset.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Test => "warn",
            Self::Production => "info",
        }
    }
}

/// How score reports are rendered on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidOutputFormat(value.to_string())),
        }
    }
}

/// Top-level configuration for the scoring tool.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("HCI_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let format = match env::var("HCI_OUTPUT_FORMAT") {
            Ok(raw) => OutputFormat::parse(&raw)?,
            Err(_) => OutputFormat::default(),
        };

        let log_level = env::var("HCI_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        Ok(Self {
            environment,
            output: OutputConfig { format },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings controlling report rendering.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidOutputFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidOutputFormat(value) => write!(
                f,
                "HCI_OUTPUT_FORMAT must be 'text' or 'json' (found '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("HCI_ENV");
        env::remove_var("HCI_OUTPUT_FORMAT");
        env::remove_var("HCI_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn environment_picks_default_log_level() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HCI_ENV", "ci");
        assert_eq!(AppConfig::load().expect("config loads").telemetry.log_level, "warn");

        env::set_var("HCI_ENV", "prod");
        assert_eq!(AppConfig::load().expect("config loads").telemetry.log_level, "info");

        env::set_var("HCI_LOG_LEVEL", "trace");
        assert_eq!(AppConfig::load().expect("config loads").telemetry.log_level, "trace");
        reset_env();
    }

    #[test]
    fn reads_environment_and_output_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HCI_ENV", "Production");
        env::set_var("HCI_OUTPUT_FORMAT", "JSON");
        env::set_var("HCI_LOG_LEVEL", "debug");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.telemetry.log_level, "debug");
        reset_env();
    }

    #[test]
    fn rejects_unknown_output_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HCI_OUTPUT_FORMAT", "yaml");
        let err = AppConfig::load().expect_err("yaml is not supported");
        assert!(matches!(err, ConfigError::InvalidOutputFormat(ref value) if value == "yaml"));
        reset_env();
    }
}
