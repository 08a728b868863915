use crate::presentation::config::{Environment, LoggingSettings};

/// Configuration for tracing initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl TracingConfig {
    pub fn from_settings(logging: &LoggingSettings, environment: Environment) -> Self {
        let level = logging.level.trim();
        let filter = if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("{level},georag=debug,tower_http=debug,sqlx=warn")
        };

        Self {
            environment: environment.to_string(),
            json_format: logging.json || environment == Environment::Prod,
            filter,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingSettings::default(), Environment::default())
    }
}
