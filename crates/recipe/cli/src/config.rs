//! Configuration for the recipe runner

use recipe_types::Parameters;
use serde::{Deserialize, Serialize};

/// Runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Default run parameters; `-p` flags override these
    #[serde(default)]
    pub parameters: Parameters,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl RunnerConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `RECIPE_` environment variables (`RECIPE_LOGGING__LEVEL=debug`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&RunnerConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("RECIPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Config parameters overridden by command-line ones
    pub fn merged_parameters(
        &self,
        overrides: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> Parameters {
        let mut params = self.parameters.clone();
        params.extend(overrides);
        params
    }
}
