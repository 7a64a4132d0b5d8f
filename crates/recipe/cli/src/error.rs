//! CLI error types

use recipe_engine::EngineError;
use recipe_types::RecipeError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Recipe file could not be read or parsed
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// The run itself failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
