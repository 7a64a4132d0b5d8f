//! Error types for the orchestrator

use recipe_types::{CriticalError, RecipeError};
use thiserror::Error;

/// Orchestrator-level errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// A phase was requested before any recipe was loaded
    #[error("No recipe loaded")]
    NoRecipeLoaded,

    /// The recipe could not be loaded
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// A barrier check found a critical error; later phases did not run
    #[error(transparent)]
    Critical(#[from] CriticalError),
}

impl EngineError {
    /// The barrier-check failure, if that is what this is
    pub fn as_critical(&self) -> Option<&CriticalError> {
        match self {
            EngineError::Critical(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for orchestrator operations
pub type EngineResult<T> = Result<T, EngineError>;
