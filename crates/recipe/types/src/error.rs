//! Error types for recipes, modules and error ledgers

use crate::Phase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error Entry ──────────────────────────────────────────────────────

/// One entry in an error ledger
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Human-readable description
    pub message: String,
    /// Whether the run must abort once this entry reaches a barrier check
    pub critical: bool,
    /// Module that recorded the entry, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// When the entry was recorded
    pub recorded_at: DateTime<Utc>,
}

impl ErrorEntry {
    pub fn new(message: impl Into<String>, critical: bool) -> Self {
        Self {
            message: message.into(),
            critical,
            module: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(message, true)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, false)
    }

    pub fn from_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.critical {
            write!(f, "CRITICAL: ")?;
        } else {
            write!(f, "  ")?;
        }
        if let Some(module) = &self.module {
            write!(f, "[{}] ", module)?;
        }
        write!(f, "{}", self.message)
    }
}

// ── Critical Error ───────────────────────────────────────────────────

/// Raised by a ledger check that found a critical entry.
///
/// `reported` holds every entry up to and including the first critical
/// one, in ledger order.
#[derive(Clone, Debug, Error)]
#[error("critical error found{}: {}", phase_suffix(.phase), first_critical(.reported))]
pub struct CriticalError {
    /// Phase whose barrier check found the entry
    pub phase: Option<Phase>,
    /// Entries reported before aborting
    pub reported: Vec<ErrorEntry>,
}

impl CriticalError {
    pub fn new(reported: Vec<ErrorEntry>) -> Self {
        Self {
            phase: None,
            reported,
        }
    }

    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// The critical entry that triggered the abort
    pub fn trigger(&self) -> Option<&ErrorEntry> {
        self.reported.iter().find(|e| e.critical)
    }
}

fn phase_suffix(phase: &Option<Phase>) -> String {
    phase.map(|p| format!(" after {} phase", p)).unwrap_or_default()
}

fn first_critical(entries: &[ErrorEntry]) -> String {
    entries
        .iter()
        .find(|e| e.critical)
        .map(|e| e.message.lines().next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

// ── Recipe Errors ────────────────────────────────────────────────────

/// Errors raised while loading a recipe
#[derive(Debug, Error)]
pub enum RecipeError {
    /// The registry cannot resolve a module named by the recipe
    #[error("Recipe uses unknown module: {0}")]
    UnknownModule(String),

    /// Two descriptions share a module name
    #[error("Recipe declares module more than once: {0}")]
    DuplicateModule(String),

    /// A `wants` entry names a module missing from the recipe
    #[error("Module {module} wants unknown module: {wants}")]
    UnknownDependency { module: String, wants: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for recipe operations
pub type RecipeResult<T> = Result<T, RecipeError>;

// ── Module Errors ────────────────────────────────────────────────────

/// Failure returned by a module's setup or process function
#[derive(Debug, Error)]
pub enum ModuleError {
    /// Anticipated failure signalled by the module itself
    #[error("{message}")]
    Failed { message: String },

    /// Anything else
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModuleError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Render the failure as ledger text.
    ///
    /// Unexpected failures carry their full cause chain (and backtrace when
    /// one was captured).
    pub fn describe(&self) -> String {
        match self {
            ModuleError::Failed { message } => message.clone(),
            ModuleError::Other(error) => format!(
                "An unknown error occurred: {}\nFull traceback:\n{:?}",
                error, error
            ),
        }
    }
}

/// Result type for module phase functions
pub type ModuleResult<T> = Result<T, ModuleError>;
