//! The two phases every module goes through

use serde::{Deserialize, Serialize};

/// A run phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Modules receive their arguments; no dependency gating
    Setup,
    /// Modules do their work, each after everything it wants has finished
    Process,
}

impl Phase {
    /// Whether tasks of this phase wait on their `wants`
    pub fn is_gated(&self) -> bool {
        matches!(self, Phase::Process)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Process => "process",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
