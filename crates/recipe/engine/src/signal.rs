//! Completion signals: one-shot, multi-waiter "module finished" flags
//!
//! A fresh set of signals is built for every phase run, so a wait in the
//! processing phase can never be satisfied by a setup-phase completion.

use recipe_types::Recipe;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// A flag that is set once and can be awaited by any number of tasks
#[derive(Clone, Debug)]
pub struct CompletionSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Mark the module as finished. Returns false if it already was.
    pub fn set(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is set; returns immediately if it already is
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close.
        let _ = rx.wait_for(|done| *done).await;
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The completion signals of one phase run, keyed by module name
#[derive(Clone, Debug, Default)]
pub struct CompletionSignals {
    signals: HashMap<String, CompletionSignal>,
}

impl CompletionSignals {
    /// One unset signal per module of the recipe
    pub fn for_recipe(recipe: &Recipe) -> Self {
        Self {
            signals: recipe
                .modules
                .iter()
                .map(|m| (m.name.clone(), CompletionSignal::new()))
                .collect(),
        }
    }

    pub fn get(&self, module: &str) -> Option<&CompletionSignal> {
        self.signals.get(module)
    }

    /// Names of modules whose signal is not set yet, sorted
    pub fn pending(&self) -> Vec<&str> {
        let mut names: Vec<_> = self
            .signals
            .iter()
            .filter(|(_, s)| !s.is_set())
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn all_set(&self) -> bool {
        self.signals.values().all(CompletionSignal::is_set)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
