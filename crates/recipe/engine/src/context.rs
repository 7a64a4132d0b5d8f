//! Run state and the per-module handle modules are built with

use crate::ledger::{ErrorLedger, LedgerScope};
use crate::store::ContainerStore;
use recipe_types::{Container, CriticalError, DynContainer, ErrorEntry, RunId};
use std::sync::Arc;

/// State shared by every module task of a run
#[derive(Debug)]
pub struct RunState {
    run_id: RunId,
    store: ContainerStore,
    errors: ErrorLedger,
}

impl RunState {
    pub fn new() -> Self {
        Self::with_run_id(RunId::generate())
    }

    pub fn with_run_id(run_id: RunId) -> Self {
        Self {
            run_id,
            store: ContainerStore::new(),
            errors: ErrorLedger::new(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// The container store
    pub fn store(&self) -> &ContainerStore {
        &self.store
    }

    /// The global error ledger
    pub fn errors(&self) -> &ErrorLedger {
        &self.errors
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle given to a module at construction.
///
/// Cloning is cheap; clones share the same local ledger. Because exactly
/// one task runs per module per phase, the module's local ledger is that
/// task's local ledger.
#[derive(Clone, Debug)]
pub struct ModuleContext {
    module: Arc<str>,
    state: Arc<RunState>,
    local: Arc<ErrorLedger>,
}

impl ModuleContext {
    pub fn new(module: impl Into<Arc<str>>, state: Arc<RunState>) -> Self {
        Self {
            module: module.into(),
            state,
            local: Arc::new(ErrorLedger::new()),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module
    }

    pub fn run_id(&self) -> &RunId {
        self.state.run_id()
    }

    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    // ── Containers ───────────────────────────────────────────────────

    /// Publish a container to every module of the run
    pub fn store_container<C: Container>(&self, container: C) {
        self.state.store().put(container);
    }

    /// Every container of type `C` stored so far
    pub fn get_containers<C: Container>(&self) -> Vec<Arc<C>> {
        self.state.store().get::<C>()
    }

    pub fn get_containers_by_type(&self, container_type: &str) -> Vec<Arc<dyn DynContainer>> {
        self.state.store().get_by_type(container_type)
    }

    // ── Errors ───────────────────────────────────────────────────────

    /// Record an error in this module's local ledger
    pub fn add_error(&self, message: impl Into<String>, critical: bool) {
        let entry = ErrorEntry::new(message, critical).from_module(&*self.module);
        if critical {
            tracing::error!(module = %self.module, "{}", entry.message);
        } else {
            tracing::warn!(module = %self.module, "{}", entry.message);
        }
        self.local.add(entry);
    }

    /// Entries recorded locally and not yet promoted
    pub fn errors(&self) -> Vec<ErrorEntry> {
        self.local.entries()
    }

    /// Move local entries to the global ledger. Returns how many moved.
    pub fn promote_to_global(&self) -> usize {
        self.local.promote_into(self.state.errors())
    }

    /// Check the local or global ledger for critical entries
    pub fn check_errors(&self, scope: LedgerScope) -> Result<(), CriticalError> {
        match scope {
            LedgerScope::Local => self.local.check(),
            LedgerScope::Global => self.state.errors().check(),
        }
    }
}
