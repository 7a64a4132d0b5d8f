//! Orchestrator: the main entry point of the engine
//!
//! The orchestrator drives one run:
//! 1. Loads a recipe and builds the module pool
//! 2. Runs the setup phase (no dependency gating)
//! 3. Checks the global error ledger
//! 4. Runs the process phase (gated on `wants`)
//! 5. Checks the global error ledger again
//!
//! A critical error found at either check ends the run before anything
//! else starts.

use crate::{
    ContainerStore, EngineError, EngineResult, ErrorLedger, ModulePool, ModuleRegistry,
    PhaseExecutor, PhaseOutcome, RunState,
};
use recipe_types::{CriticalError, ErrorEntry, Parameters, Phase, Recipe, RunId};
use std::sync::Arc;

/// Result of a run that got through both phases
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub run_id: RunId,
    pub setup: PhaseOutcome,
    pub process: PhaseOutcome,
    /// Non-critical entries retained in the global ledger
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug)]
struct LoadedRecipe {
    recipe: Arc<Recipe>,
    pool: Arc<ModulePool>,
}

/// Runs recipes against a module registry
#[derive(Debug)]
pub struct Orchestrator {
    registry: ModuleRegistry,
    state: Arc<RunState>,
    loaded: Option<LoadedRecipe>,
}

impl Orchestrator {
    /// Create an orchestrator with fresh run state
    pub fn new(registry: ModuleRegistry) -> Self {
        Self::with_state(registry, Arc::new(RunState::new()))
    }

    /// Create an orchestrator around existing run state
    pub fn with_state(registry: ModuleRegistry, state: Arc<RunState>) -> Self {
        Self {
            registry,
            state,
            loaded: None,
        }
    }

    // ── Recipe ───────────────────────────────────────────────────────

    /// Validate the recipe and instantiate every module it names.
    ///
    /// Fails before any module runs if a name is unknown to the registry.
    pub fn load_recipe(&mut self, recipe: Recipe) -> EngineResult<()> {
        recipe.validate()?;
        let pool = ModulePool::load(&recipe, &self.registry, &self.state)?;

        tracing::info!(
            run_id = %self.state.run_id(),
            recipe = %recipe.name,
            "Recipe loaded"
        );
        self.loaded = Some(LoadedRecipe {
            recipe: Arc::new(recipe),
            pool: Arc::new(pool),
        });
        Ok(())
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        self.loaded.as_ref().map(|l| l.recipe.as_ref())
    }

    fn executor(&self) -> EngineResult<PhaseExecutor> {
        let loaded = self.loaded.as_ref().ok_or(EngineError::NoRecipeLoaded)?;
        Ok(PhaseExecutor::new(
            Arc::clone(&loaded.recipe),
            Arc::clone(&loaded.pool),
            Arc::clone(&self.state),
        ))
    }

    // ── Phases ───────────────────────────────────────────────────────

    /// Run every module's setup with `params` interpolated into its args
    pub async fn setup_modules(&self, params: &Parameters) -> EngineResult<PhaseOutcome> {
        Ok(self.executor()?.run(Phase::Setup, params).await?)
    }

    /// Run every module's process phase, honoring `wants`
    pub async fn run_modules(&self) -> EngineResult<PhaseOutcome> {
        Ok(self
            .executor()?
            .run(Phase::Process, &Parameters::new())
            .await?)
    }

    /// Setup, then process. Stops at the first phase whose barrier check
    /// finds a critical error.
    pub async fn run(&self, params: &Parameters) -> EngineResult<RunSummary> {
        let setup = self.setup_modules(params).await?;
        let process = self.run_modules().await?;

        Ok(RunSummary {
            run_id: self.state.run_id().clone(),
            setup,
            process,
            errors: self.state.errors().entries(),
        })
    }

    // ── Shared State ─────────────────────────────────────────────────

    /// Check the global ledger for critical entries
    pub fn check_errors(&self) -> Result<(), CriticalError> {
        self.state.errors().check()
    }

    pub fn run_id(&self) -> &RunId {
        self.state.run_id()
    }

    pub fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    pub fn store(&self) -> &ContainerStore {
        self.state.store()
    }

    /// The global error ledger
    pub fn errors(&self) -> &ErrorLedger {
        self.state.errors()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}
