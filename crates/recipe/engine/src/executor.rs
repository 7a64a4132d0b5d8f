//! Phase executor: one task per module, gated on completion signals
//!
//! A phase run spawns a task for every module of the recipe. In the
//! process phase a task first waits until every module it wants has
//! finished; in the setup phase it starts right away. The phase function
//! itself runs on a dedicated blocking thread. Whatever the phase
//! function returns, the task then sets its own completion signal and
//! promotes its local errors to the global ledger.
//!
//! After all tasks have finished the global ledger is checked. A critical
//! entry recorded in this phase or any earlier one aborts the run.

use crate::args::interpolate_args;
use crate::pool::PooledModule;
use crate::signal::{CompletionSignal, CompletionSignals};
use crate::{ModulePool, RunState};
use futures::FutureExt;
use parking_lot::Mutex;
use recipe_types::{
    CriticalError, ErrorEntry, ModuleArgs, ModuleDescription, Parameters, Phase, Recipe,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::Instrument;

/// What a finished phase run looked like
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseOutcome {
    pub phase: Phase,
    /// Modules in the order their tasks finished
    pub completed: Vec<String>,
}

impl PhaseOutcome {
    /// Position of a module in completion order
    pub fn position(&self, module: &str) -> Option<usize> {
        self.completed.iter().position(|m| m == module)
    }
}

/// Runs a phase across every module of a loaded recipe
#[derive(Clone, Debug)]
pub struct PhaseExecutor {
    recipe: Arc<Recipe>,
    pool: Arc<ModulePool>,
    state: Arc<RunState>,
}

impl PhaseExecutor {
    pub fn new(recipe: Arc<Recipe>, pool: Arc<ModulePool>, state: Arc<RunState>) -> Self {
        Self {
            recipe,
            pool,
            state,
        }
    }

    /// Run `phase` for all modules and wait for every task to finish.
    ///
    /// `params` are interpolated into module arguments for the setup phase
    /// and ignored otherwise.
    pub async fn run(
        &self,
        phase: Phase,
        params: &Parameters,
    ) -> Result<PhaseOutcome, CriticalError> {
        let signals = Arc::new(CompletionSignals::for_recipe(&self.recipe));
        let completed = Arc::new(Mutex::new(Vec::with_capacity(self.recipe.len())));
        let params = Arc::new(params.clone());

        tracing::info!(
            run_id = %self.state.run_id(),
            %phase,
            modules = self.recipe.len(),
            "Phase started"
        );

        let mut tasks = Vec::with_capacity(self.recipe.len());
        for description in &self.recipe.modules {
            let task = ModuleTask {
                phase,
                description: description.clone(),
                module: self.pool.get(&description.name).cloned(),
                signals: Arc::clone(&signals),
                params: Arc::clone(&params),
                completed: Arc::clone(&completed),
                state: Arc::clone(&self.state),
            };
            let span = tracing::info_span!("module", name = %description.name, %phase);
            tasks.push((
                description.name.clone(),
                tokio::spawn(task.run().instrument(span)),
            ));
        }

        // Barrier: every task must reach its terminal state.
        for (name, handle) in tasks {
            if let Err(join_error) = handle.await {
                self.state.errors().add(
                    ErrorEntry::critical(format!("Module task aborted: {}", join_error))
                        .from_module(name),
                );
            }
        }

        let completed = std::mem::take(&mut *completed.lock());
        tracing::info!(
            run_id = %self.state.run_id(),
            %phase,
            completed = completed.len(),
            "Phase finished"
        );

        self.state
            .errors()
            .check()
            .map_err(|err| err.in_phase(phase))?;

        Ok(PhaseOutcome { phase, completed })
    }
}

/// Everything one module task owns
struct ModuleTask {
    phase: Phase,
    description: ModuleDescription,
    module: Option<Arc<PooledModule>>,
    signals: Arc<CompletionSignals>,
    params: Arc<Parameters>,
    completed: Arc<Mutex<Vec<String>>>,
    state: Arc<RunState>,
}

impl ModuleTask {
    async fn run(self) {
        let name = self.description.name.as_str();
        // Dependents are released even if this task unwinds.
        let _release = self.signals.get(name).cloned().map(ReleaseOnDrop);

        let Some(module) = self.module.clone() else {
            // The pool is built from the same recipe; only reachable when
            // the two are mismatched by a caller.
            self.state.errors().add(
                ErrorEntry::critical(format!("Module {} is not in the module pool", name))
                    .from_module(name),
            );
            self.finish();
            return;
        };
        let context = module.context().clone();

        if self.phase.is_gated() {
            for blocker in &self.description.wants {
                match self.signals.get(blocker) {
                    Some(signal) => {
                        tracing::debug!(waiting_on = %blocker, "Waiting for dependency");
                        signal.wait().await;
                    }
                    None => context.add_error(
                        format!("Module {} wants unknown module: {}", name, blocker),
                        true,
                    ),
                }
            }
        }

        if let Err(failure) = self.invoke(module).await {
            context.add_error(failure, true);
        }

        tracing::info!(module = name, phase = %self.phase, "Module completed");
        self.finish();
        context.promote_to_global();
    }

    /// Call the phase function once, turning errors and panics into text.
    ///
    /// The call runs on its own blocking thread, so a module body that
    /// blocks holds up only this task.
    async fn invoke(&self, module: Arc<PooledModule>) -> Result<(), String> {
        let phase = self.phase;
        let args = match phase {
            Phase::Setup => interpolate_args(&self.description.args, &self.params),
            Phase::Process => ModuleArgs::new(),
        };
        let handle = Handle::current();
        let span = tracing::Span::current();

        let call = tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let phase_call = async {
                let mut instance = module.lock().await;
                match phase {
                    Phase::Setup => instance.setup(&args).await,
                    Phase::Process => instance.process().await,
                }
            };
            handle.block_on(AssertUnwindSafe(phase_call).catch_unwind())
        });

        match call.await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(error))) => Err(error.describe()),
            Ok(Err(panic)) => Err(format!(
                "An unknown error occurred: module panicked: {}",
                panic_message(panic.as_ref())
            )),
            Err(join_error) => Err(format!("Module thread aborted: {}", join_error)),
        }
    }

    /// Set this module's completion signal and record it as done
    fn finish(&self) {
        let name = &self.description.name;
        if let Some(signal) = self.signals.get(name) {
            signal.set();
        }
        self.completed.lock().push(name.clone());
    }
}

/// Sets a completion signal when dropped
struct ReleaseOnDrop(CompletionSignal);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.set();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
