//! Recipe Orchestrator Runtime
//!
//! The engine runs the modules of a recipe through two phases, setup and
//! process. Every module gets one task per phase and all tasks run
//! concurrently. In the process phase a task only starts its module once
//! every module it `wants` has finished.
//!
//! # Architecture
//!
//! The [`Orchestrator`] composes specialized components:
//!
//! - [`ModuleRegistry`] — Resolves recipe names to module factories
//! - [`ModulePool`] — Holds the live module instances of a loaded recipe
//! - [`ContainerStore`] — Typed artifacts shared between modules
//! - [`ErrorLedger`] — Local and global error tiers with abort checks
//! - [`CompletionSignals`] — Per-phase "module finished" flags
//! - [`PhaseExecutor`] — Spawns, gates and joins the module tasks
//!
//! # Error escalation
//!
//! A failing module never takes down its siblings. Its failure becomes a
//! critical entry in its local ledger, which is promoted to the global
//! ledger when its task ends. After each phase the global ledger is
//! checked and the run stops with a [`CriticalError`](recipe_types::CriticalError)
//! if any critical entry was ever recorded.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use recipe_engine::{Module, ModuleContext, ModuleRegistry, Orchestrator};
//! use recipe_types::*;
//!
//! struct Hello(ModuleContext);
//!
//! #[async_trait]
//! impl Module for Hello {
//!     async fn process(&mut self) -> ModuleResult<()> {
//!         self.0.store_container(Report::new(self.0.module_name(), "hello"));
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let registry = ModuleRegistry::new().with("Hello", Hello);
//! let mut orchestrator = Orchestrator::new(registry);
//! orchestrator
//!     .load_recipe(Recipe::new("demo").with_module(ModuleDescription::new("Hello")))
//!     .unwrap();
//!
//! orchestrator.run(&Parameters::new()).await.unwrap();
//! assert_eq!(orchestrator.store().get::<Report>().len(), 1);
//! # });
//! ```

#![deny(unsafe_code)]

pub mod args;
pub mod context;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod module;
pub mod orchestrator;
pub mod pool;
pub mod registry;
pub mod signal;
pub mod store;

// Re-export main types
pub use args::{interpolate_args, interpolate_value};
pub use context::{ModuleContext, RunState};
pub use error::{EngineError, EngineResult};
pub use executor::{PhaseExecutor, PhaseOutcome};
pub use ledger::{ErrorLedger, LedgerScope};
pub use module::Module;
pub use orchestrator::{Orchestrator, RunSummary};
pub use pool::{ModulePool, PooledModule};
pub use registry::{ModuleFactory, ModuleRegistry};
pub use signal::{CompletionSignal, CompletionSignals};
pub use store::ContainerStore;
