//! The module contract: what a recipe entry runs

use async_trait::async_trait;
use recipe_types::{ModuleArgs, ModuleResult};

/// A unit of work driven through the setup and process phases.
///
/// Instances are built once per recipe load by a registry factory, which
/// hands them a [`ModuleContext`](crate::ModuleContext) for reaching the
/// container store and reporting errors. Each phase function is called at
/// most once per run.
#[async_trait]
pub trait Module: Send + Sync {
    /// Receive the (interpolated) recipe arguments
    async fn setup(&mut self, args: &ModuleArgs) -> ModuleResult<()> {
        let _ = args;
        Ok(())
    }

    /// Do the module's work
    async fn process(&mut self) -> ModuleResult<()>;
}
