//! Module pool: the live module instances of a loaded recipe
//!
//! Built once per recipe load, before any task starts, and read-only
//! afterwards. Each instance sits behind its own async mutex; only the
//! task of the current phase ever takes it.

use crate::{Module, ModuleContext, ModuleRegistry, RunState};
use recipe_types::{Recipe, RecipeError, RecipeResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A module instance together with the context it was built with
pub struct PooledModule {
    instance: Mutex<Box<dyn Module>>,
    context: ModuleContext,
}

impl PooledModule {
    pub fn context(&self) -> &ModuleContext {
        &self.context
    }

    /// Exclusive access to the module instance
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Box<dyn Module>> {
        self.instance.lock().await
    }
}

impl std::fmt::Debug for PooledModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledModule")
            .field("module", &self.context.module_name())
            .finish()
    }
}

/// Module name → live instance
#[derive(Debug, Default)]
pub struct ModulePool {
    modules: HashMap<String, Arc<PooledModule>>,
}

impl ModulePool {
    /// Instantiate every module the recipe names.
    ///
    /// Fails with [`RecipeError::UnknownModule`] on the first name the
    /// registry cannot resolve. Neither setup nor process is invoked.
    pub fn load(
        recipe: &Recipe,
        registry: &ModuleRegistry,
        state: &Arc<RunState>,
    ) -> RecipeResult<Self> {
        let mut modules = HashMap::with_capacity(recipe.len());

        for description in &recipe.modules {
            let factory = registry
                .resolve(&description.name)
                .ok_or_else(|| RecipeError::UnknownModule(description.name.clone()))?;

            let context = ModuleContext::new(description.name.as_str(), Arc::clone(state));
            let instance = factory(context.clone());

            modules.insert(
                description.name.clone(),
                Arc::new(PooledModule {
                    instance: Mutex::new(instance),
                    context,
                }),
            );
        }

        tracing::info!(
            run_id = %state.run_id(),
            recipe = %recipe.name,
            modules = modules.len(),
            "Module pool loaded"
        );
        Ok(Self { modules })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PooledModule>> {
        self.modules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
