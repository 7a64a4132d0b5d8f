//! Module registry: resolves recipe module names to factories
//!
//! The engine only knows modules through this registry. Concrete modules
//! live elsewhere and register a factory under the name recipes use.

use crate::{Module, ModuleContext};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a module instance bound to its context
pub type ModuleFactory = Arc<dyn Fn(ModuleContext) -> Box<dyn Module> + Send + Sync>;

/// Name → factory lookup
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any earlier one
    pub fn register<F, M>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(ModuleContext) -> M + Send + Sync + 'static,
        M: Module + 'static,
    {
        let name = name.into();
        let boxed: ModuleFactory =
            Arc::new(move |ctx: ModuleContext| -> Box<dyn Module> { Box::new(factory(ctx)) });
        if self.factories.insert(name.clone(), boxed).is_some() {
            tracing::warn!(module = %name, "Module factory replaced");
        } else {
            tracing::debug!(module = %name, "Module registered");
        }
        self
    }

    /// Chaining form of [`register`](Self::register)
    pub fn with<F, M>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(ModuleContext) -> M + Send + Sync + 'static,
        M: Module + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Remove a registration; returns whether one existed
    pub fn deregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn resolve(&self, name: &str) -> Option<&ModuleFactory> {
        self.factories.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RunState;
    use async_trait::async_trait;
    use recipe_types::ModuleResult;

    struct Noop;

    #[async_trait]
    impl Module for Noop {
        async fn process(&mut self) -> ModuleResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = ModuleRegistry::new()
            .with("Noop", |_| Noop)
            .with("Other", |_| Noop);

        assert_eq!(registry.names(), vec!["Noop", "Other"]);
        assert!(registry.contains("Noop"));
        assert!(registry.resolve("Missing").is_none());

        let factory = registry.resolve("Noop").unwrap();
        let ctx = ModuleContext::new("Noop", Arc::new(RunState::new()));
        let _module: Box<dyn Module> = factory(ctx);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ModuleRegistry::new();
        registry.register("Noop", |_| Noop);
        registry.register("Noop", |_| Noop);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deregister() {
        let mut registry = ModuleRegistry::new().with("Noop", |_| Noop);
        assert!(registry.deregister("Noop"));
        assert!(!registry.deregister("Noop"));
        assert!(registry.is_empty());
    }
}
