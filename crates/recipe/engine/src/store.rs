//! Container store: shared, typed artifacts exchanged between modules
//!
//! Containers are grouped by container type and kept in insertion order.
//! Writers are serialized; readers get a snapshot, so they never observe
//! a half-finished append.

use parking_lot::RwLock;
use recipe_types::{Container, DynContainer};
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrency-safe store of containers, keyed by container type
#[derive(Debug, Default)]
pub struct ContainerStore {
    containers: RwLock<HashMap<&'static str, Vec<Arc<dyn DynContainer>>>>,
}

impl ContainerStore {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Append a container under its container type
    pub fn put<C: Container>(&self, container: C) {
        self.put_shared(Arc::new(container));
    }

    /// Append an already shared container
    pub fn put_shared(&self, container: Arc<dyn DynContainer>) {
        let tag = container.container_type();
        self.containers
            .write()
            .entry(tag)
            .or_default()
            .push(container);
        tracing::trace!(container_type = tag, "Container stored");
    }

    /// Every container of type `C`, in storage order
    pub fn get<C: Container>(&self) -> Vec<Arc<C>> {
        self.get_by_type(C::CONTAINER_TYPE)
            .into_iter()
            .filter_map(|c| c.into_any().downcast::<C>().ok())
            .collect()
    }

    /// Snapshot of every container stored under `container_type`
    pub fn get_by_type(&self, container_type: &str) -> Vec<Arc<dyn DynContainer>> {
        self.containers
            .read()
            .get(container_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of containers stored under `container_type`
    pub fn count(&self, container_type: &str) -> usize {
        self.containers
            .read()
            .get(container_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Container types currently present
    pub fn container_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.containers.read().keys().copied().collect();
        types.sort_unstable();
        types
    }

    /// Total number of stored containers
    pub fn len(&self) -> usize {
        self.containers.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use recipe_types::Report;

    #[derive(Debug, PartialEq)]
    struct Output(String);

    impl Container for Output {
        const CONTAINER_TYPE: &'static str = "out";
    }

    /// Shares a tag with `Output` but is a different Rust type
    #[derive(Debug)]
    struct Impostor;

    impl Container for Impostor {
        const CONTAINER_TYPE: &'static str = "out";
    }

    #[test]
    fn test_put_and_get_in_order() {
        let store = ContainerStore::new();
        store.put(Output("first".into()));
        store.put(Report::new("M", "text"));
        store.put(Output("second".into()));

        let outputs = store.get::<Output>();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].0, "first");
        assert_eq!(outputs[1].0, "second");
        assert_eq!(store.get::<Report>().len(), 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.container_types(), vec!["out", "report"]);
    }

    #[test]
    fn test_get_unknown_type_is_empty() {
        let store = ContainerStore::new();
        assert!(store.get::<Report>().is_empty());
        assert!(store.get_by_type("nothing").is_empty());
        assert_eq!(store.count("nothing"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let store = ContainerStore::new();
        store.put(Output("a".into()));
        let snapshot = store.get_by_type("out");
        store.put(Output("b".into()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.count("out"), 2);
    }

    #[test]
    fn test_typed_get_skips_other_types_with_same_tag() {
        let store = ContainerStore::new();
        store.put(Output("real".into()));
        store.put(Impostor);

        assert_eq!(store.get_by_type("out").len(), 2);
        assert_eq!(store.get::<Output>(), vec![Arc::new(Output("real".into()))]);
    }

    #[test]
    fn test_concurrent_puts_lose_nothing() {
        let store = Arc::new(ContainerStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        store.put(Output(format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut values: Vec<_> = store.get::<Output>().iter().map(|o| o.0.clone()).collect();
        assert_eq!(values.len(), 2000);
        values.sort();
        values.dedup();
        assert_eq!(values.len(), 2000);
    }

    proptest! {
        #[test]
        fn property_count_matches_puts(tags in proptest::collection::vec(any::<bool>(), 0..64)) {
            let store = ContainerStore::new();
            for (i, is_output) in tags.iter().enumerate() {
                if *is_output {
                    store.put(Output(i.to_string()));
                } else {
                    store.put(Report::new("M", i.to_string()));
                }
            }

            let outputs = tags.iter().filter(|t| **t).count();
            prop_assert_eq!(store.count("out"), outputs);
            prop_assert_eq!(store.count("report"), tags.len() - outputs);
            prop_assert_eq!(store.len(), tags.len());
        }
    }
}
