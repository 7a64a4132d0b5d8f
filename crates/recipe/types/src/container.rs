//! Containers: typed data exchanged between modules
//!
//! A container is any `Send + Sync` value tagged with a container type.
//! Modules publish containers to the store and read back every container
//! of a given type, in storage order.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value that can be put in the container store
pub trait Container: Any + Send + Sync + fmt::Debug {
    /// Tag under which values of this type are stored
    const CONTAINER_TYPE: &'static str;
}

/// Object-safe view of a [`Container`], as held by the store
pub trait DynContainer: Any + Send + Sync + fmt::Debug {
    fn container_type(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<C: Container> DynContainer for C {
    fn container_type(&self) -> &'static str {
        C::CONTAINER_TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl dyn DynContainer {
    /// Borrow the payload as a concrete container type
    pub fn downcast_ref<C: Container>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }
}

// ── Report ───────────────────────────────────────────────────────────

/// Analysis report produced by a module
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Module that generated the report
    pub module_name: String,
    /// Report text
    pub text: String,
    /// Structured attributes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ReportAttribute>,
}

/// A named, typed attribute attached to a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub values: Vec<serde_json::Value>,
}

impl Report {
    pub fn new(module_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        attribute_type: impl Into<String>,
        values: Vec<serde_json::Value>,
    ) -> Self {
        self.attributes.push(ReportAttribute {
            name: name.into(),
            attribute_type: attribute_type.into(),
            values,
        });
        self
    }
}

impl Container for Report {
    const CONTAINER_TYPE: &'static str = "report";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Hash(String);

    impl Container for Hash {
        const CONTAINER_TYPE: &'static str = "hash";
    }

    #[test]
    fn test_dyn_container_tag() {
        let report: Arc<dyn DynContainer> = Arc::new(Report::new("Collector", "ok"));
        assert_eq!(report.container_type(), "report");

        let hash: Arc<dyn DynContainer> = Arc::new(Hash("abc".into()));
        assert_eq!(hash.container_type(), "hash");
    }

    #[test]
    fn test_downcast() {
        let stored: Arc<dyn DynContainer> = Arc::new(Report::new("Collector", "ok"));
        assert_eq!(stored.downcast_ref::<Report>().unwrap().text, "ok");
        assert!(stored.downcast_ref::<Hash>().is_none());

        let any = stored.into_any();
        assert_eq!(any.downcast::<Report>().unwrap().module_name, "Collector");
    }

    #[test]
    fn test_report_attributes_serialize_as_type() {
        let report = Report::new("Scanner", "2 hits").with_attribute(
            "hosts",
            "string",
            vec![serde_json::json!("a"), serde_json::json!("b")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["attributes"][0]["type"], "string");
        assert_eq!(json["attributes"][0]["values"].as_array().unwrap().len(), 2);
    }
}
