//! Recipes: the declarative input of a run
//!
//! A Recipe is an ordered list of module descriptions. Each description
//! names a module, its arguments, and the modules it wants finished before
//! it starts processing.
//!
//! Recipes are immutable once loaded. Cycle detection is not performed.

use crate::{RecipeError, RecipeResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Run parameters substituted into recipe arguments (`@name` tokens)
pub type Parameters = BTreeMap<String, Value>;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for one orchestrator run
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First eight characters
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Module Arguments ─────────────────────────────────────────────────

/// Arguments handed to a module's setup phase
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleArgs(BTreeMap<String, Value>);

impl ModuleArgs {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get an argument as a string slice, if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a string argument, failing with a module error if absent
    pub fn require_str(&self, key: &str) -> crate::ModuleResult<&str> {
        self.get_str(key)
            .ok_or_else(|| crate::ModuleError::failed(format!("missing string argument '{key}'")))
    }

    /// Deserialize an argument into any serde type
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<serde_json::Result<T>> {
        self.0
            .get(key)
            .map(|value| serde_json::from_value(value.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for ModuleArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Module Description ───────────────────────────────────────────────

/// One entry of a recipe: which module to run, with what, after whom
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescription {
    /// Registry name of the module
    pub name: String,
    /// Arguments passed to setup (after parameter interpolation)
    #[serde(default, skip_serializing_if = "ModuleArgs::is_empty")]
    pub args: ModuleArgs,
    /// Modules that must finish processing before this one starts
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub wants: BTreeSet<String>,
}

impl ModuleDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: ModuleArgs::new(),
            wants: BTreeSet::new(),
        }
    }

    pub fn with_args(mut self, args: ModuleArgs) -> Self {
        self.args = args;
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key, value);
        self
    }

    pub fn wanting(mut self, dependency: impl Into<String>) -> Self {
        self.wants.insert(dependency.into());
        self
    }
}

// ── Recipe ───────────────────────────────────────────────────────────

/// An ordered set of module descriptions for one run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// What this recipe accomplishes
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Modules in declaration order
    pub modules: Vec<ModuleDescription>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            modules: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_module(mut self, module: ModuleDescription) -> Self {
        self.modules.push(module);
        self
    }

    /// Parse a recipe from JSON text
    pub fn from_json(text: &str) -> RecipeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a recipe from YAML text
    pub fn from_yaml(text: &str) -> RecipeResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Get a module description by name
    pub fn get_module(&self, name: &str) -> Option<&ModuleDescription> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Module names in declaration order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Check that module names are unique and every `wants` entry names a
    /// module of this recipe. Dependency cycles are not detected.
    pub fn validate(&self) -> RecipeResult<()> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(RecipeError::DuplicateModule(module.name.clone()));
            }
        }

        for module in &self.modules {
            if let Some(missing) = module.wants.iter().find(|w| !seen.contains(w.as_str())) {
                return Err(RecipeError::UnknownDependency {
                    module: module.name.clone(),
                    wants: missing.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage() -> Recipe {
        Recipe::new("two-stage")
            .with_module(ModuleDescription::new("A"))
            .with_module(ModuleDescription::new("B").wanting("A"))
    }

    #[test]
    fn test_parse_json() {
        let recipe = Recipe::from_json(
            r#"{
                "name": "local_triage",
                "modules": [
                    {"name": "Collector", "args": {"paths": ["/var/log"], "depth": 2}},
                    {"name": "Exporter", "wants": ["Collector"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(recipe.name, "local_triage");
        assert_eq!(recipe.len(), 2);
        let collector = recipe.get_module("Collector").unwrap();
        assert_eq!(collector.args.get_as::<u32>("depth").unwrap().unwrap(), 2);
        assert!(collector.wants.is_empty());
        assert!(recipe.get_module("Exporter").unwrap().wants.contains("Collector"));
    }

    #[test]
    fn test_parse_yaml() {
        let recipe = Recipe::from_yaml(
            "name: yaml\nmodules:\n  - name: A\n    args:\n      text: hello\n  - name: B\n    wants: [A]\n",
        )
        .unwrap();

        assert_eq!(recipe.module_names(), vec!["A", "B"]);
        assert_eq!(recipe.modules[0].args.get_str("text"), Some("hello"));
    }

    #[test]
    fn test_parse_missing_modules_fails() {
        let result = Recipe::from_json(r#"{"name": "empty"}"#);
        assert!(matches!(result, Err(RecipeError::Json(_))));
    }

    #[test]
    fn test_validate_ok() {
        assert!(two_stage().validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate() {
        let recipe = two_stage().with_module(ModuleDescription::new("A"));
        assert!(matches!(
            recipe.validate(),
            Err(RecipeError::DuplicateModule(name)) if name == "A"
        ));
    }

    #[test]
    fn test_validate_unknown_dependency() {
        let recipe = two_stage().with_module(ModuleDescription::new("C").wanting("Z"));
        match recipe.validate() {
            Err(RecipeError::UnknownDependency { module, wants }) => {
                assert_eq!(module, "C");
                assert_eq!(wants, "Z");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_does_not_detect_cycles() {
        let recipe = Recipe::new("cycle")
            .with_module(ModuleDescription::new("A").wanting("B"))
            .with_module(ModuleDescription::new("B").wanting("A"));
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_require_str() {
        let args = ModuleArgs::new().with("text", "hi").with("count", 3);
        assert_eq!(args.require_str("text").unwrap(), "hi");
        assert!(args.require_str("count").is_err());
        assert!(args.require_str("missing").is_err());
    }

    #[test]
    fn test_serialization_skips_empty() {
        let json = serde_json::to_value(ModuleDescription::new("A")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "A"}));
    }

    #[test]
    fn test_run_id_short() {
        let id = RunId::new("0123456789abcdef");
        assert_eq!(id.short(), "01234567");
        assert_eq!(RunId::new("abc").short(), "abc");
        assert_eq!(RunId::new("aéééééééé").short(), "aééééééé");
        assert_eq!(RunId::new("ééé").short(), "ééé");
    }
}
