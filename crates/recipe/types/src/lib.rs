//! Recipe domain types
//!
//! A recipe is an ordered list of module descriptions. Each description
//! names a module, carries its arguments and declares which other modules
//! it wants to see finished before it starts processing.
//!
//! This crate holds the data model shared by the engine and by module
//! implementations:
//!
//! - [`Recipe`] / [`ModuleDescription`] / [`ModuleArgs`] — the declarative input
//! - [`Phase`] — the two phases every module goes through
//! - [`ErrorEntry`] — one line in an error ledger
//! - [`Container`] — the contract for data exchanged through the store
//! - [`Report`] — the stock report container
//!
//! # Example
//!
//! ```rust
//! use recipe_types::Recipe;
//!
//! let recipe = Recipe::from_json(r#"{
//!     "name": "triage",
//!     "modules": [
//!         {"name": "Collector", "args": {"path": "@target"}},
//!         {"name": "Exporter", "wants": ["Collector"]}
//!     ]
//! }"#).unwrap();
//!
//! recipe.validate().unwrap();
//! assert_eq!(recipe.module_names(), vec!["Collector", "Exporter"]);
//! ```

#![deny(unsafe_code)]

pub mod container;
pub mod error;
pub mod phase;
pub mod recipe;

pub use container::{Container, DynContainer, Report, ReportAttribute};
pub use error::{
    CriticalError, ErrorEntry, ModuleError, ModuleResult, RecipeError, RecipeResult,
};
pub use phase::Phase;
pub use recipe::{ModuleArgs, ModuleDescription, Parameters, Recipe, RunId};
