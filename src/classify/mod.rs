//! Maps an assembly diff to the semantic version component it requires.
//!
//! Removing a type, constructor, method, property or field is Major. Adding
//! one is Minor. Anything else is None.

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{ChangeClassifier, classify};
pub use types::{ApiChange, ChangeLocation, ClassificationResult, RuleConfig, SemanticChangeLevel};
