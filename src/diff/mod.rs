//! Structural diffing of two module snapshots.

pub mod engine;
pub mod list_differ;
pub mod types;

pub use engine::generate_type_diff;
pub use list_differ::{diff, diff_set};
pub use types::{AssemblyDiff, DiffEntry, DiffOperation, DiffSet, TypeDiff};
