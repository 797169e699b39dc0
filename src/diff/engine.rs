//! Module level diffing.

use super::list_differ::diff_set;
use super::types::{AssemblyDiff, TypeDiff};
use crate::equality::type_equal;
use crate::error::ConfigurationError;
use crate::model::ModuleSnapshot;
use crate::query::QueryAggregator;
use rayon::prelude::*;
use tracing::{debug, info};

/// Compares two module snapshots through `queries`.
///
/// Types selected on only one side land in `added_removed_types`; types on
/// both sides are diffed member by member, in parallel, and kept only when
/// something changed. Fails before doing any work when `queries` lacks a
/// type, method or field query.
pub fn generate_type_diff(
    v1: &ModuleSnapshot,
    v2: &ModuleSnapshot,
    queries: &QueryAggregator,
) -> Result<AssemblyDiff, ConfigurationError> {
    queries.validate()?;

    let old_types = queries.execute_types(v1);
    let new_types = queries.execute_types(v2);
    debug!(
        old = old_types.len(),
        new = new_types.len(),
        "selected types for comparison"
    );

    let added_removed = diff_set(&old_types, &new_types, type_equal);

    let changed: Vec<TypeDiff> = old_types
        .par_iter()
        .filter_map(|old| {
            let new = new_types.iter().find(|candidate| type_equal(old, candidate))?;
            let type_diff = TypeDiff::generate(old, new, queries);
            debug!(
                type_name = %old.qualified_name(),
                changed = type_diff.is_some(),
                "diffed type pair"
            );
            type_diff
        })
        .collect();

    info!(
        added_types = added_removed.added_count(),
        removed_types = added_removed.removed_count(),
        changed_types = changed.len(),
        "module comparison finished"
    );
    Ok(AssemblyDiff::new(added_removed, changed))
}
