//! Provides the high-level API for comparing two module snapshots.

use crate::classify::{ChangeClassifier, ClassificationResult, RuleConfig, SemanticChangeLevel};
use crate::diff::{AssemblyDiff, generate_type_diff};
use crate::generate_fingerprint;
use crate::model::ModuleSnapshot;
use crate::query::QueryAggregator;
use serde::Serialize;
use tracing::info;

/// Outcome of comparing an old surface with a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub level: SemanticChangeLevel,
    /// The fingerprints matched, so no diff was computed.
    pub identical: bool,
    pub diff: AssemblyDiff,
    pub classification: ClassificationResult,
}

impl ComparisonReport {
    pub fn is_breaking(&self) -> bool {
        self.level == SemanticChangeLevel::Major
    }
}

/// A module snapshot together with the fingerprint of its selected surface.
pub struct ApiSurface<'a> {
    pub snapshot: &'a ModuleSnapshot,
    /// SHA-256 of the canonical surface
    pub fingerprint: String,
}

impl<'a> ApiSurface<'a> {
    /// Fingerprints the part of `snapshot` selected by `queries`.
    pub fn try_from(
        snapshot: &'a ModuleSnapshot,
        queries: &QueryAggregator,
    ) -> crate::Result<Self> {
        let fingerprint = generate_fingerprint(snapshot, queries)?;
        Ok(ApiSurface {
            snapshot,
            fingerprint,
        })
    }

    /// Compares this (old) surface with `new_surface`. Both must have been
    /// fingerprinted with the same queries.
    pub fn compare_with(
        &self,
        new_surface: &ApiSurface,
        queries: &QueryAggregator,
        config: &RuleConfig,
    ) -> crate::Result<ComparisonReport> {
        queries.validate()?;

        if self.fingerprint == new_surface.fingerprint {
            info!(fingerprint = %self.fingerprint, "surfaces are identical");
            return Ok(ComparisonReport {
                identical: true,
                ..Default::default()
            });
        }

        let diff = generate_type_diff(self.snapshot, new_surface.snapshot, queries)?;
        let classification = ChangeClassifier::new().check(&diff, config);
        info!(
            level = %classification.level,
            changes = classification.changes.len(),
            "surfaces compared"
        );
        Ok(ComparisonReport {
            level: classification.level,
            identical: false,
            diff,
            classification,
        })
    }
}
