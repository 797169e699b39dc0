pub mod canonical;
pub mod classify;
pub mod config;
pub mod diff;
pub mod equality;
pub mod error;
pub mod generic_name;
pub mod model;
pub mod normalize;
pub mod query;
pub mod surface;
pub mod version;
pub mod wildcard;

pub use classify::{SemanticChangeLevel, classify};
pub use config::{BumpConfig, SurfacePreset};
pub use diff::{AssemblyDiff, TypeDiff, generate_type_diff};
pub use error::{Error, Result};
pub use model::ModuleSnapshot;
pub use query::QueryAggregator;
pub use surface::{ApiSurface, ComparisonReport};
pub use version::{IncrementPolicy, SemVersion, VersionCalculator, calculate_version};

use sha2::{Digest, Sha256};

/// Generates a fingerprint for the API surface of a module snapshot.
///
/// The fingerprint is a SHA-256 hash of the canonical rendering of the
/// types and members selected by `queries`. It is insensitive to declaration
/// order and to anything the queries do not select, such as private members.
///
/// # Returns
///
/// The hex-encoded SHA-256 fingerprint string.
pub fn generate_fingerprint(
    snapshot: &ModuleSnapshot,
    queries: &QueryAggregator,
) -> Result<String> {
    // 1. Normalize the selected surface into the canonical representation.
    let canonical = normalize::normalize_surface(snapshot, queries);

    // 2. Serialize it to a stable JSON string.
    let json_string = serde_json::to_string_pretty(&canonical)?;

    // 3. Hash and hex-encode.
    let mut hasher = Sha256::new();
    hasher.update(json_string.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
