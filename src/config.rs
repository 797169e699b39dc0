//! YAML configuration for surface selection, rule filtering and version
//! calculation.

use crate::classify::RuleConfig;
use crate::query::QueryAggregator;
use crate::version::{IncrementPolicy, VersionCalculator};
use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Built-in query sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfacePreset {
    /// Public types; public, protected and protected internal members
    #[default]
    Public,
    /// The public surface plus internal types and members
    Internal,
}

impl SurfacePreset {
    pub fn aggregator(self) -> QueryAggregator {
        match self {
            SurfacePreset::Public => QueryAggregator::public_and_protected(),
            SurfacePreset::Internal => QueryAggregator::public_protected_and_internal(),
        }
    }
}

/// Configuration for a comparison run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BumpConfig {
    /// Preset query set
    #[serde(default)]
    pub surface: SurfacePreset,
    /// Type queries replacing the preset's (preset kept when empty)
    #[serde(default)]
    pub type_queries: Vec<String>,
    #[serde(default)]
    pub method_queries: Vec<String>,
    #[serde(default)]
    pub field_queries: Vec<String>,
    #[serde(default)]
    pub event_queries: Vec<String>,
    /// Specific rules to run (all rules when empty)
    #[serde(default)]
    pub use_rules: Vec<String>,
    /// Rules to explicitly disable
    #[serde(default)]
    pub except_rules: Vec<String>,
    /// Prerelease label for the next version
    #[serde(default)]
    pub prerelease: Option<String>,
    /// Build metadata appended to the next version
    #[serde(default)]
    pub build_metadata: Option<String>,
    #[serde(default)]
    pub increment_policy: IncrementPolicy,
}

impl BumpConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        #[derive(serde::Deserialize)]
        struct ConfigFile {
            bump: Option<BumpConfig>,
        }

        let config_file: ConfigFile =
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?;
        let config = config_file.bump.unwrap_or_default();
        config
            .version_calculator()
            .validate()
            .context("Invalid version labels in configuration")?;
        Ok(config)
    }

    /// Compiles the preset, replacing each kind that has overrides.
    pub fn query_aggregator(&self) -> crate::Result<QueryAggregator> {
        let mut aggregator = self.surface.aggregator();
        if !self.type_queries.is_empty() {
            aggregator.clear_type_queries();
            for text in &self.type_queries {
                aggregator.add_type_query(text)?;
            }
        }
        if !self.method_queries.is_empty() {
            aggregator.clear_method_queries();
            for text in &self.method_queries {
                aggregator.add_method_query(text)?;
            }
        }
        if !self.field_queries.is_empty() {
            aggregator.clear_field_queries();
            for text in &self.field_queries {
                aggregator.add_field_query(text)?;
            }
        }
        if !self.event_queries.is_empty() {
            aggregator.clear_event_queries();
            for text in &self.event_queries {
                aggregator.add_event_query(text)?;
            }
        }
        Ok(aggregator)
    }

    pub fn rule_config(&self) -> RuleConfig {
        RuleConfig {
            use_rules: self.use_rules.clone(),
            except_rules: self.except_rules.clone(),
        }
    }

    pub fn version_calculator(&self) -> VersionCalculator {
        VersionCalculator::new()
            .with_prerelease(self.prerelease.as_deref())
            .with_build_metadata(self.build_metadata.as_deref())
            .with_policy(self.increment_policy)
    }
}
