//! Core types for change classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal semantic version component implied by a diff.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SemanticChangeLevel {
    /// Nothing classifiable changed; callers treat this as a patch bump.
    #[default]
    None,
    Minor,
    Major,
}

impl fmt::Display for SemanticChangeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SemanticChangeLevel::None => "none",
            SemanticChangeLevel::Minor => "minor",
            SemanticChangeLevel::Major => "major",
        };
        f.write_str(text)
    }
}

/// Where a change was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLocation {
    /// Qualified name of the type
    pub type_name: String,
    /// "type", "constructor", "method", "property" or "field"
    pub member_kind: String,
    /// Member name; empty for whole-type changes
    pub member_name: String,
}

/// One classified API change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChange {
    /// Rule that reported the change
    pub rule_id: String,
    pub message: String,
    pub level: SemanticChangeLevel,
    pub location: ChangeLocation,
}

/// Which rules to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Only run these rules (all rules when empty)
    #[serde(default)]
    pub use_rules: Vec<String>,
    /// Rules to explicitly disable
    #[serde(default)]
    pub except_rules: Vec<String>,
}

impl RuleConfig {
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        if self.except_rules.iter().any(|r| r == rule_id) {
            return false;
        }
        self.use_rules.is_empty() || self.use_rules.iter().any(|r| r == rule_id)
    }
}

/// Result of classifying one diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Highest level among all changes
    pub level: SemanticChangeLevel,
    pub changes: Vec<ApiChange>,
    /// Rules that were executed
    pub executed_rules: Vec<String>,
}

impl ClassificationResult {
    pub fn add_changes(&mut self, changes: Vec<ApiChange>) {
        if let Some(max) = changes.iter().map(|c| c.level).max() {
            self.level = self.level.max(max);
        }
        self.changes.extend(changes);
    }

    pub fn mark_rule_executed(&mut self, rule_id: &str) {
        self.executed_rules.push(rule_id.to_string());
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.level == SemanticChangeLevel::Major
    }

    /// Changes reported at exactly `level`.
    pub fn changes_at(&self, level: SemanticChangeLevel) -> impl Iterator<Item = &ApiChange> {
        self.changes.iter().filter(move |c| c.level == level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(SemanticChangeLevel::Major > SemanticChangeLevel::Minor);
        assert!(SemanticChangeLevel::Minor > SemanticChangeLevel::None);
        assert_eq!(SemanticChangeLevel::default(), SemanticChangeLevel::None);
        assert_eq!(SemanticChangeLevel::Major.to_string(), "major");
    }

    #[test]
    fn test_rule_config_filters() {
        let config = RuleConfig {
            use_rules: Vec::new(),
            except_rules: vec!["FIELD_ADDED".to_string()],
        };
        assert!(config.is_enabled("TYPE_NO_DELETE"));
        assert!(!config.is_enabled("FIELD_ADDED"));

        let only = RuleConfig {
            use_rules: vec!["TYPE_NO_DELETE".to_string()],
            except_rules: Vec::new(),
        };
        assert!(only.is_enabled("TYPE_NO_DELETE"));
        assert!(!only.is_enabled("METHOD_NO_DELETE"));
    }
}
