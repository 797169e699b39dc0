//! Runs the rule table over an assembly diff.

use super::rules;
use super::types::{ClassificationResult, RuleConfig, SemanticChangeLevel};
use crate::diff::AssemblyDiff;
use tracing::debug;

/// Stateless; the rules live in a static table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChangeClassifier;

impl ChangeClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, diff: &AssemblyDiff, config: &RuleConfig) -> ClassificationResult {
        let mut result = ClassificationResult::default();

        for (rule_id, _, rule_fn) in rules::get_rule_mapping() {
            if !config.is_enabled(rule_id) {
                continue;
            }
            let changes = rule_fn(diff);
            for change in &changes {
                debug!(
                    rule = *rule_id,
                    level = %change.level,
                    type_name = %change.location.type_name,
                    member = %change.location.member_name,
                    "rule hit"
                );
            }
            result.mark_rule_executed(rule_id);
            result.add_changes(changes);
        }

        result
    }
}

/// Change level of `diff` with every rule enabled.
pub fn classify(diff: &AssemblyDiff) -> SemanticChangeLevel {
    ChangeClassifier::new()
        .check(diff, &RuleConfig::default())
        .level
}
