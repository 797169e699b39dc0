//! Classification rules.
//!
//! Every rule walks the diff tree and reports one `ApiChange` per finding.
//! Removal rules are Major, their additive counterparts Minor.

use super::types::{ApiChange, ChangeLocation, SemanticChangeLevel};
use crate::diff::{AssemblyDiff, TypeDiff};
use crate::equality::method_equal;
use crate::model::{FieldRecord, MethodRecord, PropertyRecord, TypeRecord};

pub type RuleFn = fn(&AssemblyDiff) -> Vec<ApiChange>;

/// Rule table: `(rule_id, level, check)`.
const RULES: &[(&str, SemanticChangeLevel, RuleFn)] = &[
    ("TYPE_NO_DELETE", SemanticChangeLevel::Major, check_type_no_delete),
    ("CONSTRUCTOR_NO_DELETE", SemanticChangeLevel::Major, check_constructor_no_delete),
    ("METHOD_NO_DELETE", SemanticChangeLevel::Major, check_method_no_delete),
    ("PROPERTY_NO_DELETE", SemanticChangeLevel::Major, check_property_no_delete),
    ("FIELD_NO_DELETE", SemanticChangeLevel::Major, check_field_no_delete),
    ("TYPE_ADDED", SemanticChangeLevel::Minor, check_type_added),
    ("CONSTRUCTOR_ADDED", SemanticChangeLevel::Minor, check_constructor_added),
    ("METHOD_ADDED", SemanticChangeLevel::Minor, check_method_added),
    ("PROPERTY_ADDED", SemanticChangeLevel::Minor, check_property_added),
    ("FIELD_ADDED", SemanticChangeLevel::Minor, check_field_added),
];

pub fn get_rule_mapping() -> &'static [(&'static str, SemanticChangeLevel, RuleFn)] {
    RULES
}

pub fn rule_ids() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|(id, _, _)| *id)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Removed,
    Added,
}

impl Side {
    fn level(self) -> SemanticChangeLevel {
        match self {
            Side::Removed => SemanticChangeLevel::Major,
            Side::Added => SemanticChangeLevel::Minor,
        }
    }

    fn rule_id(self, kind: &str) -> String {
        match self {
            Side::Removed => format!("{}_NO_DELETE", kind.to_ascii_uppercase()),
            Side::Added => format!("{}_ADDED", kind.to_ascii_uppercase()),
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Side::Removed => "removed from",
            Side::Added => "added to",
        }
    }

    /// The type version whose declarations describe the changed members.
    fn declaring(self, type_diff: &TypeDiff) -> &TypeRecord {
        match self {
            Side::Removed => &type_diff.old_type,
            Side::Added => &type_diff.new_type,
        }
    }

    fn methods(self, type_diff: &TypeDiff) -> Vec<&MethodRecord> {
        match self {
            Side::Removed => type_diff.methods.removed().collect(),
            Side::Added => type_diff.methods.added().collect(),
        }
    }

    fn fields(self, type_diff: &TypeDiff) -> Vec<&FieldRecord> {
        match self {
            Side::Removed => type_diff.fields.removed().collect(),
            Side::Added => type_diff.fields.added().collect(),
        }
    }
}

fn member_change(side: Side, kind: &str, record: &TypeRecord, member_name: &str) -> ApiChange {
    let type_name = record.qualified_name();
    ApiChange {
        rule_id: side.rule_id(kind),
        message: format!(
            "{} \"{}\" was {} \"{}\".",
            capitalize(kind),
            member_name,
            side.verb(),
            type_name
        ),
        level: side.level(),
        location: ChangeLocation {
            type_name,
            member_kind: kind.to_string(),
            member_name: member_name.to_string(),
        },
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Constructors are recognised by their runtime name or by carrying the
/// declaring type's name.
fn is_constructor(method: &MethodRecord, declaring: &TypeRecord) -> bool {
    method.is_constructor() || method.name == declaring.simple_name()
}

fn check_types(diff: &AssemblyDiff, side: Side) -> Vec<ApiChange> {
    let types: Vec<&TypeRecord> = match side {
        Side::Removed => diff.added_removed_types().removed().collect(),
        Side::Added => diff.added_removed_types().added().collect(),
    };
    types
        .into_iter()
        .map(|record| {
            let type_name = record.qualified_name();
            let action = match side {
                Side::Removed => "removed",
                Side::Added => "added",
            };
            ApiChange {
                rule_id: side.rule_id("type"),
                message: format!(
                    "{} \"{}\" was {}.",
                    capitalize(record.kind.as_str()),
                    type_name,
                    action
                ),
                level: side.level(),
                location: ChangeLocation {
                    type_name,
                    member_kind: "type".to_string(),
                    member_name: String::new(),
                },
            }
        })
        .collect()
}

fn check_constructors(diff: &AssemblyDiff, side: Side) -> Vec<ApiChange> {
    let mut changes = Vec::new();
    for type_diff in diff.changed_types() {
        let declaring = side.declaring(type_diff);
        for method in side.methods(type_diff) {
            if is_constructor(method, declaring) {
                let signature = signature(declaring.simple_name(), method);
                changes.push(member_change(side, "constructor", declaring, &signature));
            }
        }
    }
    changes
}

fn check_methods(diff: &AssemblyDiff, side: Side) -> Vec<ApiChange> {
    let mut changes = Vec::new();
    for type_diff in diff.changed_types() {
        let declaring = side.declaring(type_diff);
        for method in side.methods(type_diff) {
            if !method.is_special_name && !is_constructor(method, declaring) {
                let signature = signature(&method.name, method);
                changes.push(member_change(side, "method", declaring, &signature));
            }
        }
    }
    changes
}

/// Accessor entries are attributed to the declared property owning an
/// equal accessor; each property is reported once even when both of its
/// accessors changed.
fn check_properties(diff: &AssemblyDiff, side: Side) -> Vec<ApiChange> {
    let mut changes = Vec::new();
    for type_diff in diff.changed_types() {
        let declaring = side.declaring(type_diff);
        let mut reported: Vec<&PropertyRecord> = Vec::new();
        for method in side.methods(type_diff) {
            if !method.is_special_name {
                continue;
            }
            let owner = declaring
                .properties
                .iter()
                .find(|p| p.accessors().any(|accessor| method_equal(accessor, method, true)));
            if let Some(property) = owner {
                if !reported.iter().any(|seen| seen.name == property.name) {
                    reported.push(property);
                    changes.push(member_change(side, "property", declaring, &property.name));
                }
            }
        }
    }
    changes
}

fn check_fields(diff: &AssemblyDiff, side: Side) -> Vec<ApiChange> {
    let mut changes = Vec::new();
    for type_diff in diff.changed_types() {
        let declaring = side.declaring(type_diff);
        for field in side.fields(type_diff) {
            changes.push(member_change(side, "field", declaring, &field.name));
        }
    }
    changes
}

fn signature(name: &str, method: &MethodRecord) -> String {
    let parameters: Vec<String> = method
        .parameters
        .iter()
        .map(|p| p.parameter_type.display_name())
        .collect();
    format!("{}({})", name, parameters.join(", "))
}

pub fn check_type_no_delete(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_types(diff, Side::Removed)
}

pub fn check_constructor_no_delete(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_constructors(diff, Side::Removed)
}

pub fn check_method_no_delete(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_methods(diff, Side::Removed)
}

pub fn check_property_no_delete(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_properties(diff, Side::Removed)
}

pub fn check_field_no_delete(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_fields(diff, Side::Removed)
}

pub fn check_type_added(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_types(diff, Side::Added)
}

pub fn check_constructor_added(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_constructors(diff, Side::Added)
}

pub fn check_method_added(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_methods(diff, Side::Added)
}

pub fn check_property_added(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_properties(diff, Side::Added)
}

pub fn check_field_added(diff: &AssemblyDiff) -> Vec<ApiChange> {
    check_fields(diff, Side::Added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::generate_type_diff;
    use crate::model::{ModuleSnapshot, TypeReference};
    use crate::query::QueryAggregator;

    fn int() -> TypeReference {
        TypeReference::new("System", "Int32")
    }

    fn diff_of(old: TypeRecord, new: TypeRecord) -> AssemblyDiff {
        generate_type_diff(
            &ModuleSnapshot::new("Acme", vec![old]),
            &ModuleSnapshot::new("Acme", vec![new]),
            &QueryAggregator::public_and_protected(),
        )
        .unwrap()
    }

    #[test]
    fn test_rule_table_is_complete() {
        let ids: Vec<_> = rule_ids().collect();
        assert_eq!(ids.len(), 10);
        for (id, level, _) in get_rule_mapping() {
            let expected = if id.ends_with("_NO_DELETE") {
                SemanticChangeLevel::Major
            } else {
                SemanticChangeLevel::Minor
            };
            assert_eq!(*level, expected, "{id}");
        }
    }

    #[test]
    fn test_property_removal_is_reported_once() {
        let old = TypeRecord::class("Acme", "Widget").with_property("Size", int(), true, true);
        let new = TypeRecord::class("Acme", "Widget");
        let diff = diff_of(old, new);

        let properties = check_property_no_delete(&diff);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].location.member_name, "Size");
        assert!(check_method_no_delete(&diff).is_empty());
    }

    #[test]
    fn test_property_addition() {
        let old = TypeRecord::class("Acme", "Widget");
        let new = TypeRecord::class("Acme", "Widget").with_property("Size", int(), true, false);
        let diff = diff_of(old, new);
        let properties = check_property_added(&diff);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].level, SemanticChangeLevel::Minor);
        assert_eq!(properties[0].rule_id, "PROPERTY_ADDED");
    }

    #[test]
    fn test_constructor_changes() {
        let old = TypeRecord::class("Acme", "Widget")
            .with_method(MethodRecord::constructor().with_parameter(int(), "size"));
        let new = TypeRecord::class("Acme", "Widget").with_method(MethodRecord::constructor());
        let diff = diff_of(old, new);

        let removed = check_constructor_no_delete(&diff);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].location.member_name, "Widget(int)");
        assert_eq!(check_constructor_added(&diff).len(), 1);
        assert!(check_method_no_delete(&diff).is_empty());
    }

    #[test]
    fn test_special_name_method_without_property_is_ignored() {
        let equality = MethodRecord::new("op_Equality", TypeReference::new("System", "Boolean"))
            .as_special_name();
        let old = TypeRecord::class("Acme", "Widget").with_method(equality);
        let new = TypeRecord::class("Acme", "Widget");
        let diff = diff_of(old, new);
        assert!(check_property_no_delete(&diff).is_empty());
        assert!(check_method_no_delete(&diff).is_empty());
    }

    #[test]
    fn test_field_removal_message() {
        let old = TypeRecord::class("Acme", "Widget").with_field(FieldRecord::new("Count", int()));
        let new = TypeRecord::class("Acme", "Widget");
        let changes = check_field_no_delete(&diff_of(old, new));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].message, "Field \"Count\" was removed from \"Acme.Widget\".");
    }
}
