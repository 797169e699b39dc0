//! Classification of whole-module comparisons.

use api_bump::classify::{ChangeClassifier, RuleConfig, SemanticChangeLevel, classify};
use api_bump::diff::generate_type_diff;
use api_bump::model::{
    FieldRecord, MethodRecord, ModuleSnapshot, TypeRecord, TypeReference, Visibility,
};
use api_bump::query::QueryAggregator;

fn void() -> TypeReference {
    TypeReference::new("System", "Void")
}

fn level_of(old: Vec<TypeRecord>, new: Vec<TypeRecord>) -> SemanticChangeLevel {
    let diff = generate_type_diff(
        &ModuleSnapshot::new("Acme", old),
        &ModuleSnapshot::new("Acme", new),
        &QueryAggregator::public_and_protected(),
    )
    .unwrap();
    classify(&diff)
}

fn bar() -> TypeRecord {
    TypeRecord::class("Acme", "Bar")
        .with_method(MethodRecord::constructor())
        .with_method(MethodRecord::new("Run", void()))
}

#[test]
fn test_removed_type_is_major() {
    let level = level_of(vec![TypeRecord::class("Acme", "Foo"), bar()], vec![bar()]);
    assert_eq!(level, SemanticChangeLevel::Major);
}

#[test]
fn test_added_public_method_is_minor() {
    let level = level_of(
        vec![bar()],
        vec![bar().with_method(MethodRecord::new("Baz", void()))],
    );
    assert_eq!(level, SemanticChangeLevel::Minor);
}

#[test]
fn test_identical_snapshots_are_none() {
    assert_eq!(level_of(vec![bar()], vec![bar()]), SemanticChangeLevel::None);
}

#[test]
fn test_removal_dominates_addition() {
    let old = TypeRecord::class("Acme", "Bar").with_method(MethodRecord::new("Old", void()));
    let new = TypeRecord::class("Acme", "Bar").with_method(MethodRecord::new("New", void()));
    assert_eq!(level_of(vec![old], vec![new]), SemanticChangeLevel::Major);
}

#[test]
fn test_private_removal_is_none() {
    let secret = MethodRecord::new("Secret", void()).with_visibility(Visibility::Private);
    let old = bar().with_method(secret);
    assert_eq!(level_of(vec![old], vec![bar()]), SemanticChangeLevel::None);
}

#[test]
fn test_added_type_and_field_are_minor() {
    let level = level_of(vec![bar()], vec![bar(), TypeRecord::interface("Acme", "IBar")]);
    assert_eq!(level, SemanticChangeLevel::Minor);

    let count = FieldRecord::new("Count", TypeReference::new("System", "Int32"));
    let with_field = bar().with_field(count);
    assert_eq!(level_of(vec![bar()], vec![with_field.clone()]), SemanticChangeLevel::Minor);
    assert_eq!(level_of(vec![with_field], vec![bar()]), SemanticChangeLevel::Major);
}

#[test]
fn test_base_type_change_alone_is_not_classified() {
    let old = bar();
    let new = bar().with_base_type(TypeReference::new("Acme", "Base"));
    assert_eq!(level_of(vec![old], vec![new]), SemanticChangeLevel::None);
}

#[test]
fn test_except_rules_disable_findings() {
    let diff = generate_type_diff(
        &ModuleSnapshot::new("Acme", vec![TypeRecord::class("Acme", "Foo"), bar()]),
        &ModuleSnapshot::new("Acme", vec![bar()]),
        &QueryAggregator::public_and_protected(),
    )
    .unwrap();

    let config = RuleConfig {
        use_rules: Vec::new(),
        except_rules: vec!["TYPE_NO_DELETE".to_string()],
    };
    let result = ChangeClassifier::new().check(&diff, &config);
    assert_eq!(result.level, SemanticChangeLevel::None);
    assert!(!result.executed_rules.contains(&"TYPE_NO_DELETE".to_string()));
    assert_eq!(result.executed_rules.len(), 9);

    let full = ChangeClassifier::new().check(&diff, &RuleConfig::default());
    assert!(full.has_breaking_changes());
    assert_eq!(full.changes.len(), 1);
    assert_eq!(full.changes[0].rule_id, "TYPE_NO_DELETE");
    assert_eq!(full.changes[0].location.type_name, "Acme.Foo");
}

#[test]
fn test_parameter_direction_change_is_only_seen_with_matching_tokens() {
    use api_bump::model::ParameterRecord;

    let int = TypeReference::new("System", "Int32");
    let by_value = |token| {
        TypeRecord::class("Acme", "Bar").with_method(
            MethodRecord::new("TryGet", void())
                .with_parameters(vec![ParameterRecord::new(int.clone(), "value")])
                .with_token(token),
        )
    };
    let by_out = |token| {
        TypeRecord::class("Acme", "Bar").with_method(
            MethodRecord::new("TryGet", void())
                .with_parameters(vec![ParameterRecord::new(int.clone(), "value").out()])
                .with_token(token),
        )
    };

    // Tokens differ across builds, so the flip goes unnoticed.
    assert_eq!(level_of(vec![by_value(1)], vec![by_out(2)]), SemanticChangeLevel::None);
    assert_eq!(level_of(vec![by_value(7)], vec![by_out(7)]), SemanticChangeLevel::Major);
}
