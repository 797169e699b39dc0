//! Tests for YAML configuration loading and parsing

use api_bump::config::{BumpConfig, SurfacePreset};
use api_bump::version::IncrementPolicy;
use std::io::Write;

#[test]
fn test_load_yaml_config() {
    let yaml_content = r#"
version: v1
bump:
  surface: internal
  method_queries:
    - "public * *"
    - "protected virtual * *"
  except_rules:
    - FIELD_ADDED
  prerelease: beta
  build_metadata: ci.7
  increment_policy: prerelease-counter
"#;

    let config = BumpConfig::from_yaml_str(yaml_content).unwrap();

    assert_eq!(config.surface, SurfacePreset::Internal);
    assert_eq!(config.method_queries, vec!["public * *", "protected virtual * *"]);
    assert_eq!(config.except_rules, vec!["FIELD_ADDED"]);
    assert_eq!(config.prerelease.as_deref(), Some("beta"));
    assert_eq!(config.build_metadata.as_deref(), Some("ci.7"));
    assert_eq!(config.increment_policy, IncrementPolicy::PrereleaseCounter);
}

#[test]
fn test_load_empty_yaml_config() {
    let yaml_content = r#"
version: v1
"#;

    let config = BumpConfig::from_yaml_str(yaml_content).unwrap();

    // Should use default values
    assert_eq!(config, BumpConfig::default());
    assert_eq!(config.surface, SurfacePreset::Public);
    assert_eq!(config.increment_policy, IncrementPolicy::Patch);
}

#[test]
fn test_overrides_replace_only_their_kind() {
    let yaml_content = r#"
bump:
  type_queries:
    - "public class *"
"#;

    let config = BumpConfig::from_yaml_str(yaml_content).unwrap();
    let aggregator = config.query_aggregator().unwrap();
    let preset = SurfacePreset::Public.aggregator();

    assert_eq!(aggregator.type_queries().len(), 1);
    assert_eq!(aggregator.type_queries()[0].text(), "public class *");
    assert_eq!(aggregator.method_queries().len(), preset.method_queries().len());
    assert_eq!(aggregator.field_queries().len(), preset.field_queries().len());
}

#[test]
fn test_invalid_query_in_config() {
    let yaml_content = r#"
bump:
  field_queries:
    - "volatile int *"
"#;

    let config = BumpConfig::from_yaml_str(yaml_content).unwrap();
    assert!(config.query_aggregator().is_err());
}

#[test]
fn test_invalid_yaml() {
    assert!(BumpConfig::from_yaml_str("bump: [unclosed").is_err());
    assert!(BumpConfig::from_yaml_str("bump:\n  increment_policy: sometimes\n").is_err());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bump:\n  except_rules: [TYPE_ADDED]\n  prerelease: rc").unwrap();

    let config = BumpConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.rule_config().except_rules, vec!["TYPE_ADDED"]);
    assert!(!config.rule_config().is_enabled("TYPE_ADDED"));
    assert_eq!(config.version_calculator().prerelease.as_deref(), Some("rc"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BumpConfig::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_invalid_version_labels_in_config() {
    let err = BumpConfig::from_yaml_str("bump:\n  prerelease: \"beta 1\"\n").unwrap_err();
    assert!(err.to_string().contains("Invalid version labels"));
    assert!(BumpConfig::from_yaml_str("bump:\n  build_metadata: ci_7\n").is_err());
}
