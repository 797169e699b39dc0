use api_bump::generate_fingerprint;
use api_bump::model::ModuleSnapshot;
use api_bump::query::QueryAggregator;

fn read_snapshot(file_name: &str) -> ModuleSnapshot {
    ModuleSnapshot::from_json_file(format!("tests/data/{file_name}"))
        .expect("Could not read test snapshot")
}

fn fingerprint(file_name: &str) -> String {
    let queries = QueryAggregator::public_and_protected();
    generate_fingerprint(&read_snapshot(file_name), &queries).unwrap()
}

#[test]
fn test_fingerprint_consistency_for_identical_files() {
    assert_eq!(fingerprint("widgets_v1.json"), fingerprint("widgets_v1.json"));
}

#[test]
fn test_fingerprint_is_hex_sha256() {
    let hash = fingerprint("widgets_v1.json");
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_fingerprint_ignores_declaration_order() {
    assert_eq!(fingerprint("widgets_v1.json"), fingerprint("widgets_v1_reordered.json"));
}

#[test]
fn test_fingerprint_ignores_non_public_changes() {
    assert_eq!(fingerprint("widgets_v1.json"), fingerprint("widgets_v1_private_changes.json"));
}

#[test]
fn test_fingerprint_depends_on_selected_surface() {
    let snapshot = read_snapshot("widgets_v1_private_changes.json");
    let baseline = read_snapshot("widgets_v1.json");
    let internal = QueryAggregator::public_protected_and_internal();
    assert_ne!(
        generate_fingerprint(&baseline, &internal).unwrap(),
        generate_fingerprint(&snapshot, &internal).unwrap()
    );
}

#[test]
fn test_fingerprint_detects_added_method() {
    assert_ne!(fingerprint("widgets_v1.json"), fingerprint("widgets_v2_minor.json"));
}

#[test]
fn test_fingerprint_detects_removed_type() {
    assert_ne!(fingerprint("widgets_v1.json"), fingerprint("widgets_v2_major.json"));
}
