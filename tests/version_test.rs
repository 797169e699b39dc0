//! Next-version calculation from a version history.

use api_bump::classify::SemanticChangeLevel;
use api_bump::version::{IncrementPolicy, SemVersion, VersionCalculator, calculate_version};

fn history(list: &[&str]) -> Vec<SemVersion> {
    list.iter().map(|v| SemVersion::parse(v).unwrap()).collect()
}

fn next(level: SemanticChangeLevel, previous: &[&str]) -> String {
    calculate_version(level, &history(previous), None, IncrementPolicy::Patch)
        .unwrap()
        .to_string()
}

#[test]
fn test_major_bump_after_release() {
    assert_eq!(next(SemanticChangeLevel::Major, &["1.0.0"]), "2.0.0");
}

#[test]
fn test_patch_after_patch_releases() {
    assert_eq!(next(SemanticChangeLevel::None, &["1.2.0", "1.2.1"]), "1.2.2");
}

#[test]
fn test_first_release_is_seeded_alpha() {
    let version = calculate_version(
        SemanticChangeLevel::Major,
        &[],
        None,
        IncrementPolicy::Patch,
    )
    .unwrap();
    assert_eq!((version.major, version.minor, version.patch), (1, 0, 0));
    assert_eq!(version.prerelease, "alpha");
}

#[test]
fn test_base_is_latest_stable() {
    assert_eq!(next(SemanticChangeLevel::Minor, &["1.0.0", "2.0.0-beta"]), "1.1.0");
}

#[test]
fn test_history_order_does_not_matter() {
    assert_eq!(
        next(SemanticChangeLevel::Minor, &["1.3.0", "1.0.0", "1.2.5", "1.1.0"]),
        "1.4.0"
    );
    assert_eq!(next(SemanticChangeLevel::None, &["1.3.0", "1.3.2", "1.3.1"]), "1.3.3");
}

#[test]
fn test_calculator_with_all_options() {
    let calculator = VersionCalculator::new()
        .with_prerelease(Some("rc"))
        .with_build_metadata(Some("ci.42"))
        .with_policy(IncrementPolicy::PrereleaseCounter);

    let first = calculator
        .calculate(SemanticChangeLevel::Major, &history(&["1.4.2"]))
        .unwrap();
    assert_eq!(first.to_string(), "2.0.0-rc+ci.42");

    let second = calculator
        .calculate(SemanticChangeLevel::Major, &history(&["1.4.2", "2.0.0-rc"]))
        .unwrap();
    assert_eq!(second.to_string(), "2.0.0-rc.1+ci.42");
}

#[test]
fn test_invalid_history_entry() {
    let err = SemVersion::parse("1.0").unwrap_err();
    assert_eq!(err.input, "1.0");
}

#[test]
fn test_labels_must_form_a_valid_version() {
    for label in ["beta 1", "beta_1"] {
        let err = calculate_version(
            SemanticChangeLevel::Minor,
            &history(&["1.0.0"]),
            Some(label),
            IncrementPolicy::Patch,
        )
        .unwrap_err();
        assert_eq!(err.input, label);
        assert!(err.reason.contains("invalid prerelease"));
    }

    let next = calculate_version(
        SemanticChangeLevel::Minor,
        &history(&["1.0.0"]),
        Some("beta-1"),
        IncrementPolicy::Patch,
    )
    .unwrap();
    let reparsed: SemVersion = next.to_string().parse().unwrap();
    assert_eq!(reparsed.prerelease, "beta-1");
}

#[test]
fn test_top_of_range_history_does_not_wrap() {
    let top = format!("{}.0.0", u64::MAX);
    let result = calculate_version(
        SemanticChangeLevel::Major,
        &history(&[top.as_str()]),
        None,
        IncrementPolicy::Patch,
    );
    assert!(result.is_err());
}
