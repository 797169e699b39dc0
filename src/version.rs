//! Semantic versions and next-version calculation.

use crate::classify::SemanticChangeLevel;
use crate::error::VersionParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Label used when a module has no published version yet.
pub const DEFAULT_INITIAL_PRERELEASE: &str = "alpha";

/// `MAJOR.MINOR.PATCH[-PRERELEASE][+BUILD]`.
///
/// Ordering follows SemVer 2.0 precedence: build metadata is ignored and a
/// prerelease sorts below the release with the same core.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: String,
    pub build: String,
}

impl SemVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: String::new(),
            build: String::new(),
        }
    }

    /// Accepts an optional leading `v`.
    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        let error = |reason: &str| VersionParseError {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let text = input.trim();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => (rest, build),
            None => (text, ""),
        };
        let (core, prerelease) = match rest.split_once('-') {
            Some((core, pre)) => (core, pre),
            None => (rest, ""),
        };

        let numbers: Vec<&str> = core.split('.').collect();
        if numbers.len() != 3 {
            return Err(error("expected MAJOR.MINOR.PATCH"));
        }
        let mut parsed = [0u64; 3];
        for (slot, number) in parsed.iter_mut().zip(&numbers) {
            if number.len() > 1 && number.starts_with('0') {
                return Err(error("numeric component has a leading zero"));
            }
            *slot = number
                .parse()
                .map_err(|_| error("numeric component is not a number"))?;
        }

        if rest.contains('-') && prerelease.is_empty() {
            return Err(error("empty prerelease"));
        }
        if text.contains('+') && build.is_empty() {
            return Err(error("empty build metadata"));
        }
        if !prerelease.is_empty() {
            check_prerelease(prerelease).map_err(|reason| error(&reason))?;
        }
        if !build.is_empty() {
            check_build(build).map_err(|reason| error(&reason))?;
        }

        Ok(Self {
            major: parsed[0],
            minor: parsed[1],
            patch: parsed[2],
            prerelease: prerelease.to_string(),
            build: build.to_string(),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// Component bump; `None` bumps the patch. Fails when the bumped
    /// component is already `u64::MAX`.
    pub fn bump(&self, level: SemanticChangeLevel) -> Result<Self, VersionParseError> {
        let bumped = match level {
            SemanticChangeLevel::Major => Self::new(increment(self, self.major)?, 0, 0),
            SemanticChangeLevel::Minor => Self::new(self.major, increment(self, self.minor)?, 0),
            SemanticChangeLevel::None => {
                Self::new(self.major, self.minor, increment(self, self.patch)?)
            }
        };
        Ok(bumped)
    }

    pub fn with_prerelease(mut self, prerelease: &str) -> Self {
        self.prerelease = prerelease.to_string();
        self
    }

    pub fn with_build(mut self, build: &str) -> Self {
        self.build = build.to_string();
        self
    }

    fn same_line(&self, other: &SemVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    fn core(&self) -> Self {
        Self::new(self.major, self.minor, self.patch)
    }
}

fn increment(version: &SemVersion, component: u64) -> Result<u64, VersionParseError> {
    component.checked_add(1).ok_or_else(|| VersionParseError {
        input: version.to_string(),
        reason: "version component overflows".to_string(),
    })
}

fn valid_identifiers(label: &str) -> bool {
    label.split('.').all(|ident| {
        !ident.is_empty() && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Numeric prerelease identifiers may not carry leading zeros.
fn check_prerelease(label: &str) -> Result<(), String> {
    let leading_zero = label.split('.').any(|ident| {
        ident.len() > 1 && ident.starts_with('0') && ident.chars().all(|c| c.is_ascii_digit())
    });
    if !valid_identifiers(label) || leading_zero {
        return Err(format!("invalid prerelease \"{label}\""));
    }
    Ok(())
}

fn check_build(label: &str) -> Result<(), String> {
    if !valid_identifiers(label) {
        return Err(format!("invalid build metadata \"{label}\""));
    }
    Ok(())
}

fn compare_prerelease(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(m), Ok(n)) => m.cmp(&n),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

impl Ord for SemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(&self.prerelease, &other.prerelease))
    }
}

impl PartialOrd for SemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SemVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for SemVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SemVersion> for String {
    fn from(version: SemVersion) -> Self {
        version.to_string()
    }
}

/// How a version on an already used major.minor line is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncrementPolicy {
    /// Bump the patch of the latest version on the line.
    #[default]
    Patch,
    /// Keep the core version of a matching prerelease and bump its trailing
    /// counter (`beta` -> `beta.1` -> `beta.2`).
    PrereleaseCounter,
}

/// Splits `beta.3` into (`beta`, Some(3)).
fn split_counter(prerelease: &str) -> (&str, Option<u64>) {
    match prerelease.rsplit_once('.') {
        Some((base, last)) => match last.parse::<u64>() {
            Ok(counter) => (base, Some(counter)),
            Err(_) => (prerelease, None),
        },
        None => (prerelease, None),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCalculator {
    #[serde(default)]
    pub prerelease: Option<String>,
    #[serde(default)]
    pub build_metadata: Option<String>,
    #[serde(default)]
    pub policy: IncrementPolicy,
}

impl VersionCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prerelease(mut self, prerelease: Option<&str>) -> Self {
        self.prerelease = prerelease.map(str::to_string);
        self
    }

    pub fn with_build_metadata(mut self, build: Option<&str>) -> Self {
        self.build_metadata = build.map(str::to_string);
        self
    }

    pub fn with_policy(mut self, policy: IncrementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rejects a prerelease label or build metadata that would not render
    /// as a valid version.
    pub fn validate(&self) -> Result<(), VersionParseError> {
        let invalid = |label: &str, reason: String| VersionParseError {
            input: label.to_string(),
            reason,
        };
        if let Some(label) = self.prerelease.as_deref().filter(|l| !l.is_empty()) {
            check_prerelease(label).map_err(|reason| invalid(label, reason))?;
        }
        if let Some(build) = self.build_metadata.as_deref().filter(|b| !b.is_empty()) {
            check_build(build).map_err(|reason| invalid(build, reason))?;
        }
        Ok(())
    }

    /// Next version after `previous` for a change of `level`.
    ///
    /// The bump is applied to the latest stable version (or a 0.1.0 seed).
    /// When the resulting major.minor line already has versions, the next
    /// version follows the latest of them instead.
    pub fn calculate(
        &self,
        level: SemanticChangeLevel,
        previous: &[SemVersion],
    ) -> Result<SemVersion, VersionParseError> {
        self.validate()?;
        let seed = SemVersion::new(0, 1, 0);
        let base = previous
            .iter()
            .filter(|v| !v.is_prerelease())
            .max()
            .unwrap_or(&seed);
        let next = base.bump(level)?;
        let label = self.prerelease.as_deref().unwrap_or("");

        let latest_at_level = previous.iter().filter(|v| v.same_line(&next)).max();
        let mut version = match latest_at_level {
            Some(latest) => self.follow(latest, label)?,
            None if !previous.is_empty() => next.with_prerelease(label),
            None => next.with_prerelease(
                self.prerelease
                    .as_deref()
                    .unwrap_or(DEFAULT_INITIAL_PRERELEASE),
            ),
        };
        if let Some(build) = &self.build_metadata {
            version = version.with_build(build);
        }

        debug!(
            %level,
            base = %base,
            latest_at_level = ?latest_at_level.map(ToString::to_string),
            result = %version,
            "calculated next version"
        );
        Ok(version)
    }

    fn follow(&self, latest: &SemVersion, label: &str) -> Result<SemVersion, VersionParseError> {
        if self.policy == IncrementPolicy::Patch || label.is_empty() {
            return Ok(latest.bump(SemanticChangeLevel::None)?.with_prerelease(label));
        }
        let (latest_base, counter) = split_counter(&latest.prerelease);
        if latest.is_prerelease() && latest_base == label {
            let counter = match counter {
                Some(c) => increment(latest, c)?,
                None => 1,
            };
            Ok(latest.core().with_prerelease(&format!("{label}.{counter}")))
        } else {
            let patched = latest.bump(SemanticChangeLevel::None)?;
            Ok(patched.with_prerelease(&format!("{label}.1")))
        }
    }
}

/// Convenience wrapper around [`VersionCalculator::calculate`].
pub fn calculate_version(
    level: SemanticChangeLevel,
    previous: &[SemVersion],
    prerelease: Option<&str>,
    policy: IncrementPolicy,
) -> Result<SemVersion, VersionParseError> {
    VersionCalculator::new()
        .with_prerelease(prerelease)
        .with_policy(policy)
        .calculate(level, previous)
}
