//! Error types shared by the query engine, diff engine and version calculator.

use thiserror::Error;

/// Malformed filter-query text or an unbalanced generic type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse \"{input}\" near position {position_hint}: {reason}")]
pub struct QueryParseError {
    /// The text that failed to parse.
    pub input: String,
    /// Byte offset where parsing gave up.
    pub position_hint: usize,
    pub reason: String,
}

impl QueryParseError {
    pub fn new(input: &str, position_hint: usize, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            position_hint,
            reason: reason.into(),
        }
    }
}

/// A query set or query mode that cannot produce a meaningful comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("at least one type query is required")]
    MissingTypeQueries,
    #[error("at least one method query is required")]
    MissingMethodQueries,
    #[error("at least one field query is required")]
    MissingFieldQueries,
    #[error("type query \"{0}\" selects no visibility")]
    NoVisibilitySelected(String),
    #[error("type query \"{0}\" selects no type kind")]
    NoKindSelected(String),
    #[error("modifier \"{modifier}\" is both required and negated in \"{query}\"")]
    ContradictoryModifier { query: String, modifier: String },
    #[error("modifier \"{modifier}\" cannot be used in \"{query}\"")]
    UnsupportedModifier { query: String, modifier: String },
}

/// A single-result lookup matched more than one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query \"{query}\" matched {count} methods, expected at most one")]
pub struct AmbiguousMatchError {
    pub query: String,
    pub count: usize,
}

/// A version string that is not a valid semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version \"{input}\": {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: String,
}

/// Umbrella error for library entry points.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] QueryParseError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousMatchError),
    #[error(transparent)]
    Version(#[from] VersionParseError),
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to decode configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_contains_position() {
        let err = QueryParseError::new("public void Foo(", 15, "unbalanced parenthesis");
        let text = err.to_string();
        assert!(text.contains("public void Foo("));
        assert!(text.contains("15"));
    }

    #[test]
    fn test_errors_convert_into_umbrella() {
        let err: Error = ConfigurationError::MissingTypeQueries.into();
        assert!(matches!(err, Error::Configuration(_)));

        let err: Error = AmbiguousMatchError {
            query: "* Foo".to_string(),
            count: 2,
        }
        .into();
        assert!(err.to_string().contains("2 methods"));
    }
}
