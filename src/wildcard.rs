//! Wildcard (`*`) string matching with a per-matcher regex cache.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CaseSensitivity {
    #[default]
    Sensitive,
    Insensitive,
}

/// Matches `*` wildcard filters against names.
///
/// Filters with at most a leading and/or trailing `*` are resolved with plain
/// string comparisons. Any interior `*` compiles an anchored regex that is
/// memoized for the lifetime of the matcher; the cache only ever grows.
#[derive(Debug, Default)]
pub struct WildcardMatcher {
    cache: RwLock<HashMap<(String, CaseSensitivity), Regex>>,
}

static DEFAULT_MATCHER: Lazy<Arc<WildcardMatcher>> = Lazy::new(|| Arc::new(WildcardMatcher::new()));

impl WildcardMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared matcher used when queries are parsed without an explicit one.
    pub fn shared() -> Arc<WildcardMatcher> {
        Arc::clone(&DEFAULT_MATCHER)
    }

    pub fn match_wildcard(
        &self,
        filter: Option<&str>,
        value: Option<&str>,
        case: CaseSensitivity,
    ) -> bool {
        let filter = match filter {
            None | Some("*") => return true,
            Some(f) => f,
        };
        let Some(value) = value else {
            return false;
        };

        let star_count = filter.matches('*').count();
        let leading = filter.starts_with('*');
        let trailing = filter.len() > 1 && filter.ends_with('*');
        let edge_stars = usize::from(leading) + usize::from(trailing);

        if star_count == edge_stars {
            let core = &filter[usize::from(leading)..filter.len() - usize::from(trailing)];
            let (core, value) = match case {
                CaseSensitivity::Sensitive => (core.to_string(), value.to_string()),
                CaseSensitivity::Insensitive => (core.to_lowercase(), value.to_lowercase()),
            };
            return match (leading, trailing) {
                (true, true) => value.contains(&core),
                (true, false) => value.ends_with(&core),
                (false, true) => value.starts_with(&core),
                (false, false) => value == core,
            };
        }

        self.regex_match(filter, value, case)
    }

    /// Number of compiled patterns held by this matcher.
    pub fn cached_patterns(&self) -> usize {
        self.cache.read().len()
    }

    fn regex_match(&self, filter: &str, value: &str, case: CaseSensitivity) -> bool {
        let key = (filter.to_string(), case);
        if let Some(regex) = self.cache.read().get(&key) {
            return regex.is_match(value);
        }

        let pattern = Self::compile_pattern(filter, case);
        match Regex::new(&pattern) {
            Ok(regex) => {
                tracing::trace!(filter, pattern = %pattern, "compiled wildcard pattern");
                let matched = regex.is_match(value);
                self.cache.write().entry(key).or_insert(regex);
                matched
            }
            Err(err) => {
                tracing::warn!(filter, error = %err, "wildcard pattern failed to compile");
                false
            }
        }
    }

    fn compile_pattern(filter: &str, case: CaseSensitivity) -> String {
        let body = filter
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*?");
        match case {
            CaseSensitivity::Sensitive => format!("^{body}$"),
            CaseSensitivity::Insensitive => format!("(?i)^{body}$"),
        }
    }
}

/// Matches using the process-wide shared matcher.
pub fn match_wildcard(filter: Option<&str>, value: Option<&str>, case: CaseSensitivity) -> bool {
    DEFAULT_MATCHER.match_wildcard(filter, value, case)
}
