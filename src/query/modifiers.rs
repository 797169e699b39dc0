//! Pieces shared by the four query grammars: modifier tokens, tri-state
//! flags, visibility filtering and member type filters.

use crate::error::{ConfigurationError, QueryParseError};
use crate::generic_name::{GenericTypeTree, to_clr_name};
use crate::model::Visibility;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static MODIFIER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!?)([A-Za-z]+)").expect("modifier token pattern is valid"));

/// One `[!]word` token from the modifier prefix of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ModifierToken {
    pub name: String,
    pub negated: bool,
    /// Byte offset in the full query text.
    pub position: usize,
}

/// Splits the modifier prefix captured at `offset` into tokens.
pub(crate) fn modifier_tokens(text: &str, offset: usize) -> Vec<ModifierToken> {
    MODIFIER_TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ModifierToken {
                name: caps.get(2)?.as_str().to_ascii_lowercase(),
                negated: !caps.get(1)?.as_str().is_empty(),
                position: offset + whole.start(),
            })
        })
        .collect()
}

/// Rejects a modifier that is given both plainly and negated.
#[derive(Debug, Default)]
pub(crate) struct ModifierTracker {
    seen: HashMap<String, bool>,
}

impl ModifierTracker {
    pub fn record(&mut self, query: &str, token: &ModifierToken) -> Result<(), ConfigurationError> {
        match self.seen.insert(token.name.clone(), !token.negated) {
            Some(previous) if previous == token.negated => {
                Err(ConfigurationError::ContradictoryModifier {
                    query: query.to_string(),
                    modifier: token.name.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

pub(crate) fn unknown_modifier(query: &str, token: &ModifierToken) -> QueryParseError {
    QueryParseError::new(
        query,
        token.position,
        format!("unknown modifier \"{}\"", token.name),
    )
}

/// A `Some(x)` flag requires the record flag to equal `x`; `None` accepts both.
pub(crate) fn tristate_matches(flag: Option<bool>, actual: bool) -> bool {
    flag.is_none_or(|required| required == actual)
}

/// Tri-state per accessibility level.
///
/// Levels are mutually exclusive, so the required ones are alternatives: a
/// member passes when its level is required (or nothing is required) and its
/// level is not explicitly excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityFilter {
    pub public: Option<bool>,
    pub protected: Option<bool>,
    pub internal: Option<bool>,
    pub protected_internal: Option<bool>,
    pub private: Option<bool>,
}

impl VisibilityFilter {
    pub fn only(visibility: Visibility) -> Self {
        let mut filter = Self::default();
        *filter.flag_mut(visibility) = Some(true);
        filter
    }

    fn flag(&self, visibility: Visibility) -> Option<bool> {
        match visibility {
            Visibility::Public => self.public,
            Visibility::Protected => self.protected,
            Visibility::Internal => self.internal,
            Visibility::ProtectedInternal => self.protected_internal,
            Visibility::Private => self.private,
        }
    }

    fn flag_mut(&mut self, visibility: Visibility) -> &mut Option<bool> {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Protected => &mut self.protected,
            Visibility::Internal => &mut self.internal,
            Visibility::ProtectedInternal => &mut self.protected_internal,
            Visibility::Private => &mut self.private,
        }
    }

    /// Applies a visibility token; returns false when `name` is not one.
    pub(crate) fn apply(&mut self, name: &str, negated: bool) -> bool {
        let visibility = match name {
            "public" => Visibility::Public,
            "protected" => Visibility::Protected,
            "internal" => Visibility::Internal,
            "protectedinternal" => Visibility::ProtectedInternal,
            "private" => Visibility::Private,
            _ => return false,
        };
        *self.flag_mut(visibility) = Some(!negated);
        true
    }

    pub fn matches(&self, visibility: Visibility) -> bool {
        let any_required = [
            self.public,
            self.protected,
            self.internal,
            self.protected_internal,
            self.private,
        ]
        .contains(&Some(true));
        match self.flag(visibility) {
            Some(false) => false,
            Some(true) => true,
            None => !any_required,
        }
    }
}

/// Compiles a type token (`List<int>`, `void`, `*`) into a wildcard filter
/// over `TypeReference::full_name`. Every name in the generic tree that does
/// not already start with `*` is prefixed with one, so bare class names
/// match in any namespace, generic arguments included.
pub(crate) fn member_type_filter(token: &str) -> Result<Option<String>, QueryParseError> {
    if token == "*" {
        return Ok(None);
    }
    let mut tree = GenericTypeTree::parse(token)?;
    tree.rename(|name| {
        let clr = to_clr_name(name);
        if clr.starts_with('*') {
            clr
        } else {
            format!("*{clr}")
        }
    });
    Ok(Some(tree.serialize(true)))
}

/// Best effort location for a grammar mismatch: the first unbalanced
/// bracket, otherwise the start of the last token.
pub(crate) fn failure_position(input: &str) -> usize {
    let mut stack: Vec<(char, usize)> = Vec::new();
    for (pos, ch) in input.char_indices() {
        match ch {
            '(' | '<' => stack.push((ch, pos)),
            ')' | '>' => {
                let expected = if ch == ')' { '(' } else { '<' };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => return pos,
                }
            }
            _ => {}
        }
    }
    if let Some((_, pos)) = stack.first() {
        return *pos;
    }
    input
        .trim_end()
        .rfind(char::is_whitespace)
        .map(|idx| idx + 1)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_tokens_keep_positions() {
        let tokens = modifier_tokens("public !static ", 0);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "public");
        assert!(!tokens[0].negated);
        assert_eq!(tokens[1].name, "static");
        assert!(tokens[1].negated);
        assert_eq!(tokens[1].position, 7);
    }

    #[test]
    fn test_tracker_rejects_contradiction() {
        let mut tracker = ModifierTracker::default();
        let tokens = modifier_tokens("static !static", 0);
        assert!(tracker.record("q", &tokens[0]).is_ok());
        assert!(tracker.record("q", &tokens[1]).is_err());
    }

    #[test]
    fn test_visibility_filter_alternatives() {
        let mut filter = VisibilityFilter::default();
        assert!(filter.matches(Visibility::Private));

        filter.apply("public", false);
        filter.apply("protected", false);
        assert!(filter.matches(Visibility::Public));
        assert!(filter.matches(Visibility::Protected));
        assert!(!filter.matches(Visibility::Internal));

        let mut negated = VisibilityFilter::default();
        negated.apply("private", true);
        assert!(negated.matches(Visibility::Public));
        assert!(!negated.matches(Visibility::Private));
    }

    #[test]
    fn test_member_type_filter() {
        assert_eq!(member_type_filter("*").unwrap(), None);
        assert_eq!(member_type_filter("int").unwrap().as_deref(), Some("*System.Int32"));
        assert_eq!(
            member_type_filter("*List<string>").unwrap().as_deref(),
            Some("*List`1<*System.String>")
        );
        assert!(member_type_filter("List<int").is_err());
    }

    #[test]
    fn test_failure_position() {
        assert_eq!(failure_position("void Foo(int"), 8);
        assert_eq!(failure_position("void Foo)"), 8);
        assert_eq!(failure_position("public"), 0);
        assert_eq!(failure_position("public void"), 7);
    }
}
