//! `FieldQuery`: `[modifier ...] FieldType Name`.
//!
//! Modifiers: visibility levels, `static`, `readonly`, `const`,
//! `nocompilergenerated`. Backing fields (auto-properties, events, the
//! `value__` field of enums) are hidden unless `!nocompilergenerated` is
//! given.

use super::modifiers::{
    ModifierTracker, VisibilityFilter, failure_position, member_type_filter, modifier_tokens,
    tristate_matches, unknown_modifier,
};
use crate::error::{Error, QueryParseError};
use crate::model::{FieldRecord, TypeRecord, Visibility};
use crate::wildcard::{CaseSensitivity, WildcardMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static FIELD_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<mods>(?:!?[A-Za-z]+\s+)*)(?P<type>[^\s<]+(?:<[^()]*?>)?)\s+(?P<name>[^\s<(]+)\s*$",
    )
    .expect("field query pattern is valid")
});

fn is_backing_field(field: &FieldRecord) -> bool {
    field.is_compiler_generated || field.is_special_name || field.name.contains(">k__")
}

#[derive(Debug, Clone)]
pub struct FieldQuery {
    text: String,
    visibility: VisibilityFilter,
    is_static: Option<bool>,
    is_readonly: Option<bool>,
    is_const: Option<bool>,
    exclude_compiler_generated: bool,
    type_filter: Option<String>,
    name_filter: Option<String>,
    matcher: Arc<WildcardMatcher>,
}

impl FieldQuery {
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with(text, WildcardMatcher::shared())
    }

    pub fn parse_with(text: &str, matcher: Arc<WildcardMatcher>) -> Result<Self, Error> {
        let caps = FIELD_QUERY.captures(text).ok_or_else(|| {
            QueryParseError::new(text, failure_position(text), "expected [modifiers] type name")
        })?;

        let mut query = Self::any(matcher);
        query.text = text.trim().to_string();

        let mut tracker = ModifierTracker::default();
        let tokens = caps
            .name("mods")
            .map(|m| modifier_tokens(m.as_str(), m.start()))
            .unwrap_or_default();
        for token in &tokens {
            tracker.record(text, token)?;
            if query.visibility.apply(&token.name, token.negated) {
                continue;
            }
            let value = Some(!token.negated);
            match token.name.as_str() {
                "static" => query.is_static = value,
                "readonly" => query.is_readonly = value,
                "const" => query.is_const = value,
                "nocompilergenerated" => query.exclude_compiler_generated = !token.negated,
                _ => return Err(unknown_modifier(text, token).into()),
            }
        }

        if let Some(field_type) = caps.name("type") {
            query.type_filter = member_type_filter(field_type.as_str())?;
        }
        if let Some(name) = caps.name("name") {
            query.name_filter = (name.as_str() != "*").then(|| name.as_str().to_string());
        }
        Ok(query)
    }

    pub fn any(matcher: Arc<WildcardMatcher>) -> Self {
        Self {
            text: String::from("* *"),
            visibility: VisibilityFilter::default(),
            is_static: None,
            is_readonly: None,
            is_const: None,
            exclude_compiler_generated: true,
            type_filter: None,
            name_filter: None,
            matcher,
        }
    }

    pub fn with_visibility(visibility: Visibility, matcher: Arc<WildcardMatcher>) -> Self {
        Self {
            text: format!("{} * *", visibility.as_str().replace(' ', "")),
            visibility: VisibilityFilter::only(visibility),
            ..Self::any(matcher)
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, field: &FieldRecord) -> bool {
        if self.exclude_compiler_generated && is_backing_field(field) {
            return false;
        }
        self.visibility.matches(field.visibility)
            && tristate_matches(self.is_static, field.is_static)
            && tristate_matches(self.is_readonly, field.is_readonly)
            && tristate_matches(self.is_const, field.is_const)
            && self.matcher.match_wildcard(
                self.name_filter.as_deref(),
                Some(&field.name),
                CaseSensitivity::Sensitive,
            )
            && self.matcher.match_wildcard(
                self.type_filter.as_deref(),
                Some(&field.field_type.full_name()),
                CaseSensitivity::Sensitive,
            )
    }

    pub fn get_fields<'a>(&self, record: &'a TypeRecord) -> Vec<&'a FieldRecord> {
        record.fields.iter().filter(|f| self.matches(f)).collect()
    }
}
