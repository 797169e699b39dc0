//! `EventQuery`: `[modifier ...] EventType Name`, with visibility levels,
//! `static` and `virtual` as modifiers. An event's visibility and flags are
//! those of its add accessor.

use super::modifiers::{
    ModifierTracker, VisibilityFilter, failure_position, member_type_filter, modifier_tokens,
    tristate_matches, unknown_modifier,
};
use crate::error::{Error, QueryParseError};
use crate::model::{EventRecord, TypeRecord, Visibility};
use crate::wildcard::{CaseSensitivity, WildcardMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static EVENT_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<mods>(?:!?[A-Za-z]+\s+)*)(?P<type>[^\s<]+(?:<[^()]*?>)?)\s+(?P<name>[^\s<(]+)\s*$",
    )
    .expect("event query pattern is valid")
});

#[derive(Debug, Clone)]
pub struct EventQuery {
    text: String,
    visibility: VisibilityFilter,
    is_static: Option<bool>,
    is_virtual: Option<bool>,
    type_filter: Option<String>,
    name_filter: Option<String>,
    matcher: Arc<WildcardMatcher>,
}

impl EventQuery {
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with(text, WildcardMatcher::shared())
    }

    pub fn parse_with(text: &str, matcher: Arc<WildcardMatcher>) -> Result<Self, Error> {
        let caps = EVENT_QUERY.captures(text).ok_or_else(|| {
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
            match token.name.as_str() {
                "static" => query.is_static = Some(!token.negated),
                "virtual" => query.is_virtual = Some(!token.negated),
                _ => return Err(unknown_modifier(text, token).into()),
            }
        }

        if let Some(event_type) = caps.name("type") {
            query.type_filter = member_type_filter(event_type.as_str())?;
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
            is_virtual: None,
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

    pub fn matches(&self, event: &EventRecord) -> bool {
        self.visibility.matches(event.visibility())
            && tristate_matches(self.is_static, event.is_static())
            && tristate_matches(self.is_virtual, event.is_virtual())
            && self.matcher.match_wildcard(
                self.name_filter.as_deref(),
                Some(&event.name),
                CaseSensitivity::Sensitive,
            )
            && self.matcher.match_wildcard(
                self.type_filter.as_deref(),
                Some(&event.event_type.full_name()),
                CaseSensitivity::Sensitive,
            )
    }

    pub fn get_events<'a>(&self, record: &'a TypeRecord) -> Vec<&'a EventRecord> {
        record.events.iter().filter(|e| self.matches(e)).collect()
    }
}
