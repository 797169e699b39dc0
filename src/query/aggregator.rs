//! Ordered query sets per kind, executed as a union.

use super::{EventQuery, FieldQuery, MethodQuery, TypeQuery, TypeQueryMode};
use crate::equality::{event_equal, field_equal, method_equal, type_equal};
use crate::error::ConfigurationError;
use crate::model::{EventRecord, FieldRecord, MethodRecord, ModuleSnapshot, TypeRecord, Visibility};
use crate::wildcard::WildcardMatcher;
use std::sync::Arc;

/// One compiled query of any kind.
#[derive(Debug, Clone)]
pub enum FilterQuery {
    Type(TypeQuery),
    Method(MethodQuery),
    Field(FieldQuery),
    Event(EventQuery),
}

impl FilterQuery {
    pub fn text(&self) -> &str {
        match self {
            FilterQuery::Type(q) => q.text(),
            FilterQuery::Method(q) => q.text(),
            FilterQuery::Field(q) => q.text(),
            FilterQuery::Event(q) => q.text(),
        }
    }
}

/// Query sets applied to both sides of a comparison. All queries share one
/// wildcard matcher and therefore one regex cache.
#[derive(Debug, Clone)]
pub struct QueryAggregator {
    matcher: Arc<WildcardMatcher>,
    type_queries: Vec<TypeQuery>,
    method_queries: Vec<MethodQuery>,
    field_queries: Vec<FieldQuery>,
    event_queries: Vec<EventQuery>,
}

impl Default for QueryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of per-query results, deduplicated in first-seen order when more
/// than one query contributed.
fn union<'a, T, Q>(
    queries: &[Q],
    select: impl Fn(&Q) -> Vec<&'a T>,
    eq: impl Fn(&T, &T) -> bool,
) -> Vec<&'a T> {
    let mut out: Vec<&'a T> = Vec::new();
    for query in queries {
        let matched = select(query);
        if queries.len() == 1 {
            return matched;
        }
        for item in matched {
            if !out.iter().any(|seen| eq(*seen, item)) {
                out.push(item);
            }
        }
    }
    out
}

impl QueryAggregator {
    pub fn new() -> Self {
        Self::with_matcher(Arc::new(WildcardMatcher::new()))
    }

    pub fn with_matcher(matcher: Arc<WildcardMatcher>) -> Self {
        Self {
            matcher,
            type_queries: Vec::new(),
            method_queries: Vec::new(),
            field_queries: Vec::new(),
            event_queries: Vec::new(),
        }
    }

    pub fn matcher(&self) -> &Arc<WildcardMatcher> {
        &self.matcher
    }

    pub fn add(&mut self, query: FilterQuery) -> &mut Self {
        match query {
            FilterQuery::Type(q) => self.type_queries.push(q),
            FilterQuery::Method(q) => self.method_queries.push(q),
            FilterQuery::Field(q) => self.field_queries.push(q),
            FilterQuery::Event(q) => self.event_queries.push(q),
        }
        self
    }

    pub fn add_type_query(&mut self, text: &str) -> crate::Result<&mut Self> {
        let query = TypeQuery::parse_with(text, Arc::clone(&self.matcher))?;
        Ok(self.add(FilterQuery::Type(query)))
    }

    pub fn add_method_query(&mut self, text: &str) -> crate::Result<&mut Self> {
        let query = MethodQuery::parse_with(text, Arc::clone(&self.matcher))?;
        Ok(self.add(FilterQuery::Method(query)))
    }

    pub fn add_field_query(&mut self, text: &str) -> crate::Result<&mut Self> {
        let query = FieldQuery::parse_with(text, Arc::clone(&self.matcher))?;
        Ok(self.add(FilterQuery::Field(query)))
    }

    pub fn add_event_query(&mut self, text: &str) -> crate::Result<&mut Self> {
        let query = EventQuery::parse_with(text, Arc::clone(&self.matcher))?;
        Ok(self.add(FilterQuery::Event(query)))
    }

    pub fn type_queries(&self) -> &[TypeQuery] {
        &self.type_queries
    }

    pub fn method_queries(&self) -> &[MethodQuery] {
        &self.method_queries
    }

    pub fn field_queries(&self) -> &[FieldQuery] {
        &self.field_queries
    }

    pub fn event_queries(&self) -> &[EventQuery] {
        &self.event_queries
    }

    /// Drops every query of the given kind; used when a config overrides a
    /// preset for one kind only.
    pub fn clear_type_queries(&mut self) {
        self.type_queries.clear();
    }

    pub fn clear_method_queries(&mut self) {
        self.method_queries.clear();
    }

    pub fn clear_field_queries(&mut self) {
        self.field_queries.clear();
    }

    pub fn clear_event_queries(&mut self) {
        self.event_queries.clear();
    }

    /// A diff needs at least one type, method and field query.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.type_queries.is_empty() {
            return Err(ConfigurationError::MissingTypeQueries);
        }
        if self.method_queries.is_empty() {
            return Err(ConfigurationError::MissingMethodQueries);
        }
        if self.field_queries.is_empty() {
            return Err(ConfigurationError::MissingFieldQueries);
        }
        Ok(())
    }

    pub fn execute_types<'a>(&self, snapshot: &'a ModuleSnapshot) -> Vec<&'a TypeRecord> {
        union(&self.type_queries, |q| q.get_types(snapshot), type_equal)
    }

    pub fn execute_methods<'a>(&self, record: &'a TypeRecord) -> Vec<&'a MethodRecord> {
        union(&self.method_queries, |q| q.get_methods(record), |a, b| {
            method_equal(a, b, true)
        })
    }

    pub fn execute_fields<'a>(&self, record: &'a TypeRecord) -> Vec<&'a FieldRecord> {
        union(&self.field_queries, |q| q.get_fields(record), field_equal)
    }

    pub fn execute_events<'a>(&self, record: &'a TypeRecord) -> Vec<&'a EventRecord> {
        union(&self.event_queries, |q| q.get_events(record), event_equal)
    }

    /// Public types; public, protected and protected internal members.
    pub fn public_and_protected() -> Self {
        let mut aggregator = Self::new();
        let members = [
            Visibility::Public,
            Visibility::Protected,
            Visibility::ProtectedInternal,
        ];
        aggregator.add_surface(TypeQueryMode::api(), &members);
        aggregator
    }

    /// Superset of [`Self::public_and_protected`] that also covers internal
    /// types and members.
    pub fn public_protected_and_internal() -> Self {
        let mut aggregator = Self::public_and_protected();
        aggregator.add_surface(TypeQueryMode::internal(), &[Visibility::Internal]);
        aggregator
    }

    fn add_surface(&mut self, mode: TypeQueryMode, visibilities: &[Visibility]) {
        let matcher = Arc::clone(&self.matcher);
        self.add(FilterQuery::Type(TypeQuery::new(mode, Arc::clone(&matcher))));
        for &visibility in visibilities {
            self.add(FilterQuery::Method(MethodQuery::with_visibility(
                visibility,
                Arc::clone(&matcher),
            )));
            self.add(FilterQuery::Field(FieldQuery::with_visibility(
                visibility,
                Arc::clone(&matcher),
            )));
            self.add(FilterQuery::Event(EventQuery::with_visibility(
                visibility,
                Arc::clone(&matcher),
            )));
        }
    }
}
