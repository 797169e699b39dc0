//! `MethodQuery`: selects methods declared on a type.
//!
//! Grammar: `[modifier ...] ReturnType Name[<T, ...>][(ParamType [name], ...)]`.
//! Without a parameter list, or with `(*)`, any parameters match; `()` only
//! matches parameterless methods. Modifiers: the five visibility levels
//! (`protectedinternal` for the combined one), `static`, `virtual`,
//! `abstract`, `nocompilergenerated`.
//!
//! ```text
//! public * *
//! protected virtual void Dispose(*)
//! public static bool TryParse(string text, out int value)
//! ```

use super::modifiers::{
    ModifierTracker, VisibilityFilter, failure_position, member_type_filter, modifier_tokens,
    tristate_matches, unknown_modifier,
};
use crate::equality::method_equal;
use crate::error::{AmbiguousMatchError, Error, QueryParseError};
use crate::generic_name::{GenericTypeTree, split_top_level};
use crate::model::{MethodRecord, TypeRecord, Visibility};
use crate::wildcard::{CaseSensitivity, WildcardMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static METHOD_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<mods>(?:!?[A-Za-z]+\s+)*)(?P<type>[^\s(<]+(?:<[^()]*?>)?)\s+(?P<name>[^\s(<]+(?:<[^()]*?>)?)\s*(?:\((?P<args>[^()]*)\))?\s*$",
    )
    .expect("method query pattern is valid")
});

/// Filter for one parameter position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFilter {
    pub type_filter: Option<String>,
    pub name_filter: Option<String>,
    pub is_out: Option<bool>,
    pub is_in: Option<bool>,
}

impl ParameterFilter {
    fn parse(query: &str, text: &str, position: usize) -> Result<Self, QueryParseError> {
        let mut tokens: Vec<&str> = split_top_level(text, ' ')
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        let mut filter = ParameterFilter {
            type_filter: None,
            name_filter: None,
            is_out: None,
            is_in: None,
        };
        match tokens.first().copied() {
            Some("out") => {
                filter.is_out = Some(true);
                tokens.remove(0);
            }
            Some("in") => {
                filter.is_in = Some(true);
                tokens.remove(0);
            }
            Some("ref") => {
                tokens.remove(0);
            }
            _ => {}
        }
        match tokens.as_slice() {
            [type_token] => {
                filter.type_filter = member_type_filter(type_token)?;
            }
            [type_token, name] => {
                filter.type_filter = member_type_filter(type_token)?;
                filter.name_filter = (*name != "*").then(|| name.to_string());
            }
            _ => {
                return Err(QueryParseError::new(
                    query,
                    position,
                    format!("cannot read parameter \"{text}\""),
                ));
            }
        }
        Ok(filter)
    }
}

#[derive(Debug, Clone)]
pub struct MethodQuery {
    text: String,
    visibility: VisibilityFilter,
    is_static: Option<bool>,
    is_virtual: Option<bool>,
    is_abstract: Option<bool>,
    exclude_compiler_generated: bool,
    return_type_filter: Option<String>,
    name_filter: Option<String>,
    generic_arity: Option<usize>,
    /// `None` accepts any parameter list.
    parameters: Option<Vec<ParameterFilter>>,
    matcher: Arc<WildcardMatcher>,
}

impl MethodQuery {
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with(text, WildcardMatcher::shared())
    }

    pub fn parse_with(text: &str, matcher: Arc<WildcardMatcher>) -> Result<Self, Error> {
        let caps = METHOD_QUERY.captures(text).ok_or_else(|| {
            QueryParseError::new(
                text,
                failure_position(text),
                "expected [modifiers] return-type name[(parameters)]",
            )
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
                "virtual" => query.is_virtual = value,
                "abstract" => query.is_abstract = value,
                "nocompilergenerated" => query.exclude_compiler_generated = !token.negated,
                _ => return Err(unknown_modifier(text, token).into()),
            }
        }

        if let Some(return_type) = caps.name("type") {
            query.return_type_filter = member_type_filter(return_type.as_str())?;
        }

        if let Some(name) = caps.name("name") {
            let tree = GenericTypeTree::parse(name.as_str())?;
            if tree.arity() > 0 {
                query.generic_arity = Some(tree.arity());
            }
            let base = tree.root().name.as_str();
            query.name_filter = (base != "*").then(|| base.to_string());
        }

        if let Some(args) = caps.name("args") {
            let trimmed = args.as_str().trim();
            if trimmed.is_empty() {
                query.parameters = Some(Vec::new());
            } else if trimmed != "*" {
                let filters = split_top_level(args.as_str(), ',')
                    .into_iter()
                    .map(|piece| ParameterFilter::parse(text, piece, args.start()))
                    .collect::<Result<Vec<_>, _>>()?;
                query.parameters = Some(filters);
            }
        }

        Ok(query)
    }

    /// Every non-compiler-generated method.
    pub fn any(matcher: Arc<WildcardMatcher>) -> Self {
        Self {
            text: String::from("* *"),
            visibility: VisibilityFilter::default(),
            is_static: None,
            is_virtual: None,
            is_abstract: None,
            exclude_compiler_generated: true,
            return_type_filter: None,
            name_filter: None,
            generic_arity: None,
            parameters: None,
            matcher,
        }
    }

    /// Every non-compiler-generated method of one visibility (`public * *`).
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

    fn wildcard(&self, filter: Option<&str>, value: &str) -> bool {
        self.matcher
            .match_wildcard(filter, Some(value), CaseSensitivity::Sensitive)
    }

    /// `declaring` is the type that owns `method`; it supplies the name
    /// constructors are matched against and the event accessors to skip.
    pub fn matches(&self, method: &MethodRecord, declaring: &TypeRecord) -> bool {
        if self.exclude_compiler_generated && method.is_compiler_generated {
            return false;
        }
        let is_event_accessor = declaring
            .events
            .iter()
            .flat_map(|e| e.accessors())
            .any(|accessor| method_equal(accessor, method, true));
        if is_event_accessor {
            return false;
        }
        if !self.visibility.matches(method.visibility)
            || !tristate_matches(self.is_static, method.is_static)
            || !tristate_matches(self.is_virtual, method.is_virtual)
            || !tristate_matches(self.is_abstract, method.is_abstract)
        {
            return false;
        }
        if let Some(arity) = self.generic_arity {
            if method.generic_parameters.len() != arity {
                return false;
            }
        }

        let name = if method.is_constructor() {
            declaring.simple_name()
        } else {
            method.name.as_str()
        };
        if !self.wildcard(self.name_filter.as_deref(), name) {
            return false;
        }
        if !self.wildcard(
            self.return_type_filter.as_deref(),
            &method.return_type.full_name(),
        ) {
            return false;
        }

        match &self.parameters {
            None => true,
            Some(filters) => {
                filters.len() == method.parameters.len()
                    && filters.iter().zip(&method.parameters).all(|(filter, param)| {
                        let type_name = param.parameter_type.full_name();
                        self.wildcard(filter.type_filter.as_deref(), &type_name)
                            && self.wildcard(filter.name_filter.as_deref(), &param.name)
                            && tristate_matches(filter.is_out, param.is_out)
                            && tristate_matches(filter.is_in, param.is_in)
                    })
            }
        }
    }

    pub fn get_methods<'a>(&self, record: &'a TypeRecord) -> Vec<&'a MethodRecord> {
        record
            .methods
            .iter()
            .filter(|m| self.matches(m, record))
            .collect()
    }

    /// At most one matching method; more than one is an error.
    pub fn get_single_method<'a>(
        &self,
        record: &'a TypeRecord,
    ) -> Result<Option<&'a MethodRecord>, AmbiguousMatchError> {
        let mut methods = self.get_methods(record);
        match methods.len() {
            0 | 1 => Ok(methods.pop()),
            count => Err(AmbiguousMatchError {
                query: self.text.clone(),
                count,
            }),
        }
    }
}
