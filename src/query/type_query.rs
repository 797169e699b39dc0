//! `TypeQuery`: selects types from a module snapshot.
//!
//! Grammar: `[modifier ...] [Namespace.]TypeName[<T, ...>]`, for example
//! `public class *`, `internal struct Acme.*`, `api *`, `public List<T>`.
//! Modifiers: `public`, `internal`, `class`, `interface`, `struct`
//! (alias `valuetype`), `enum`, `nocompilergenerated` and the composite
//! `api`. Each may be negated with `!`, except `api`.

use super::modifiers::{ModifierTracker, failure_position, modifier_tokens, unknown_modifier};
use crate::error::{ConfigurationError, Error, QueryParseError};
use crate::generic_name::GenericTypeTree;
use crate::model::{ModuleSnapshot, TypeKind, TypeRecord, TypeVisibility};
use crate::wildcard::{CaseSensitivity, WildcardMatcher};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static TYPE_QUERY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<mods>(?:!?[A-Za-z]+\s+)*)(?P<name>[^\s<]+(?:\s*<.*>)?)\s*$")
        .expect("type query pattern is valid")
});

/// Which visibilities and kinds a type query accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeQueryMode {
    pub public: Option<bool>,
    pub internal: Option<bool>,
    pub class: Option<bool>,
    pub interface: Option<bool>,
    pub value_type: Option<bool>,
    pub enumeration: Option<bool>,
    pub exclude_compiler_generated: bool,
}

impl Default for TypeQueryMode {
    fn default() -> Self {
        Self {
            public: None,
            internal: None,
            class: None,
            interface: None,
            value_type: None,
            enumeration: None,
            exclude_compiler_generated: true,
        }
    }
}

/// `Some(true)` entries are alternatives, `Some(false)` entries are excluded.
fn group_allows(flags: &[Option<bool>], selected: Option<bool>) -> bool {
    match selected {
        Some(allowed) => allowed,
        None => !flags.contains(&Some(true)),
    }
}

impl TypeQueryMode {
    /// Public, non-compiler-generated types of every kind.
    pub fn api() -> Self {
        Self {
            public: Some(true),
            internal: None,
            class: Some(true),
            interface: Some(true),
            value_type: Some(true),
            enumeration: Some(true),
            exclude_compiler_generated: true,
        }
    }

    /// Internal, non-compiler-generated types of every kind.
    pub fn internal() -> Self {
        Self {
            public: None,
            internal: Some(true),
            ..Self::api()
        }
    }

    pub fn allows_visibility(&self, visibility: TypeVisibility) -> bool {
        let flags = [self.public, self.internal];
        let selected = match visibility {
            TypeVisibility::Public => self.public,
            TypeVisibility::Internal => self.internal,
        };
        group_allows(&flags, selected)
    }

    pub fn allows_kind(&self, kind: TypeKind) -> bool {
        let flags = [self.class, self.interface, self.value_type, self.enumeration];
        let selected = match kind {
            TypeKind::Class => self.class,
            TypeKind::Interface => self.interface,
            TypeKind::ValueType => self.value_type,
            TypeKind::Enum => self.enumeration,
        };
        group_allows(&flags, selected)
    }

    /// A mode that can never match anything is a configuration mistake.
    pub fn validate(&self, query: &str) -> Result<(), ConfigurationError> {
        if ![TypeVisibility::Public, TypeVisibility::Internal]
            .into_iter()
            .any(|v| self.allows_visibility(v))
        {
            return Err(ConfigurationError::NoVisibilitySelected(query.to_string()));
        }
        if ![
            TypeKind::Class,
            TypeKind::Interface,
            TypeKind::ValueType,
            TypeKind::Enum,
        ]
        .into_iter()
        .any(|k| self.allows_kind(k))
        {
            return Err(ConfigurationError::NoKindSelected(query.to_string()));
        }
        Ok(())
    }

    fn apply(&mut self, name: &str, negated: bool) -> bool {
        let flag = match name {
            "public" => &mut self.public,
            "internal" => &mut self.internal,
            "class" => &mut self.class,
            "interface" => &mut self.interface,
            "struct" | "valuetype" => &mut self.value_type,
            "enum" => &mut self.enumeration,
            "nocompilergenerated" => {
                self.exclude_compiler_generated = !negated;
                return true;
            }
            _ => return false,
        };
        *flag = Some(!negated);
        true
    }
}

#[derive(Debug, Clone)]
pub struct TypeQuery {
    text: String,
    mode: TypeQueryMode,
    namespace_filter: Option<String>,
    name_filter: Option<String>,
    generic_arity: Option<usize>,
    name_tree: Option<GenericTypeTree>,
    matcher: Arc<WildcardMatcher>,
}

impl TypeQuery {
    pub fn parse(text: &str) -> Result<Self, Error> {
        Self::parse_with(text, WildcardMatcher::shared())
    }

    pub fn parse_with(text: &str, matcher: Arc<WildcardMatcher>) -> Result<Self, Error> {
        let caps = TYPE_QUERY.captures(text).ok_or_else(|| {
            QueryParseError::new(text, failure_position(text), "expected [modifiers] type-name")
        })?;

        let mut mode = TypeQueryMode::default();
        let mut tracker = ModifierTracker::default();
        let tokens = caps
            .name("mods")
            .map(|m| modifier_tokens(m.as_str(), m.start()))
            .unwrap_or_default();

        if let Some(api) = tokens.iter().find(|t| t.name == "api") {
            if api.negated {
                return Err(ConfigurationError::UnsupportedModifier {
                    query: text.to_string(),
                    modifier: "!api".to_string(),
                }
                .into());
            }
            mode = TypeQueryMode::api();
        }
        for token in tokens.iter().filter(|t| t.name != "api") {
            tracker.record(text, token)?;
            if !mode.apply(&token.name, token.negated) {
                return Err(unknown_modifier(text, token).into());
            }
        }
        mode.validate(text)?;

        let name = caps.name("name").map(|m| m.as_str()).unwrap_or("*");
        let mut query = Self::new(mode, matcher);
        query.text = text.trim().to_string();
        query.set_name_pattern(name)?;
        Ok(query)
    }

    /// A query over `mode` matching any name. The mode is not validated.
    pub fn new(mode: TypeQueryMode, matcher: Arc<WildcardMatcher>) -> Self {
        Self {
            text: String::from("*"),
            mode,
            namespace_filter: None,
            name_filter: None,
            generic_arity: None,
            name_tree: None,
            matcher,
        }
    }

    fn set_name_pattern(&mut self, pattern: &str) -> Result<(), QueryParseError> {
        if pattern == "*" {
            return Ok(());
        }
        let tree = GenericTypeTree::parse(pattern)?;
        let base = tree.root().name.clone();
        let (namespace, name) = match base.rfind('.') {
            Some(idx) => (Some(base[..idx].to_string()), base[idx + 1..].to_string()),
            None => (None, base),
        };
        let arity = tree.arity();
        self.namespace_filter = namespace;
        self.name_filter = if arity > 0 {
            self.generic_arity = Some(arity);
            Some(format!("{name}`{arity}"))
        } else {
            Some(name)
        };
        self.name_tree = Some(tree);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> &TypeQueryMode {
        &self.mode
    }

    /// Parsed form of the name pattern, when one was given.
    pub fn name_tree(&self) -> Option<&GenericTypeTree> {
        self.name_tree.as_ref()
    }

    pub fn matches(&self, record: &TypeRecord) -> bool {
        if self.mode.exclude_compiler_generated && record.is_compiler_generated {
            return false;
        }
        if !self.mode.allows_visibility(record.visibility) || !self.mode.allows_kind(record.kind) {
            return false;
        }
        if let Some(arity) = self.generic_arity {
            if record.generic_parameters.len() != arity {
                return false;
            }
        }
        let namespace_ok = self.matcher.match_wildcard(
            self.namespace_filter.as_deref(),
            Some(&record.namespace),
            CaseSensitivity::Sensitive,
        );
        if !namespace_ok {
            return false;
        }
        // Nested patterns (`Outer/Inner`) compare against the nesting path.
        let subject = match self.name_filter.as_deref() {
            Some(filter) if filter.contains('/') => {
                let qualified = record.qualified_name();
                let prefix = format!("{}.", record.namespace);
                qualified
                    .strip_prefix(prefix.as_str())
                    .unwrap_or(&qualified)
                    .to_string()
            }
            _ => record.name.clone(),
        };
        self.matcher.match_wildcard(
            self.name_filter.as_deref(),
            Some(&subject),
            CaseSensitivity::Sensitive,
        )
    }

    pub fn get_types<'a>(&self, snapshot: &'a ModuleSnapshot) -> Vec<&'a TypeRecord> {
        snapshot.types.iter().filter(|t| self.matches(t)).collect()
    }
}
