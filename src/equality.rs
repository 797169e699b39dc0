//! Structural equality predicates used to match declarations across two
//! module snapshots.
//!
//! None of these compare by reference: two records are "the same declaration"
//! when their declared shape lines up.
//!
//! Known limitation: parameter direction (`in`/`out`) is only compared when
//! both methods carry the same metadata token. Methods loaded from different
//! builds usually have different tokens, so a parameter that flips from
//! by-value to `out` between versions goes unnoticed.

use crate::model::{
    EventRecord, FieldRecord, GENERIC_PARAMETER_SENTINEL, MethodRecord, ParameterRecord, Scope,
    TypeRecord, TypeReference,
};

pub fn scope_equal(a: &Scope, b: &Scope) -> bool {
    a.canonical_name() == b.canonical_name()
}

/// Cross-version type identity: qualified name and scope.
pub fn type_equal(a: &TypeRecord, b: &TypeRecord) -> bool {
    a.qualified_name() == b.qualified_name() && scope_equal(&a.scope, &b.scope)
}

/// Reference equality over name, namespace, declaring chain and scope, plus
/// generic arguments when `compare_generics` is set. A generic parameter
/// placeholder on either side matches anything.
pub fn type_reference_equal(a: &TypeReference, b: &TypeReference, compare_generics: bool) -> bool {
    if a.is_generic_parameter() || b.is_generic_parameter() {
        return true;
    }
    if a.name != b.name || a.namespace != b.namespace || !scope_equal(&a.scope, &b.scope) {
        return false;
    }
    let declaring_equal = match (&a.declaring_type, &b.declaring_type) {
        (None, None) => true,
        (Some(x), Some(y)) => type_reference_equal(x, y, false),
        _ => false,
    };
    if !declaring_equal {
        return false;
    }
    !compare_generics
        || (a.generic_arguments.len() == b.generic_arguments.len()
            && a
                .generic_arguments
                .iter()
                .zip(&b.generic_arguments)
                .all(|(x, y)| type_reference_equal(x, y, true)))
}

fn is_placeholder(name: &str) -> bool {
    name.starts_with(GENERIC_PARAMETER_SENTINEL)
}

/// Positionwise generic parameter names; placeholders match anything.
pub fn generic_parameters_equal(a: &[String], b: &[String]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x == y || is_placeholder(x) || is_placeholder(y))
}

/// Same count and positionwise equal parameter types. Names are ignored.
pub fn parameters_equal(a: &[ParameterRecord], b: &[ParameterRecord]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| type_reference_equal(&x.parameter_type, &y.parameter_type, true))
}

fn parameter_directions_equal(a: &[ParameterRecord], b: &[ParameterRecord]) -> bool {
    a.iter()
        .zip(b)
        .all(|(x, y)| x.is_in == y.is_in && x.is_out == y.is_out)
}

fn declaring_types_equal(a: &Option<TypeReference>, b: &Option<TypeReference>) -> bool {
    match (a, b) {
        (None, None) => true,
        // Declaring types are compared in their unbound form.
        (Some(x), Some(y)) => type_reference_equal(x, y, false),
        _ => false,
    }
}

/// Method identity: name, declaring type, return type and parameter list,
/// plus generic parameters when `compare_generic_parameters` is set.
pub fn method_equal(a: &MethodRecord, b: &MethodRecord, compare_generic_parameters: bool) -> bool {
    if a.name != b.name
        || !declaring_types_equal(&a.declaring_type, &b.declaring_type)
        || !type_reference_equal(&a.return_type, &b.return_type, true)
        || !parameters_equal(&a.parameters, &b.parameters)
    {
        return false;
    }
    if compare_generic_parameters
        && !generic_parameters_equal(&a.generic_parameters, &b.generic_parameters)
    {
        return false;
    }
    if a.metadata_token == b.metadata_token {
        return parameter_directions_equal(&a.parameters, &b.parameters);
    }
    true
}

/// Stricter than reference equality: every modifier must match too.
pub fn field_equal(a: &FieldRecord, b: &FieldRecord) -> bool {
    a.name == b.name
        && type_reference_equal(&a.field_type, &b.field_type, true)
        && a.visibility == b.visibility
        && a.is_static == b.is_static
        && a.is_const == b.is_const
        && a.is_readonly == b.is_readonly
}

pub fn event_equal(a: &EventRecord, b: &EventRecord) -> bool {
    let add_equal = match (&a.add_method, &b.add_method) {
        (None, None) => true,
        (Some(x), Some(y)) => method_equal(x, y, true),
        _ => false,
    };
    a.name == b.name && type_reference_equal(&a.event_type, &b.event_type, true) && add_equal
}
