//! Converts the query-selected part of a `ModuleSnapshot` into the
//! order-insensitive `CanonicalSurface` used for fingerprinting.

use crate::canonical::{
    CanonicalEvent, CanonicalField, CanonicalMethod, CanonicalParameter, CanonicalSurface,
    CanonicalType,
};
use crate::model::{
    EventRecord, FieldRecord, MethodRecord, ModuleSnapshot, ParameterRecord, TypeRecord,
    TypeReference,
};
use crate::query::QueryAggregator;

pub fn normalize_surface(snapshot: &ModuleSnapshot, queries: &QueryAggregator) -> CanonicalSurface {
    let mut surface = CanonicalSurface::default();
    for record in queries.execute_types(snapshot) {
        surface.types.insert(normalize_type(record, queries));
    }
    surface
}

/// `[scope]Ns.Outer/Name<Arg,...>`, with the scope repeated on every
/// generic argument so references from different modules never collide.
pub fn render_reference(reference: &TypeReference) -> String {
    let mut out = format!("[{}]{}", reference.scope.canonical_name(), reference.qualified_name());
    if !reference.generic_arguments.is_empty() {
        let args: Vec<String> = reference.generic_arguments.iter().map(render_reference).collect();
        out.push('<');
        out.push_str(&args.join(","));
        out.push('>');
    }
    out
}

fn normalize_type(record: &TypeRecord, queries: &QueryAggregator) -> CanonicalType {
    let mut canonical = CanonicalType {
        name: render_reference(&record.as_reference()),
        kind: record.kind.as_str().to_string(),
        visibility: record.visibility.as_str().to_string(),
        base_type: record.base_type.as_ref().map(render_reference),
        generic_parameters: record.generic_parameters.clone(),
        ..Default::default()
    };

    for interface in &record.interfaces {
        canonical.interfaces.insert(render_reference(interface));
    }
    for method in queries.execute_methods(record) {
        canonical.methods.insert(normalize_method(method));
    }
    for field in queries.execute_fields(record) {
        canonical.fields.insert(normalize_field(field));
    }
    for event in queries.execute_events(record) {
        canonical.events.insert(normalize_event(event));
    }
    canonical
}

fn normalize_method(method: &MethodRecord) -> CanonicalMethod {
    CanonicalMethod {
        name: method.name.clone(),
        visibility: method.visibility.as_str().to_string(),
        return_type: render_reference(&method.return_type),
        parameters: method.parameters.iter().map(normalize_parameter).collect(),
        generic_parameters: method.generic_parameters.clone(),
        is_static: method.is_static,
        is_virtual: method.is_virtual,
        is_abstract: method.is_abstract,
    }
}

fn normalize_parameter(parameter: &ParameterRecord) -> CanonicalParameter {
    let direction = match (parameter.is_in, parameter.is_out) {
        (_, true) => "out",
        (true, false) => "in",
        (false, false) => "",
    };
    CanonicalParameter {
        parameter_type: render_reference(&parameter.parameter_type),
        direction: direction.to_string(),
    }
}

fn normalize_field(field: &FieldRecord) -> CanonicalField {
    CanonicalField {
        name: field.name.clone(),
        field_type: render_reference(&field.field_type),
        visibility: field.visibility.as_str().to_string(),
        is_static: field.is_static,
        is_readonly: field.is_readonly,
        is_const: field.is_const,
    }
}

fn normalize_event(event: &EventRecord) -> CanonicalEvent {
    CanonicalEvent {
        name: event.name.clone(),
        event_type: render_reference(&event.event_type),
        visibility: event.visibility().as_str().to_string(),
    }
}
