//! Filter-query grammar against a realistic snapshot.

use api_bump::error::{ConfigurationError, Error};
use api_bump::generic_name::convert_clr_name;
use api_bump::model::{
    FieldRecord, MethodRecord, ModuleSnapshot, TypeRecord, TypeReference, TypeVisibility,
    Visibility,
};
use api_bump::query::{FieldQuery, MethodQuery, QueryAggregator, TypeQuery};

fn t(ns: &str, name: &str) -> TypeReference {
    TypeReference::new(ns, name)
}

fn snapshot() -> ModuleSnapshot {
    let stream = TypeRecord::class("Acme.IO", "Stream")
        .with_method(MethodRecord::constructor().with_visibility(Visibility::Protected))
        .with_method(MethodRecord::new("Read", t("System", "Int32")).with_parameter(
            t("System", "Byte[]"),
            "buffer",
        ))
        .with_method(
            MethodRecord::new("Dispose", t("System", "Void"))
                .with_visibility(Visibility::Protected)
                .as_virtual()
                .with_parameter(t("System", "Boolean"), "disposing"),
        )
        .with_field(
            FieldRecord::new("<Length>k__BackingField", t("System", "Int64"))
                .with_visibility(Visibility::Private)
                .as_compiler_generated(),
        )
        .with_property("Length", t("System", "Int64"), true, false)
        .with_event("Closed", t("System", "EventHandler"));

    ModuleSnapshot::new(
        "Acme",
        vec![
            stream,
            TypeRecord::interface("Acme.IO", "IReader"),
            TypeRecord::value_type("Acme.IO", "Position").with_visibility(TypeVisibility::Internal),
            TypeRecord::class("Acme.IO", "<>c").as_compiler_generated(),
        ],
    )
}

fn type_names(query: &str) -> Vec<String> {
    let snapshot = snapshot();
    TypeQuery::parse(query)
        .unwrap()
        .get_types(&snapshot)
        .into_iter()
        .map(|t| t.name.clone())
        .collect()
}

#[test]
fn test_type_query_examples() {
    assert_eq!(type_names("api *"), vec!["Stream", "IReader"]);
    assert_eq!(type_names("public class *"), vec!["Stream"]);
    assert_eq!(type_names("internal struct *"), vec!["Position"]);
    assert_eq!(type_names("Acme.IO.I*"), vec!["IReader"]);
    assert!(type_names("* ").contains(&"Stream".to_string()));
    assert!(!type_names("*").contains(&"<>c".to_string()));
    assert!(type_names("!nocompilergenerated *").contains(&"<>c".to_string()));
}

#[test]
fn test_type_query_mode_errors() {
    assert!(matches!(
        TypeQuery::parse("!public !internal class *"),
        Err(Error::Configuration(ConfigurationError::NoVisibilitySelected(_)))
    ));
    assert!(matches!(
        TypeQuery::parse("public class !class *"),
        Err(Error::Configuration(ConfigurationError::ContradictoryModifier { .. }))
    ));
    assert!(matches!(TypeQuery::parse("publik class *"), Err(Error::Parse(_))));
}

#[test]
fn test_method_query_examples() {
    let snapshot = snapshot();
    let stream = &snapshot.types[0];

    let dispose = MethodQuery::parse("protected virtual void Dispose(*)").unwrap();
    assert_eq!(dispose.get_methods(stream).len(), 1);

    let read = MethodQuery::parse("public int Read(byte[] buffer)").unwrap();
    assert_eq!(read.get_methods(stream).len(), 1);

    let ctor = MethodQuery::parse("protected * Stream()").unwrap();
    assert_eq!(ctor.get_single_method(stream).unwrap().map(|m| m.name.as_str()), Some(".ctor"));

    let public: Vec<_> = MethodQuery::parse("public * *")
        .unwrap()
        .get_methods(stream)
        .into_iter()
        .map(|m| m.name.clone())
        .collect();
    assert_eq!(public, vec!["Read", "get_Length"]);
}

#[test]
fn test_field_query_hides_backing_fields_by_default() {
    let snapshot = snapshot();
    let stream = &snapshot.types[0];
    assert!(FieldQuery::parse("* *").unwrap().get_fields(stream).is_empty());
    let all = FieldQuery::parse("!nocompilergenerated * *").unwrap().get_fields(stream);
    assert_eq!(all.len(), 2);
}

#[test]
fn test_aggregator_union_of_type_queries() {
    let snapshot = snapshot();
    let mut aggregator = QueryAggregator::new();
    aggregator.add_type_query("public class *").unwrap();
    aggregator.add_type_query("api *").unwrap();
    aggregator.add_type_query("internal * ").unwrap();
    let names: Vec<_> = aggregator
        .execute_types(&snapshot)
        .into_iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Stream", "IReader", "Position"]);
}

#[test]
fn test_clr_name_round_trip() {
    assert_eq!(convert_clr_name("List<int>").unwrap(), "List`1<System.Int32>");
    let once = convert_clr_name("Dictionary<string, List<int>>").unwrap();
    assert_eq!(convert_clr_name(&once).unwrap(), once);
}
