//! Structural model of a compiled module: types, members and type references.
//!
//! These records are produced by an external module loader and are treated as
//! immutable once wrapped in a [`ModuleSnapshot`]. The builder helpers exist so
//! snapshots can be assembled by hand (tests, alternative loaders).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Leading character of a generic parameter placeholder (`!0`, `!T`, `!!0`).
pub const GENERIC_PARAMETER_SENTINEL: char = '!';

/// Name the loader gives instance constructors.
pub const CONSTRUCTOR_NAME: &str = ".ctor";
/// Name the loader gives static (type) constructors.
pub const STATIC_CONSTRUCTOR_NAME: &str = ".cctor";

//==============================================================================
// Scopes and type references
//==============================================================================

/// The module or assembly a type or reference resolves against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// The assembly being described.
    Assembly { name: String },
    /// A module inside an assembly.
    Module { name: String, assembly: String },
    /// A reference to another assembly.
    Reference { name: String },
}

impl Scope {
    pub fn assembly(name: &str) -> Self {
        Scope::Assembly {
            name: name.to_string(),
        }
    }

    pub fn reference(name: &str) -> Self {
        Scope::Reference {
            name: name.to_string(),
        }
    }

    /// Name used for cross-version identity. A module resolves to its owning
    /// assembly so that a type moving between modules of one assembly keeps
    /// its identity.
    pub fn canonical_name(&self) -> &str {
        match self {
            Scope::Assembly { name } => name,
            Scope::Module { assembly, .. } => assembly,
            Scope::Reference { name } => name,
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Assembly {
            name: String::new(),
        }
    }
}

/// A reference to a type, possibly a constructed generic or a generic
/// parameter placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeReference {
    /// Metadata name, including the arity suffix for generic definitions (`List\`1`).
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<Box<TypeReference>>,
    pub scope: Scope,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeReference>,
}

impl TypeReference {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    /// A generic parameter placeholder such as `!0` or `!T`.
    pub fn generic_parameter(name: &str) -> Self {
        let name = if name.starts_with(GENERIC_PARAMETER_SENTINEL) {
            name.to_string()
        } else {
            format!("{GENERIC_PARAMETER_SENTINEL}{name}")
        };
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn nested_in(mut self, declaring: TypeReference) -> Self {
        self.namespace = declaring.namespace.clone();
        self.declaring_type = Some(Box::new(declaring));
        self
    }

    pub fn with_generic_arguments(mut self, arguments: Vec<TypeReference>) -> Self {
        self.generic_arguments = arguments;
        self
    }

    pub fn is_generic_parameter(&self) -> bool {
        self.name.starts_with(GENERIC_PARAMETER_SENTINEL)
    }

    /// `Ns.Outer/Inner` without generic arguments.
    pub fn qualified_name(&self) -> String {
        match &self.declaring_type {
            Some(declaring) => format!("{}/{}", declaring.qualified_name(), self.name),
            None if self.namespace.is_empty() => self.name.clone(),
            None => format!("{}.{}", self.namespace, self.name),
        }
    }

    /// Qualified name followed by the rendered generic arguments, in the same
    /// form the generic-name mapper produces (`Ns.List\`1<System.Int32>`).
    pub fn full_name(&self) -> String {
        let mut full = self.qualified_name();
        if !self.generic_arguments.is_empty() {
            let args: Vec<String> = self.generic_arguments.iter().map(|a| a.full_name()).collect();
            full.push('<');
            full.push_str(&args.join(","));
            full.push('>');
        }
        full
    }

    /// Human oriented name with built-in aliases (`List<int>`).
    pub fn display_name(&self) -> String {
        crate::generic_name::convert_to_short_name(&self.full_name())
            .unwrap_or_else(|_| self.full_name())
    }
}

//==============================================================================
// Enumerations
//==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    ValueType,
    Enum,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::ValueType => "struct",
            TypeKind::Enum => "enum",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeVisibility {
    #[default]
    Public,
    Internal,
}

impl TypeVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeVisibility::Public => "public",
            TypeVisibility::Internal => "internal",
        }
    }
}

/// Member accessibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
    ProtectedInternal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::ProtectedInternal => "protected internal",
        }
    }
}

//==============================================================================
// Member records
//==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRecord {
    pub name: String,
    pub parameter_type: TypeReference,
    pub is_in: bool,
    pub is_out: bool,
}

impl ParameterRecord {
    pub fn new(parameter_type: TypeReference, name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameter_type,
            ..Default::default()
        }
    }

    pub fn out(mut self) -> Self {
        self.is_out = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodRecord {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_abstract: bool,
    /// Set for accessors, operators and constructors.
    pub is_special_name: bool,
    pub is_compiler_generated: bool,
    pub return_type: TypeReference,
    pub parameters: Vec<ParameterRecord>,
    pub generic_parameters: Vec<String>,
    /// Loader-internal identity token of the method definition.
    pub metadata_token: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeReference>,
}

impl MethodRecord {
    pub fn new(name: &str, return_type: TypeReference) -> Self {
        Self {
            name: name.to_string(),
            return_type,
            ..Default::default()
        }
    }

    pub fn constructor() -> Self {
        Self {
            is_special_name: true,
            ..Self::new(CONSTRUCTOR_NAME, TypeReference::new("System", "Void"))
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_parameter(mut self, parameter_type: TypeReference, name: &str) -> Self {
        self.parameters.push(ParameterRecord::new(parameter_type, name));
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterRecord>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_generic_parameters(mut self, names: &[&str]) -> Self {
        self.generic_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_token(mut self, token: u32) -> Self {
        self.metadata_token = token;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_virtual(mut self) -> Self {
        self.is_virtual = true;
        self
    }

    pub fn as_special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn as_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME || self.name == STATIC_CONSTRUCTOR_NAME
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRecord {
    pub name: String,
    pub field_type: TypeReference,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_const: bool,
    pub is_special_name: bool,
    pub is_compiler_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeReference>,
}

impl FieldRecord {
    pub fn new(name: &str, field_type: TypeReference) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            ..Default::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_readonly(mut self) -> Self {
        self.is_readonly = true;
        self
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self.is_static = true;
        self
    }

    pub fn as_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRecord {
    pub name: String,
    pub event_type: TypeReference,
    pub add_method: Option<MethodRecord>,
    pub remove_method: Option<MethodRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeReference>,
}

impl EventRecord {
    /// Accessibility of an event is the accessibility of its add accessor.
    pub fn visibility(&self) -> Visibility {
        self.add_method
            .as_ref()
            .map(|m| m.visibility)
            .unwrap_or(Visibility::Private)
    }

    pub fn is_static(&self) -> bool {
        self.add_method.as_ref().is_some_and(|m| m.is_static)
    }

    pub fn is_virtual(&self) -> bool {
        self.add_method.as_ref().is_some_and(|m| m.is_virtual)
    }

    pub fn accessors(&self) -> impl Iterator<Item = &MethodRecord> {
        self.add_method.iter().chain(self.remove_method.iter())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRecord {
    pub name: String,
    pub property_type: TypeReference,
    pub getter: Option<MethodRecord>,
    pub setter: Option<MethodRecord>,
}

impl PropertyRecord {
    pub fn accessors(&self) -> impl Iterator<Item = &MethodRecord> {
        self.getter.iter().chain(self.setter.iter())
    }
}

//==============================================================================
// Type records
//==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeRecord {
    /// Metadata name, including the arity suffix (`Dictionary\`2`).
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaring_type: Option<TypeReference>,
    pub kind: TypeKind,
    pub visibility: TypeVisibility,
    pub is_compiler_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<TypeReference>,
    pub interfaces: Vec<TypeReference>,
    pub generic_parameters: Vec<String>,
    pub methods: Vec<MethodRecord>,
    pub fields: Vec<FieldRecord>,
    pub events: Vec<EventRecord>,
    pub properties: Vec<PropertyRecord>,
    pub scope: Scope,
}

impl TypeRecord {
    pub fn new(kind: TypeKind, namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind,
            ..Default::default()
        }
    }

    pub fn class(namespace: &str, name: &str) -> Self {
        Self::new(TypeKind::Class, namespace, name)
            .with_base_type(TypeReference::new("System", "Object"))
    }

    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::new(TypeKind::Interface, namespace, name)
    }

    pub fn value_type(namespace: &str, name: &str) -> Self {
        Self::new(TypeKind::ValueType, namespace, name)
            .with_base_type(TypeReference::new("System", "ValueType"))
    }

    pub fn enumeration(namespace: &str, name: &str) -> Self {
        let mut record = Self::new(TypeKind::Enum, namespace, name)
            .with_base_type(TypeReference::new("System", "Enum"));
        let mut value_field = FieldRecord::new("value__", TypeReference::new("System", "Int32"));
        value_field.is_special_name = true;
        record.fields.push(value_field);
        record
    }

    pub fn with_visibility(mut self, visibility: TypeVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn in_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn nested_in(mut self, declaring: &TypeRecord) -> Self {
        self.namespace = declaring.namespace.clone();
        self.declaring_type = Some(declaring.as_reference());
        self
    }

    pub fn with_base_type(mut self, base: TypeReference) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn without_base_type(mut self) -> Self {
        self.base_type = None;
        self
    }

    pub fn with_interface(mut self, interface: TypeReference) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_generic_parameters(mut self, names: &[&str]) -> Self {
        self.generic_parameters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn as_compiler_generated(mut self) -> Self {
        self.is_compiler_generated = true;
        self
    }

    pub fn with_method(mut self, method: MethodRecord) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_field(mut self, field: FieldRecord) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a property together with its `get_`/`set_` accessor methods.
    pub fn with_property(
        mut self,
        name: &str,
        property_type: TypeReference,
        has_getter: bool,
        has_setter: bool,
    ) -> Self {
        let getter = has_getter.then(|| {
            MethodRecord::new(&format!("get_{name}"), property_type.clone()).as_special_name()
        });
        let setter = has_setter.then(|| {
            MethodRecord::new(&format!("set_{name}"), TypeReference::new("System", "Void"))
                .with_parameter(property_type.clone(), "value")
                .as_special_name()
        });
        self.methods.extend(getter.iter().cloned());
        self.methods.extend(setter.iter().cloned());
        self.properties.push(PropertyRecord {
            name: name.to_string(),
            property_type,
            getter,
            setter,
        });
        self
    }

    /// Adds an event together with its `add_`/`remove_` accessors and the
    /// compiler-generated backing field.
    pub fn with_event(mut self, name: &str, event_type: TypeReference) -> Self {
        let accessor = |prefix: &str| {
            MethodRecord::new(&format!("{prefix}_{name}"), TypeReference::new("System", "Void"))
                .with_parameter(event_type.clone(), "value")
                .as_special_name()
        };
        let add = accessor("add");
        let remove = accessor("remove");
        self.methods.push(add.clone());
        self.methods.push(remove.clone());
        self.fields.push(
            FieldRecord::new(name, event_type.clone())
                .with_visibility(Visibility::Private)
                .as_compiler_generated(),
        );
        self.events.push(EventRecord {
            name: name.to_string(),
            event_type,
            add_method: Some(add),
            remove_method: Some(remove),
            declaring_type: None,
        });
        self
    }

    /// `Ns.Outer/Inner` (arity suffixes kept, no generic arguments).
    pub fn qualified_name(&self) -> String {
        self.as_reference().qualified_name()
    }

    /// Name without the generic arity suffix; constructors match against this.
    pub fn simple_name(&self) -> &str {
        match self.name.find('`') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }

    /// Unbound reference to this type (generic parameters are not applied).
    pub fn as_reference(&self) -> TypeReference {
        TypeReference {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            declaring_type: self.declaring_type.clone().map(Box::new),
            scope: self.scope.clone(),
            generic_arguments: Vec::new(),
        }
    }

    /// Points every member (and every accessor) back at this type.
    pub fn link_members(&mut self) {
        let declaring = self.as_reference();
        let link = |method: &mut MethodRecord| method.declaring_type = Some(declaring.clone());

        self.methods.iter_mut().for_each(link);
        for field in &mut self.fields {
            field.declaring_type = Some(declaring.clone());
        }
        for event in &mut self.events {
            event.declaring_type = Some(declaring.clone());
            event.add_method.iter_mut().for_each(link);
            event.remove_method.iter_mut().for_each(link);
        }
        for property in &mut self.properties {
            property.getter.iter_mut().for_each(link);
            property.setter.iter_mut().for_each(link);
        }
    }
}

//==============================================================================
// Module snapshot
//==============================================================================

/// An immutable view of one version of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeRecord>,
}

impl ModuleSnapshot {
    pub fn new(name: &str, types: Vec<TypeRecord>) -> Self {
        let mut snapshot = Self {
            name: name.to_string(),
            types,
        };
        snapshot.link();
        snapshot
    }

    /// Decodes the JSON document produced by the module loader.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let mut snapshot: ModuleSnapshot = serde_json::from_str(json)?;
        snapshot.link();
        Ok(snapshot)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn find_type(&self, qualified_name: &str) -> Option<&TypeRecord> {
        self.types
            .iter()
            .find(|t| t.qualified_name() == qualified_name)
    }

    fn link(&mut self) {
        for record in &mut self.types {
            record.link_members();
        }
    }
}
