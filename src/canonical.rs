use serde::Serialize;

// BTreeSet keeps members sorted and unique, so the rendering does not depend
// on declaration order.
use std::collections::BTreeSet;

//==============================================================================
// Structs for Exact Surface Fingerprinting
//==============================================================================

/// The selected API surface of one module snapshot.
#[derive(Debug, Default, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalSurface {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub types: BTreeSet<CanonicalType>,
}

/// One selected type and its selected members.
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalType {
    /// `[scope]Ns.Outer/Name` rendering of the type's identity.
    pub name: String,
    pub kind: String,
    pub visibility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub interfaces: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub methods: BTreeSet<CanonicalMethod>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub fields: BTreeSet<CanonicalField>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub events: BTreeSet<CanonicalEvent>,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalMethod {
    pub name: String,
    pub visibility: String,
    pub return_type: String,
    // Parameter order is significant.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<CanonicalParameter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_parameters: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalParameter {
    pub parameter_type: String,
    /// "in", "out" or empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub direction: String,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalField {
    pub name: String,
    pub field_type: String,
    pub visibility: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_readonly: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalEvent {
    pub name: String,
    pub event_type: String,
    pub visibility: String,
}
