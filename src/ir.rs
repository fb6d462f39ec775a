// Generated-type model handed to an emission backend.
// Target-language agnostic: names, types, accessors and metadata tags only.

use std::collections::BTreeSet;
use std::fmt;

use ordered_float::OrderedFloat;
use serde::Serialize;
use serde_json::Value;

use crate::annotate::FieldKind;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum GeneratedType {
    Primitive(String),
    /// Name of another generated class.
    TypeReference(String),
    Collection(Box<GeneratedType>),
    /// String-keyed map with values of the inner type.
    MapType(Box<GeneratedType>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

/// One `(kind, value)` tag attached to a member or accessor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Metadata {
    Title(String),
    PluralTitle(String),
    Description(String),
    Required(bool),
    Multiple(bool),
    FieldKind(FieldKind),
    Hidden(bool),
    Pattern(String),
    Minimum(OrderedFloat<f64>),
    Maximum(OrderedFloat<f64>),
    MinItems(u64),
    MaxItems(u64),
    MinLength(u64),
    MaxLength(u64),
    /// Nested values must be validated recursively.
    Valid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub name: String,
    pub doc: String,
    pub metadata: BTreeSet<Metadata>,
}

/// `with<Name>(value) -> Self`: assigns the member and returns the instance it
/// was called on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderMethod {
    pub name: String,
    pub parameter: GeneratedType,
    pub returns: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedProperty {
    pub source_name: String,
    pub target_name: String,
    #[serde(rename = "type")]
    pub ty: GeneratedType,
    pub visibility: Visibility,
    /// Assigned at construction, never reassigned.
    pub immutable: bool,
    pub getter: Option<Accessor>,
    pub setter: Option<Accessor>,
    pub builder: Option<BuilderMethod>,
    /// Position in the class, in schema discovery order.
    pub order: usize,
    pub default_value: Option<Value>,
    pub metadata: BTreeSet<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedClass {
    pub name: String,
    pub package: String,
    pub properties: Vec<GeneratedProperty>,
    /// Presentation-order hint produced by the annotator, if any.
    pub presentation_order: Vec<String>,
    /// Value type of the open map of unknown properties, when generated.
    pub additional_properties: Option<GeneratedType>,
}

// ------------------------------- Types ------------------------------------ //

impl GeneratedType {
    pub fn primitive(name: &str) -> Self {
        GeneratedType::Primitive(name.to_string())
    }

    pub fn any() -> Self {
        Self::primitive("any")
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, GeneratedType::Primitive(name) if name == "boolean")
    }

    /// The class this type names, looking through collections and maps.
    pub fn referenced_class(&self) -> Option<&str> {
        match self {
            GeneratedType::Primitive(_) => None,
            GeneratedType::TypeReference(name) => Some(name),
            GeneratedType::Collection(inner) | GeneratedType::MapType(inner) => {
                inner.referenced_class()
            }
        }
    }
}

impl fmt::Display for GeneratedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedType::Primitive(name) | GeneratedType::TypeReference(name) => f.write_str(name),
            GeneratedType::Collection(inner) => write!(f, "[{inner}]"),
            GeneratedType::MapType(inner) => write!(f, "{{string: {inner}}}"),
        }
    }
}

impl Metadata {
    pub fn kind(&self) -> &'static str {
        match self {
            Metadata::Title(_) => "title",
            Metadata::PluralTitle(_) => "plural_title",
            Metadata::Description(_) => "description",
            Metadata::Required(_) => "required",
            Metadata::Multiple(_) => "multiple",
            Metadata::FieldKind(_) => "field_kind",
            Metadata::Hidden(_) => "hidden",
            Metadata::Pattern(_) => "pattern",
            Metadata::Minimum(_) => "minimum",
            Metadata::Maximum(_) => "maximum",
            Metadata::MinItems(_) => "min_items",
            Metadata::MaxItems(_) => "max_items",
            Metadata::MinLength(_) => "min_length",
            Metadata::MaxLength(_) => "max_length",
            Metadata::Valid => "valid",
        }
    }
}

// ------------------------------ Members ----------------------------------- //

impl Accessor {
    pub fn new(kind: AccessorKind, name: String, doc: String) -> Self {
        Self { kind, name, doc, metadata: BTreeSet::new() }
    }
}

impl GeneratedProperty {
    pub fn new(source_name: &str, target_name: String, ty: GeneratedType, visibility: Visibility) -> Self {
        Self {
            source_name: source_name.to_string(),
            target_name,
            ty,
            visibility,
            immutable: false,
            getter: None,
            setter: None,
            builder: None,
            order: 0,
            default_value: None,
            metadata: BTreeSet::new(),
        }
    }

    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    pub fn has_builder_method(&self) -> bool {
        self.builder.is_some()
    }

    pub fn annotate(&mut self, metadata: Metadata) {
        self.metadata.insert(metadata);
    }

    pub fn has(&self, metadata: &Metadata) -> bool {
        self.metadata.contains(metadata)
    }

    /// First tag of the given kind (see [`Metadata::kind`]).
    pub fn find(&self, kind: &str) -> Option<&Metadata> {
        self.metadata.iter().find(|m| m.kind() == kind)
    }
}

impl GeneratedClass {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            properties: Vec::new(),
            presentation_order: Vec::new(),
            additional_properties: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn property(&self, source_name: &str) -> Option<&GeneratedProperty> {
        self.properties.iter().find(|p| p.source_name == source_name)
    }

    pub fn property_mut(&mut self, source_name: &str) -> Option<&mut GeneratedProperty> {
        self.properties.iter_mut().find(|p| p.source_name == source_name)
    }

    pub fn has_member(&self, target_name: &str) -> bool {
        self.properties.iter().any(|p| p.target_name == target_name)
    }

    /// Append a member; target names are unique within a class.
    pub fn add_property(&mut self, mut property: GeneratedProperty) -> Result<(), ConfigurationError> {
        if self.has_member(&property.target_name) {
            return Err(ConfigurationError::DuplicateMember {
                class: self.name.clone(),
                name: property.target_name,
            });
        }
        property.order = self.properties.len();
        self.properties.push(property);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_target_names_are_rejected() {
        let mut class = GeneratedClass::new("Person", "com.example");
        let first = GeneratedProperty::new("first-name", "firstName".into(), GeneratedType::primitive("string"), Visibility::Private);
        let second = GeneratedProperty::new("first_name", "firstName".into(), GeneratedType::primitive("string"), Visibility::Private);
        class.add_property(first).unwrap();
        let err = class.add_property(second).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateMember { .. }));
        assert_eq!(class.properties.len(), 1);
        assert_eq!(class.qualified_name(), "com.example.Person");
    }

    #[test]
    fn display_and_references() {
        let ty = GeneratedType::MapType(Box::new(GeneratedType::Collection(Box::new(
            GeneratedType::TypeReference("Node".into()),
        ))));
        assert_eq!(ty.to_string(), "{string: [Node]}");
        assert_eq!(ty.referenced_class(), Some("Node"));
        assert!(GeneratedType::primitive("boolean").is_boolean());
    }

    #[test]
    fn serializes_with_kind_tags() {
        let json = serde_json::to_value(Metadata::MinLength(3)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "min_length", "value": 3}));
        let json = serde_json::to_value(GeneratedType::Collection(Box::new(GeneratedType::any()))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "collection", "of": {"kind": "primitive", "of": "any"}}));
    }
}
