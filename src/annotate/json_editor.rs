//! Metadata for forms rendered by json-editor style UIs: labels, field kinds,
//! visibility in the form and a presentation order.
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use super::Annotator;
use crate::config::DEFAULT_PROPERTY_ORDER;
use crate::ir::{GeneratedClass, GeneratedProperty, Metadata};
use crate::keywords::{self, SchemaNode, LOCAL_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Checkbox,
    Select,
    Radio,
    Date,
    DateTime,
    Time,
    Email,
    Url,
    Password,
    Color,
    Image,
    File,
    Hidden,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no field type named `{0}`")]
pub struct UnknownFieldKind(pub String);

const FIELD_KINDS: [FieldKind; 16] = [
    FieldKind::Text,
    FieldKind::Textarea,
    FieldKind::Number,
    FieldKind::Checkbox,
    FieldKind::Select,
    FieldKind::Radio,
    FieldKind::Date,
    FieldKind::DateTime,
    FieldKind::Time,
    FieldKind::Email,
    FieldKind::Url,
    FieldKind::Password,
    FieldKind::Color,
    FieldKind::Image,
    FieldKind::File,
    FieldKind::Hidden,
];

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Textarea => "TEXTAREA",
            FieldKind::Number => "NUMBER",
            FieldKind::Checkbox => "CHECKBOX",
            FieldKind::Select => "SELECT",
            FieldKind::Radio => "RADIO",
            FieldKind::Date => "DATE",
            FieldKind::DateTime => "DATE_TIME",
            FieldKind::Time => "TIME",
            FieldKind::Email => "EMAIL",
            FieldKind::Url => "URL",
            FieldKind::Password => "PASSWORD",
            FieldKind::Color => "COLOR",
            FieldKind::Image => "IMAGE",
            FieldKind::File => "FILE",
            FieldKind::Hidden => "HIDDEN",
        }
    }
}

/// Exact, case-sensitive enumeration names.
impl FromStr for FieldKind {
    type Err = UnknownFieldKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELD_KINDS
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownFieldKind(s.to_string()))
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ------------------------------ Ordering ---------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq)]
struct OrderEntry {
    order: i64,
    discovered: usize,
    name: String,
}

/// Property names keyed by `(propertyOrder, discovery index)`. Siblings that
/// share an order value all survive, in the order they were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyOrderTable {
    entries: Vec<OrderEntry>,
}

impl PropertyOrderTable {
    /// Build from a class's `properties` node; `_localId` is left out.
    pub fn from_properties(properties: &SchemaNode, default_order: i64) -> Self {
        let Some(map) = properties.as_object() else {
            return Self::default();
        };
        let mut entries: Vec<OrderEntry> = map
            .iter()
            .filter(|(name, _)| name.as_str() != LOCAL_ID)
            .enumerate()
            .map(|(discovered, (name, element))| OrderEntry {
                order: keywords::integer_or(element.get("propertyOrder"), default_order),
                discovered,
                name: name.clone(),
            })
            .collect();
        entries.sort_by_key(|e| (e.order, e.discovered));
        Self { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ----------------------------- Annotator ---------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct JsonEditorAnnotator {
    default_order: i64,
}

impl Default for JsonEditorAnnotator {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTY_ORDER)
    }
}

impl JsonEditorAnnotator {
    pub fn new(default_order: i64) -> Self {
        Self { default_order }
    }
}

impl Annotator for JsonEditorAnnotator {
    fn property_order(&self, properties: &SchemaNode) -> Vec<String> {
        PropertyOrderTable::from_properties(properties, self.default_order)
            .names()
            .map(str::to_string)
            .collect()
    }

    fn property_field(
        &self,
        property: &mut GeneratedProperty,
        _class: &GeneratedClass,
        property_name: &str,
        node: &SchemaNode,
    ) {
        if let Some(title) = keywords::non_empty_text(node, "title") {
            property.annotate(Metadata::Title(title));
        }
        if let Some(plural) = keywords::non_empty_text(node, "plural_title") {
            property.annotate(Metadata::PluralTitle(plural));
        }
        if let Some(multiple) = node.get("multiple") {
            property.annotate(Metadata::Multiple(keywords::boolean(multiple)));
        }
        if let Some(field_type) = node.get("fieldType") {
            let field_type = keywords::text(field_type);
            match field_type.parse::<FieldKind>() {
                Ok(kind) => property.annotate(Metadata::FieldKind(kind)),
                Err(error) => warn!(property = property_name, %error, "no field type found"),
            }
        }
        if let Some(hidden) = node.get("options").and_then(|o| o.get("hidden")) {
            property.annotate(Metadata::Hidden(keywords::boolean(hidden)));
        }
        if let Some(description) = keywords::non_empty_text(node, "description") {
            property.annotate(Metadata::Description(description));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{GeneratedType, Visibility};
    use serde_json::{json, Value};

    fn annotate(node: Value) -> GeneratedProperty {
        let class = GeneratedClass::new("Form", "");
        let mut prop = GeneratedProperty::new("field", "field".into(), GeneratedType::any(), Visibility::Private);
        JsonEditorAnnotator::default().property_field(&mut prop, &class, "field", &node);
        prop
    }

    #[test]
    fn explicit_order_sorts_ascending() {
        let props = json!({"second": {"propertyOrder": 2}, "first": {"propertyOrder": 1}});
        let order = JsonEditorAnnotator::default().property_order(&props);
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn equal_orders_keep_every_property() {
        let props = json!({
            "c": {},
            "a": {"propertyOrder": 5},
            "b": {"propertyOrder": 5},
            "d": {},
            "_localId": {"propertyOrder": 0},
        });
        let table = PropertyOrderTable::from_properties(&props, 1000);
        assert_eq!(table.len(), 4);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn non_object_properties_yield_nothing() {
        assert!(PropertyOrderTable::from_properties(&json!([1, 2]), 1000).is_empty());
    }

    #[test]
    fn full_metadata() {
        let prop = annotate(json!({
            "title": "Name",
            "plural_title": "Names",
            "multiple": true,
            "fieldType": "TEXTAREA",
            "options": {"hidden": "true"},
            "description": "Full name",
        }));
        assert!(prop.has(&Metadata::Title("Name".into())));
        assert!(prop.has(&Metadata::PluralTitle("Names".into())));
        assert!(prop.has(&Metadata::Multiple(true)));
        assert!(prop.has(&Metadata::FieldKind(FieldKind::Textarea)));
        assert!(prop.has(&Metadata::Hidden(true)));
        assert!(prop.has(&Metadata::Description("Full name".into())));
    }

    #[test]
    fn empty_labels_are_skipped() {
        let prop = annotate(json!({"title": "", "description": "", "options": {}}));
        assert!(prop.metadata.is_empty());
        let prop = annotate(json!({"title": {"en": "Name"}, "plural_title": ["Names"]}));
        assert!(prop.metadata.is_empty());
    }

    #[test]
    fn unknown_field_type_is_not_fatal() {
        let prop = annotate(json!({"fieldType": "HOLOGRAM", "title": "T"}));
        assert!(prop.find("field_kind").is_none());
        assert!(prop.has(&Metadata::Title("T".into())));
        assert!("textarea".parse::<FieldKind>().is_err());
        assert_eq!("DATE_TIME".parse::<FieldKind>().unwrap(), FieldKind::DateTime);
    }

    #[test]
    fn field_kind_names_round_trip() {
        for kind in FIELD_KINDS {
            assert_eq!(kind.name().parse::<FieldKind>().unwrap(), kind);
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.name()));
        }
    }
}
