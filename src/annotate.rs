//! Pluggable presentation metadata.
//!
//! An [`Annotator`] is chosen when the compiler is built and receives a
//! callback for each generated member and accessor. Every hook defaults to a
//! no-op so a strategy only implements what its target framework needs.
pub mod json_editor;

use crate::config::{AnnotatorKind, GenerationConfig};
use crate::ir::{Accessor, GeneratedClass, GeneratedProperty};
use crate::keywords::SchemaNode;

pub use json_editor::{FieldKind, JsonEditorAnnotator, PropertyOrderTable};

pub trait Annotator {
    /// Emission order hint for a class, given its whole `properties` node.
    fn property_order(&self, _properties: &SchemaNode) -> Vec<String> {
        Vec::new()
    }

    /// Decorate a member. `node` is the property schema after `$ref` resolution.
    fn property_field(
        &self,
        _property: &mut GeneratedProperty,
        _class: &GeneratedClass,
        _property_name: &str,
        _node: &SchemaNode,
    ) {
    }

    fn property_getter(&self, _getter: &mut Accessor, _property_name: &str) {}

    fn property_setter(&self, _setter: &mut Accessor, _property_name: &str) {}

    /// Whether classes may carry an open map of unknown properties.
    fn is_additional_properties_supported(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnnotator;

impl Annotator for NoopAnnotator {}

/// Runs several strategies in sequence.
#[derive(Default)]
pub struct CompositeAnnotator {
    annotators: Vec<Box<dyn Annotator>>,
}

impl CompositeAnnotator {
    pub fn new(annotators: Vec<Box<dyn Annotator>>) -> Self {
        Self { annotators }
    }

    pub fn push(&mut self, annotator: impl Annotator + 'static) {
        self.annotators.push(Box::new(annotator));
    }
}

impl Annotator for CompositeAnnotator {
    /// First strategy with an opinion wins.
    fn property_order(&self, properties: &SchemaNode) -> Vec<String> {
        self.annotators
            .iter()
            .map(|a| a.property_order(properties))
            .find(|order| !order.is_empty())
            .unwrap_or_default()
    }

    fn property_field(
        &self,
        property: &mut GeneratedProperty,
        class: &GeneratedClass,
        property_name: &str,
        node: &SchemaNode,
    ) {
        for a in &self.annotators {
            a.property_field(property, class, property_name, node);
        }
    }

    fn property_getter(&self, getter: &mut Accessor, property_name: &str) {
        for a in &self.annotators {
            a.property_getter(getter, property_name);
        }
    }

    fn property_setter(&self, setter: &mut Accessor, property_name: &str) {
        for a in &self.annotators {
            a.property_setter(setter, property_name);
        }
    }

    fn is_additional_properties_supported(&self) -> bool {
        self.annotators.iter().all(|a| a.is_additional_properties_supported())
    }
}

pub fn from_config(config: &GenerationConfig) -> Box<dyn Annotator> {
    match config.annotator {
        AnnotatorKind::None => Box::new(NoopAnnotator),
        AnnotatorKind::JsonEditor => Box::new(JsonEditorAnnotator::new(config.default_property_order)),
    }
}
