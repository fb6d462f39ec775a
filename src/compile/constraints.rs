//! Validation-constraint hooks, applied in a fixed order after the member
//! exists. Each one is a no-op when its keyword is absent.
use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::config::GenerationConfig;
use crate::ir::{GeneratedProperty, Metadata};
use crate::keywords::{self, SchemaNode};

pub fn apply(config: &GenerationConfig, property: &mut GeneratedProperty, node: &SchemaNode) {
    if config.include_constraints {
        pattern(property, node);
    }
    default_value(property, node);
    if config.include_constraints {
        bounds(property, node);
        item_counts(property, node);
        lengths(property, node);
        if super::is_composite(node) {
            property.annotate(Metadata::Valid);
        }
    }
}

fn pattern(property: &mut GeneratedProperty, node: &SchemaNode) {
    let Some(pattern) = node.get("pattern").and_then(Value::as_str) else {
        return;
    };
    if let Err(error) = Regex::new(pattern) {
        warn!(member = %property.target_name, pattern, %error, "pattern does not compile");
    }
    property.annotate(Metadata::Pattern(pattern.to_string()));
}

fn default_value(property: &mut GeneratedProperty, node: &SchemaNode) {
    if let Some(default) = node.get("default") {
        property.default_value = Some(default.clone());
    }
}

fn bounds(property: &mut GeneratedProperty, node: &SchemaNode) {
    if let Some(min) = node.get("minimum").and_then(Value::as_f64) {
        property.annotate(Metadata::Minimum(OrderedFloat(min)));
    }
    if let Some(max) = node.get("maximum").and_then(Value::as_f64) {
        property.annotate(Metadata::Maximum(OrderedFloat(max)));
    }
}

fn item_counts(property: &mut GeneratedProperty, node: &SchemaNode) {
    if let Some(min) = keywords::unsigned(node, "minItems") {
        property.annotate(Metadata::MinItems(min));
    }
    if let Some(max) = keywords::unsigned(node, "maxItems") {
        property.annotate(Metadata::MaxItems(max));
    }
}

fn lengths(property: &mut GeneratedProperty, node: &SchemaNode) {
    if let Some(min) = keywords::unsigned(node, "minLength") {
        property.annotate(Metadata::MinLength(min));
    }
    if let Some(max) = keywords::unsigned(node, "maxLength") {
        property.annotate(Metadata::MaxLength(max));
    }
}
