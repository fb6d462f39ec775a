//! Error taxonomy for reference resolution and class compilation.
use thiserror::Error;

use crate::store::{DocumentId, SchemaReference};

/// The requested schema location cannot be determined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("path not present: {segment}")]
    PathNotPresent { segment: String },

    #[error("not a valid array index: {segment}")]
    InvalidIndex { segment: String },

    #[error("cyclic reference: {reference} is already on the resolution path")]
    CyclicReference { reference: SchemaReference },

    /// Only raised under [`crate::config::DecodePolicy::Strict`].
    #[error("could not decode path segment `{segment}` from {encoding}")]
    UndecodableSegment { segment: String, encoding: String },

    #[error("document not found: {document}")]
    DocumentNotFound { document: DocumentId },

    #[error("failed to load document {document}: {reason}")]
    DocumentLoad { document: DocumentId, reason: String },
}

/// A naming or configuration collaborator rejected its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("property `{property}` produces an empty identifier")]
    EmptyIdentifier { property: String },

    #[error("property `{property}` produces the reserved identifier `{identifier}`")]
    ReservedIdentifier { property: String, identifier: String },

    #[error("class `{class}` already has a member named `{name}`")]
    DuplicateMember { class: String, name: String },

    #[error("unsupported character encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    #[error("invalid configuration {path}: {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Any failure while compiling one member, tagged with where it happened.
    #[error("{class}.{property}: {source}")]
    Property {
        class: String,
        property: String,
        #[source]
        source: Box<CompileError>,
    },
}

impl CompileError {
    pub fn in_property(self, class: &str, property: &str) -> Self {
        // keep the innermost location
        if matches!(self, CompileError::Property { .. }) {
            return self;
        }
        CompileError::Property {
            class: class.to_string(),
            property: property.to_string(),
            source: Box::new(self),
        }
    }

    /// The underlying resolution error, looking through property context.
    pub fn resolution(&self) -> Option<&ResolutionError> {
        match self {
            CompileError::Resolution(e) => Some(e),
            CompileError::Property { source, .. } => source.resolution(),
            CompileError::Configuration(_) => None,
        }
    }

    pub fn configuration(&self) -> Option<&ConfigurationError> {
        match self {
            CompileError::Configuration(e) => Some(e),
            CompileError::Property { source, .. } => source.configuration(),
            CompileError::Resolution(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_context_wraps_once() {
        let err = CompileError::from(ResolutionError::PathNotPresent { segment: "x".into() })
            .in_property("Inner", "a")
            .in_property("Outer", "b");
        assert_eq!(err.to_string(), "Inner.a: path not present: x");
        assert!(matches!(
            err.resolution(),
            Some(ResolutionError::PathNotPresent { .. })
        ));
        assert!(err.configuration().is_none());
    }
}
