//! Generation settings.
//!
//! Every field has a default so a config file only needs the keys it changes.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// What the fragment resolver does with a segment it cannot percent-decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Log a warning and look the segment up undecoded.
    #[default]
    Lenient,
    /// Fail with `ResolutionError::UndecodableSegment`.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotatorKind {
    None,
    #[default]
    JsonEditor,
}

/// Character encoding used to interpret percent-escaped bytes in `$ref` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEncoding {
    Utf8,
    Latin1,
}

impl SegmentEncoding {
    pub fn from_name(name: &str) -> Result<Self, ConfigurationError> {
        let key = name.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match key.as_str() {
            "utf8" => Ok(SegmentEncoding::Utf8),
            "iso88591" | "latin1" => Ok(SegmentEncoding::Latin1),
            _ => Err(ConfigurationError::UnsupportedEncoding { encoding: name.to_string() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SegmentEncoding::Utf8 => "UTF-8",
            SegmentEncoding::Latin1 => "ISO-8859-1",
        }
    }
}

pub const DEFAULT_PROPERTY_ORDER: i64 = 1000;

const RESERVED_IDENTIFIERS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Private members with a getter/setter pair, or public members only.
    pub include_accessors: bool,
    /// Fluent `with<Name>` methods.
    pub generate_builders: bool,
    /// Pattern, range, size and nested-validity metadata.
    pub include_constraints: bool,
    pub target_package: String,
    pub property_word_delimiters: String,
    pub reserved_identifiers: Vec<String>,
    pub ref_encoding: String,
    pub decode_policy: DecodePolicy,
    pub default_property_order: i64,
    pub annotator: AnnotatorKind,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            include_accessors: true,
            generate_builders: false,
            include_constraints: true,
            target_package: String::new(),
            property_word_delimiters: "- _".to_string(),
            reserved_identifiers: RESERVED_IDENTIFIERS.iter().map(|s| s.to_string()).collect(),
            ref_encoding: "UTF-8".to_string(),
            decode_policy: DecodePolicy::Lenient,
            default_property_order: DEFAULT_PROPERTY_ORDER,
            annotator: AnnotatorKind::JsonEditor,
        }
    }
}

impl GenerationConfig {
    pub fn segment_encoding(&self) -> Result<SegmentEncoding, ConfigurationError> {
        SegmentEncoding::from_name(&self.ref_encoding)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigurationError> {
        let config: Self = crate::path_de::from_str_with_path(src).map_err(|reason| {
            ConfigurationError::Invalid { path: "<inline>".to_string(), reason }
        })?;
        config.segment_encoding()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let display = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|error| ConfigurationError::Invalid {
            path: display.clone(),
            reason: error.to_string(),
        })?;
        let config: Self = crate::path_de::from_slice_with_path(&bytes)
            .map_err(|reason| ConfigurationError::Invalid { path: display, reason })?;
        config.segment_encoding()?;
        Ok(config)
    }
}
