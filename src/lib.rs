//! JSON Schema → generated-type model.
//!
//! [`compile::SchemaCompiler`] walks a schema document, follows `$ref`s through
//! a per-run [`store::SchemaStore`], and produces [`ir::GeneratedClass`]es
//! decorated by a pluggable [`annotate::Annotator`]. Emitting source text from
//! the model is left to a separate backend.
pub mod annotate;
pub mod compile;
pub mod config;
pub mod error;
pub mod fragment;
pub mod ir;
pub mod keywords;
pub mod lower;
pub mod naming;
pub mod path_de;
pub mod store;

pub use annotate::{Annotator, JsonEditorAnnotator, NoopAnnotator};
pub use compile::{compile_value, SchemaCompiler, Session};
pub use config::GenerationConfig;
pub use error::{CompileError, ConfigurationError, ResolutionError};
pub use ir::{GeneratedClass, GeneratedProperty, GeneratedType};
