//! Class compilation: walks a schema document and produces the
//! [`GeneratedClass`]es it describes.
//!
//! One [`Session`] is one run. It owns the schema store (and so the `$ref`
//! cache) plus the registry of classes scheduled so far; nothing outlives it.
pub mod constraints;
pub mod property;

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;
use tracing::{debug, info};

use crate::annotate::{self, Annotator};
use crate::config::GenerationConfig;
use crate::error::{CompileError, ConfigurationError};
use crate::fragment::FragmentResolver;
use crate::ir::{GeneratedClass, GeneratedType, Metadata};
use crate::keywords::{self, SchemaNode};
use crate::lower::{SchemaTypeDispatch, TypeDispatch};
use crate::naming::NameHelper;
use crate::store::{DocumentId, DocumentSource, SchemaId, SchemaStore};

pub use property::PropertyCompiler;

// ————————————————————————————————————————————————————————————————————————————
// SESSION
// ————————————————————————————————————————————————————————————————————————————

/// A class waiting to be compiled.
#[derive(Debug, Clone)]
pub struct PendingClass {
    pub name: String,
    pub node: SchemaNode,
    /// Schema that relative references inside `node` resolve against.
    pub context: SchemaId,
}

#[derive(Debug, Default)]
pub struct ClassRegistry {
    names: HashSet<String>,
    bound: HashMap<SchemaId, String>,
    pending: VecDeque<PendingClass>,
}

impl ClassRegistry {
    /// Class already generated for a resolved schema.
    pub fn bound(&self, id: SchemaId) -> Option<&str> {
        self.bound.get(&id).map(String::as_str)
    }

    /// Queue `node` for compilation and return the name it was given, which
    /// is `name` or `name_N` for the first free `N`. When `identity` is set,
    /// later references to that schema reuse the class.
    pub fn schedule(
        &mut self,
        name: String,
        node: SchemaNode,
        context: SchemaId,
        identity: Option<SchemaId>,
    ) -> String {
        let mut unique = name.clone();
        let mut n = 0;
        while self.names.contains(&unique) {
            n += 1;
            unique = format!("{name}_{n}");
        }
        self.names.insert(unique.clone());
        if let Some(id) = identity {
            self.bound.insert(id, unique.clone());
        }
        debug!(class = %unique, "scheduled class");
        self.pending.push_back(PendingClass { name: unique.clone(), node, context });
        unique
    }

    pub fn next(&mut self) -> Option<PendingClass> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

pub struct Session {
    pub store: SchemaStore,
    pub classes: ClassRegistry,
}

impl Session {
    pub fn new(store: SchemaStore) -> Self {
        Self { store, classes: ClassRegistry::default() }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMPILER
// ————————————————————————————————————————————————————————————————————————————

pub struct SchemaCompiler {
    config: GenerationConfig,
    naming: NameHelper,
    dispatch: Box<dyn TypeDispatch>,
    annotator: Box<dyn Annotator>,
}

impl SchemaCompiler {
    pub fn new(config: GenerationConfig, annotator: Box<dyn Annotator>) -> Self {
        let naming = NameHelper::new(&config);
        let dispatch = Box::new(SchemaTypeDispatch::new(naming.clone()));
        Self { config, naming, dispatch, annotator }
    }

    /// Compiler with the annotator named in `config`.
    pub fn from_config(config: GenerationConfig) -> Self {
        let annotator = annotate::from_config(&config);
        Self::new(config, annotator)
    }

    pub fn with_dispatch(mut self, dispatch: impl TypeDispatch + 'static) -> Self {
        self.dispatch = Box::new(dispatch);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Fresh run over documents from `source`.
    pub fn session(&self, source: impl DocumentSource + 'static) -> Result<Session, ConfigurationError> {
        let resolver = FragmentResolver::new(self.config.segment_encoding()?, self.config.decode_policy);
        Ok(Session::new(SchemaStore::new(source, resolver)))
    }

    pub fn property_compiler(&self) -> PropertyCompiler<'_> {
        PropertyCompiler::new(&self.config, &self.naming, self.dispatch.as_ref(), self.annotator.as_ref())
    }

    /// Compile the root of `document` and every class it leads to. The root
    /// class is named `class_name`, or after the document when `None`.
    pub fn compile_document(
        &self,
        session: &mut Session,
        document: &DocumentId,
        class_name: Option<&str>,
    ) -> Result<Vec<GeneratedClass>, CompileError> {
        let root = session.store.root(document)?;
        let name = self.naming.class_name(class_name.unwrap_or(document.stem()));
        let node = session.store[root].content.clone();
        session.classes.schedule(name, node, root, Some(root));

        let mut classes = Vec::new();
        while let Some(pending) = session.classes.next() {
            classes.push(self.compile_class(session, pending)?);
        }
        info!(%document, classes = classes.len(), "compiled document");
        Ok(classes)
    }

    pub fn compile_class(&self, session: &mut Session, pending: PendingClass) -> Result<GeneratedClass, CompileError> {
        let PendingClass { name, node, context } = pending;
        let mut class = GeneratedClass::new(name.clone(), self.config.target_package.clone());
        let properties = node.get("properties");

        if let Some(Value::Object(map)) = properties {
            let compiler = self.property_compiler();
            for (property_name, property_node) in map {
                class = compiler
                    .apply(session, property_name, property_node, class, context)
                    .map_err(|e| e.in_property(&name, property_name))?;
            }
        }

        if let Some(Value::Array(required)) = node.get("required") {
            for property_name in required.iter().filter_map(Value::as_str) {
                if let Some(property) = class.property_mut(property_name) {
                    property.metadata.remove(&Metadata::Required(false));
                    property.annotate(Metadata::Required(true));
                    for accessor in [property.getter.as_mut(), property.setter.as_mut()].into_iter().flatten() {
                        accessor.metadata.remove(&Metadata::Required(false));
                        accessor.metadata.insert(Metadata::Required(true));
                    }
                }
            }
        }

        if let Some(properties) = properties {
            class.presentation_order = self.annotator.property_order(properties);
        }

        if self.annotator.is_additional_properties_supported() {
            class.additional_properties = match node.get("additionalProperties") {
                Some(Value::Bool(false)) => None,
                Some(values @ Value::Object(_)) => {
                    let hint = format!("{name}Property");
                    let ty = self
                        .dispatch
                        .type_for(session, &hint, values, context)
                        .map_err(|e| e.in_property(&name, "additionalProperties"))?;
                    Some(ty)
                }
                _ => Some(GeneratedType::any()),
            };
        }

        debug!(class = %name, members = class.properties.len(), "compiled class");
        Ok(class)
    }
}

/// Compile an in-memory schema tree in one call.
pub fn compile_value(
    tree: SchemaNode,
    class_name: &str,
    config: GenerationConfig,
) -> Result<Vec<GeneratedClass>, CompileError> {
    let compiler = SchemaCompiler::from_config(config);
    let document = DocumentId::new(format!("{}.json", class_name));
    let mut session = compiler.session(crate::store::InMemoryDocuments::new().with(document.as_str(), tree))?;
    compiler.compile_document(&mut session, &document, Some(class_name))
}

/// Whether a resolved schema describes a value that needs nested validation.
pub(crate) fn is_composite(node: &SchemaNode) -> bool {
    keywords::is_type(node, "object") || keywords::is_type(node, "array")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::NoopAnnotator;
    use crate::error::ResolutionError;
    use crate::ir::Visibility;
    use crate::store::InMemoryDocuments;
    use serde_json::json;

    fn compile(tree: Value) -> Vec<GeneratedClass> {
        compile_value(tree, "Root", GenerationConfig::default()).unwrap()
    }

    fn class<'a>(classes: &'a [GeneratedClass], name: &str) -> &'a GeneratedClass {
        classes.iter().find(|c| c.name == name).unwrap_or_else(|| panic!("no class {name}"))
    }

    #[test]
    fn nested_objects_become_classes_in_discovery_order() {
        let classes = compile(json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "address": {"type": "object", "properties": {"street": {"type": "string"}}},
                "tags": {"type": "array", "items": {"type": "string"}},
            },
            "required": ["name"],
        }));
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "Address"]);

        let root = class(&classes, "Root");
        assert_eq!(root.properties.len(), 3);
        assert!(root.property("name").unwrap().has(&Metadata::Required(true)));
        assert!(root.property("address").unwrap().has(&Metadata::Valid));
        assert_eq!(root.property("address").unwrap().ty, GeneratedType::TypeReference("Address".into()));
        assert_eq!(root.additional_properties, Some(GeneratedType::any()));
        assert_eq!(root.presentation_order, vec!["name", "address", "tags"]);
    }

    #[test]
    fn self_referencing_property() {
        let classes = compile(json!({
            "type": "object",
            "properties": {
                "childOfSelf": {"$ref": "#"},
                "arrayOfSelf": {"type": "array", "items": {"$ref": "#"}},
            },
            "additionalProperties": {"$ref": "#"},
        }));
        assert_eq!(classes.len(), 1);
        let root = &classes[0];
        let self_ref = GeneratedType::TypeReference("Root".into());
        assert_eq!(root.property("childOfSelf").unwrap().ty, self_ref);
        assert_eq!(
            root.property("arrayOfSelf").unwrap().ty,
            GeneratedType::Collection(Box::new(self_ref.clone()))
        );
        assert_eq!(root.additional_properties, Some(self_ref));
    }

    #[test]
    fn nested_self_reference_through_definitions() {
        let classes = compile(json!({
            "type": "object",
            "properties": {"thing": {"$ref": "#/definitions/thing"}},
            "definitions": {
                "thing": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "children": {"type": "array", "items": {"$ref": "#/definitions/thing"}},
                    },
                    "additionalProperties": false,
                },
            },
        }));
        assert_eq!(classes.len(), 2);
        let thing = class(&classes, "Thing");
        assert_eq!(
            thing.property("children").unwrap().ty,
            GeneratedType::Collection(Box::new(GeneratedType::TypeReference("Thing".into())))
        );
        assert_eq!(thing.additional_properties, None);
    }

    #[test]
    fn classes_across_documents() {
        let docs = InMemoryDocuments::new()
            .with("schemas/order.json", json!({
                "type": "object",
                "properties": {"customer": {"$ref": "common/customer.json"}},
            }))
            .with("schemas/common/customer.json", json!({
                "type": "object",
                "properties": {"id": {"type": "integer"}},
            }));
        let compiler = SchemaCompiler::new(GenerationConfig::default(), Box::new(NoopAnnotator));
        let mut session = compiler.session(docs).unwrap();
        let classes = compiler
            .compile_document(&mut session, &DocumentId::new("schemas/order.json"), None)
            .unwrap();
        let names: Vec<_> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Order", "Customer"]);
        assert!(classes[0].presentation_order.is_empty());
        assert_eq!(session.store.document_count(), 2);
    }

    #[test]
    fn failures_name_class_and_property() {
        let err = compile_value(
            json!({"properties": {"broken": {"$ref": "#/definitions/missing"}}}),
            "Root",
            GenerationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err.resolution(), Some(ResolutionError::PathNotPresent { .. })));
        assert!(err.to_string().starts_with("Root.broken: "), "{err}");
    }

    #[test]
    fn public_members_without_accessors() {
        let config = GenerationConfig { include_accessors: false, ..GenerationConfig::default() };
        let classes = compile_value(json!({"properties": {"a": {"type": "string"}}}), "Root", config).unwrap();
        let a = classes[0].property("a").unwrap();
        assert_eq!(a.visibility, Visibility::Public);
        assert!(!a.has_getter() && !a.has_setter());
    }

    #[test]
    fn registry_suffixes_taken_names() {
        let mut registry = ClassRegistry::default();
        let docs = InMemoryDocuments::new().with("a.json", json!({}));
        let mut store = SchemaStore::new(docs, FragmentResolver::default());
        let root = store.root(&DocumentId::new("a.json")).unwrap();
        assert_eq!(registry.schedule("Item".into(), json!({}), root, Some(root)), "Item");
        assert_eq!(registry.schedule("Item".into(), json!({}), root, None), "Item_1");
        assert_eq!(registry.schedule("Item".into(), json!({}), root, None), "Item_2");
        assert_eq!(registry.bound(root), Some("Item"));
        assert_eq!(registry.next().unwrap().name, "Item");
        assert_eq!(registry.pending_len(), 2);
    }
}
