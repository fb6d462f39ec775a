//! Type dispatch: schema node → [`GeneratedType`].
//!
//! Object schemas become classes. They are scheduled on the session's
//! [`ClassRegistry`](crate::compile::ClassRegistry) and compiled later, so a
//! schema that refers back to itself only ever yields a `TypeReference`.
use serde_json::Value;
use tracing::trace;

use crate::compile::Session;
use crate::error::{CompileError, ResolutionError};
use crate::ir::GeneratedType;
use crate::keywords::{self, SchemaNode};
use crate::naming::{singular, NameHelper};
use crate::store::SchemaId;

pub trait TypeDispatch {
    /// Type of the property `property_name` whose schema is `node`. `enclosing`
    /// is the schema relative references inside `node` resolve against.
    fn type_for(
        &self,
        session: &mut Session,
        property_name: &str,
        node: &SchemaNode,
        enclosing: SchemaId,
    ) -> Result<GeneratedType, CompileError>;
}

#[derive(Debug, Clone)]
pub struct SchemaTypeDispatch {
    naming: NameHelper,
}

impl SchemaTypeDispatch {
    pub fn new(naming: NameHelper) -> Self {
        Self { naming }
    }

    fn dispatch(
        &self,
        session: &mut Session,
        hint: &str,
        node: &SchemaNode,
        context: SchemaId,
        identity: Option<SchemaId>,
        trail: &mut Vec<SchemaId>,
    ) -> Result<GeneratedType, CompileError> {
        // 1) References
        if let Some(reference) = keywords::ref_of(node) {
            let target = session.store.create(context, reference)?;
            if let Some(name) = session.classes.bound(target) {
                return Ok(GeneratedType::TypeReference(name.to_string()));
            }
            if trail.contains(&target) {
                let reference = session.store[target].reference.clone();
                return Err(ResolutionError::CyclicReference { reference }.into());
            }
            trace!(reference, ?target, "dispatching through $ref");
            let content = session.store[target].content.clone();
            let hint = match session.store[target].reference.fragment.last() {
                Some(segment) => segment.clone(),
                None => session.store[target].reference.document.stem().to_string(),
            };
            trail.push(target);
            let ty = self.dispatch(session, &hint, &content, target, Some(target), trail);
            trail.pop();
            return ty;
        }

        // 2) Objects, and untyped schemas that declare properties
        let declared = keywords::declared_type(node);
        let object_like = declared == Some("object") || (declared.is_none() && node.get("properties").is_some());
        if object_like {
            if node.get("properties").is_none() {
                if let Some(values @ Value::Object(_)) = node.get("additionalProperties") {
                    let inner = self.dispatch(session, &format!("{hint}Property"), values, context, None, trail)?;
                    return Ok(GeneratedType::MapType(Box::new(inner)));
                }
            }
            let preferred = keywords::non_empty_text(node, "title").unwrap_or_else(|| hint.to_string());
            let name = self.naming.class_name(&preferred);
            let name = session.classes.schedule(name, node.clone(), context, identity);
            return Ok(GeneratedType::TypeReference(name));
        }

        // 3) Arrays
        if declared == Some("array") {
            let element = match node.get("items") {
                Some(items @ Value::Object(_)) => {
                    self.dispatch(session, &singular(hint), items, context, None, trail)?
                }
                _ => GeneratedType::any(),
            };
            return Ok(GeneratedType::Collection(Box::new(element)));
        }

        // 4) Scalars
        Ok(match declared {
            Some(name @ ("string" | "integer" | "number" | "boolean")) => GeneratedType::primitive(name),
            _ => GeneratedType::any(),
        })
    }
}

impl TypeDispatch for SchemaTypeDispatch {
    fn type_for(
        &self,
        session: &mut Session,
        property_name: &str,
        node: &SchemaNode,
        enclosing: SchemaId,
    ) -> Result<GeneratedType, CompileError> {
        self.dispatch(session, property_name, node, enclosing, None, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::fragment::FragmentResolver;
    use crate::store::{DocumentId, InMemoryDocuments, SchemaStore};
    use serde_json::json;

    fn session(tree: Value) -> (Session, SchemaId) {
        let docs = InMemoryDocuments::new().with("main.json", tree);
        let mut session = Session::new(SchemaStore::new(docs, FragmentResolver::default()));
        let root = session.store.root(&DocumentId::new("main.json")).unwrap();
        (session, root)
    }

    fn dispatch() -> SchemaTypeDispatch {
        SchemaTypeDispatch::new(NameHelper::new(&GenerationConfig::default()))
    }

    #[test]
    fn scalars_and_collections() {
        let (mut s, root) = session(json!({}));
        let d = dispatch();
        let ty = |s: &mut Session, node: Value| d.type_for(s, "x", &node, root).unwrap();
        assert_eq!(ty(&mut s, json!({"type": "string"})), GeneratedType::primitive("string"));
        assert_eq!(ty(&mut s, json!({"type": ["null", "integer"]})), GeneratedType::primitive("integer"));
        assert_eq!(ty(&mut s, json!({})), GeneratedType::any());
        assert_eq!(
            ty(&mut s, json!({"type": "array", "items": {"type": "boolean"}})),
            GeneratedType::Collection(Box::new(GeneratedType::primitive("boolean")))
        );
        assert_eq!(
            ty(&mut s, json!({"type": "array"})),
            GeneratedType::Collection(Box::new(GeneratedType::any()))
        );
        assert_eq!(
            ty(&mut s, json!({"type": "object", "additionalProperties": {"type": "number"}})),
            GeneratedType::MapType(Box::new(GeneratedType::primitive("number")))
        );
    }

    #[test]
    fn objects_are_scheduled_as_classes() {
        let (mut s, root) = session(json!({}));
        let d = dispatch();
        let node = json!({"type": "object", "properties": {"street": {"type": "string"}}});
        let ty = d.type_for(&mut s, "billing-address", &node, root).unwrap();
        assert_eq!(ty, GeneratedType::TypeReference("BillingAddress".into()));

        let items = json!({"type": "array", "items": {"properties": {"id": {}}}});
        let ty = d.type_for(&mut s, "things", &items, root).unwrap();
        assert_eq!(ty.referenced_class(), Some("Thing"));

        let titled = json!({"title": "Billing Address", "type": "object"});
        let ty = d.type_for(&mut s, "other", &titled, root).unwrap();
        assert_eq!(ty, GeneratedType::TypeReference("BillingAddress_1".into()));
        assert_eq!(s.classes.pending_len(), 3);
    }

    #[test]
    fn shared_definitions_become_one_class() {
        let (mut s, root) = session(json!({
            "definitions": {"point": {"type": "object", "properties": {"x": {"type": "number"}}}},
        }));
        let d = dispatch();
        let a = d.type_for(&mut s, "from", &json!({"$ref": "#/definitions/point"}), root).unwrap();
        let b = d.type_for(&mut s, "to", &json!({"$ref": "#/definitions/point"}), root).unwrap();
        assert_eq!(a, GeneratedType::TypeReference("Point".into()));
        assert_eq!(a, b);
        assert_eq!(s.classes.pending_len(), 1);
    }

    #[test]
    fn ref_chains_follow_to_the_terminal_type() {
        let (mut s, root) = session(json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/c"},
                "c": {"type": "integer"},
            },
        }));
        let ty = dispatch().type_for(&mut s, "n", &json!({"$ref": "#/definitions/a"}), root).unwrap();
        assert_eq!(ty, GeneratedType::primitive("integer"));
    }

    #[test]
    fn ref_loops_without_a_class_are_cyclic() {
        let (mut s, root) = session(json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"},
                "list": {"type": "array", "items": {"$ref": "#/definitions/list"}},
            },
        }));
        let d = dispatch();
        let err = d.type_for(&mut s, "n", &json!({"$ref": "#/definitions/a"}), root).unwrap_err();
        assert!(matches!(err.resolution(), Some(ResolutionError::CyclicReference { .. })));
        let err = d.type_for(&mut s, "l", &json!({"$ref": "#/definitions/list"}), root).unwrap_err();
        assert!(matches!(err.resolution(), Some(ResolutionError::CyclicReference { .. })));
    }
}
