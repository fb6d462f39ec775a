//! One schema property → one generated member.
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};

use tracing::trace;

use super::{constraints, Session};
use crate::annotate::Annotator;
use crate::config::GenerationConfig;
use crate::error::{CompileError, ConfigurationError, ResolutionError};
use crate::ir::{Accessor, AccessorKind, BuilderMethod, GeneratedClass, GeneratedProperty, Metadata, Visibility};
use crate::keywords::{self, SchemaNode, LOCAL_ID};
use crate::lower::TypeDispatch;
use crate::naming::NameHelper;
use crate::store::{SchemaId, SchemaStore};

pub struct PropertyCompiler<'a> {
    config: &'a GenerationConfig,
    naming: &'a NameHelper,
    dispatch: &'a dyn TypeDispatch,
    annotator: &'a dyn Annotator,
}

impl<'a> PropertyCompiler<'a> {
    pub fn new(
        config: &'a GenerationConfig,
        naming: &'a NameHelper,
        dispatch: &'a dyn TypeDispatch,
        annotator: &'a dyn Annotator,
    ) -> Self {
        Self { config, naming, dispatch, annotator }
    }

    /// Extend `class` with the member for `property_name`.
    pub fn apply(
        &self,
        session: &mut Session,
        property_name: &str,
        node: &SchemaNode,
        mut class: GeneratedClass,
        enclosing: SchemaId,
    ) -> Result<GeneratedClass, CompileError> {
        // 1) Name
        let target_name = self.naming.property_name(property_name)?;
        if class.has_member(&target_name) {
            return Err(ConfigurationError::DuplicateMember { class: class.name.clone(), name: target_name }.into());
        }

        // 2) Type
        let ty = self.dispatch.type_for(session, property_name, node, enclosing)?;

        // 3) Indirection
        let resolved = resolve_refs(&mut session.store, node, enclosing)?;

        // 4) Visibility
        let visibility = if self.config.include_accessors { Visibility::Private } else { Visibility::Public };
        let mut property = GeneratedProperty::new(property_name, target_name, ty, visibility);
        property.immutable = property_name == LOCAL_ID;

        // 5) Field metadata
        let core = core_metadata(&resolved);
        property.metadata.extend(core.iter().cloned());
        self.annotator.property_field(&mut property, &class, property_name, &resolved);

        if self.config.include_accessors {
            let doc = keywords::non_empty_text(&resolved, "description")
                .unwrap_or_else(|| format!("The {property_name}"));

            let mut getter = Accessor::new(
                AccessorKind::Getter,
                self.naming.getter_name(property_name, &property.ty)?,
                doc.clone(),
            );
            getter.metadata = core.clone();
            self.annotator.property_getter(&mut getter, property_name);
            property.getter = Some(getter);

            let mut setter = Accessor::new(AccessorKind::Setter, self.naming.setter_name(property_name)?, doc);
            setter.metadata = core;
            self.annotator.property_setter(&mut setter, property_name);
            property.setter = Some(setter);
        }

        // 6) Builder
        if self.config.generate_builders {
            property.builder = Some(BuilderMethod {
                name: self.naming.builder_name(&property.target_name),
                parameter: property.ty.clone(),
                returns: class.name.clone(),
            });
        }

        // 7) & 8) Constraints
        constraints::apply(self.config, &mut property, &resolved);

        trace!(class = %class.name, member = %property.target_name, ty = %property.ty, "compiled member");
        class.add_property(property)?;
        Ok(class)
    }
}

/// Follow `$ref` (on the node or its `items`) until a node without one is
/// reached. Each hop resolves against the schema the previous hop landed in.
pub fn resolve_refs<'n>(
    store: &mut SchemaStore,
    node: &'n SchemaNode,
    enclosing: SchemaId,
) -> Result<Cow<'n, SchemaNode>, ResolutionError> {
    let mut current = Cow::Borrowed(node);
    let mut context = enclosing;
    let mut visited = HashSet::new();
    while let Some(reference) = keywords::indirection_of(&current) {
        let target = store.create(context, reference)?;
        if !visited.insert(target) {
            return Err(ResolutionError::CyclicReference { reference: store[target].reference.clone() });
        }
        current = Cow::Owned(store[target].content.clone());
        context = target;
    }
    Ok(current)
}

/// Title, description and draft-03 boolean `required`.
fn core_metadata(node: &SchemaNode) -> BTreeSet<Metadata> {
    let mut metadata = BTreeSet::new();
    if let Some(title) = keywords::non_empty_text(node, "title") {
        metadata.insert(Metadata::Title(title));
    }
    if let Some(description) = keywords::non_empty_text(node, "description") {
        metadata.insert(Metadata::Description(description));
    }
    if let Some(required) = node.get("required").and_then(|r| r.as_bool()) {
        metadata.insert(Metadata::Required(required));
    }
    metadata
}
