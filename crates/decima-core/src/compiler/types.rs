//! Type resolution and item-definition compilation

use std::sync::Arc;

use decima_feel::{BuiltInType, Feel};
use log::error;

use crate::ast::ItemDefNode;
use crate::document::{split_type_ref, Definitions, ItemDefinition, URI_FEEL};
use crate::message::Severity;
use crate::model::DmnModel;
use crate::types::{CompositeTypeDef, DmnType};

/// Resolves declared type references against the FEEL namespace and the
/// model's own item definitions.
pub struct TypeResolver;

impl TypeResolver {
    /// Resolve `type_ref` on behalf of the element named `element_name`.
    ///
    /// An absent reference resolves to the unknown type. Failures (unknown
    /// namespace, unknown built-in name, zero or several matching item
    /// definitions) log an error message on the model and return `None`;
    /// compilation of unrelated elements continues.
    pub fn resolve(
        model: &mut DmnModel,
        definitions: &Definitions,
        element_name: Option<&str>,
        element_id: Option<&str>,
        type_ref: Option<&str>,
    ) -> Option<Arc<DmnType>> {
        let Some(type_ref) = type_ref else {
            return Some(Arc::new(DmnType::unknown(element_name, element_id)));
        };

        let (prefix, local_name) = split_type_ref(type_ref);
        // an unprefixed reference names a type in the model's own namespace
        let namespace = match prefix {
            Some(prefix) => definitions.namespace_uri(prefix),
            None => Some(definitions.namespace.as_str()),
        };

        match namespace {
            Some(URI_FEEL) => match BuiltInType::from_name(local_name) {
                Some(base) => Some(Arc::new(DmnType::feel(element_name, element_id, base))),
                None => {
                    error!("unknown built-in type '{type_ref}'");
                    model.add_message(
                        Severity::Error,
                        format!("unknown built-in type '{type_ref}'"),
                        element_id,
                    );
                    None
                }
            },
            Some(ns) if ns == model.namespace => {
                let matches = model
                    .item_definitions()
                    .iter()
                    .filter(|node| node.name == local_name)
                    .count();
                match matches {
                    1 => model
                        .item_definition_by_name(local_name)
                        .and_then(|node| node.dmn_type.clone()),
                    0 => {
                        model.add_message(
                            Severity::Error,
                            format!("no type definition found for '{type_ref}'"),
                            element_id,
                        );
                        None
                    }
                    _ => {
                        model.add_message(
                            Severity::Error,
                            format!("multiple type definitions found for '{type_ref}'"),
                            element_id,
                        );
                        None
                    }
                }
            }
            _ => {
                model.add_message(
                    Severity::Error,
                    format!("unknown namespace for type reference '{type_ref}'"),
                    element_id,
                );
                None
            }
        }
    }
}

/// Compiles the document's item definitions into shared types, in
/// declaration order. A definition may reference any definition compiled
/// before it; forward references report as unresolved.
pub struct ItemDefinitionCompiler<'a> {
    feel: &'a Feel,
}

impl<'a> ItemDefinitionCompiler<'a> {
    pub fn new(feel: &'a Feel) -> Self {
        ItemDefinitionCompiler { feel }
    }

    pub fn process_item_definitions(&self, model: &mut DmnModel, definitions: &Definitions) {
        for item in &definitions.item_definitions {
            let dmn_type = self.build_type_def(model, definitions, item);
            model.add_item_definition(ItemDefNode {
                id: item.id.clone(),
                name: item.name.clone(),
                is_collection: item.is_collection,
                dmn_type,
            });
        }
    }

    /// Build the type for one definition: an aliased built-in or item
    /// definition when `type_ref` is present, a composite otherwise.
    fn build_type_def(
        &self,
        model: &mut DmnModel,
        definitions: &Definitions,
        item: &ItemDefinition,
    ) -> Option<Arc<DmnType>> {
        if let Some(type_ref) = item.type_ref.as_deref() {
            let resolved = TypeResolver::resolve(
                model,
                definitions,
                Some(&item.name),
                item.id.as_deref(),
                Some(type_ref),
            )?;
            let Some(allowed) = &item.allowed_values else {
                return Some(resolved);
            };
            return Some(self.constrain(model, item, resolved, &allowed.text));
        }

        // no reference: assemble a composite from the components
        let mut composite = CompositeTypeDef::new(Some(&item.name), item.id.as_deref());
        for component in &item.item_components {
            let Some(field_type) = self.build_type_def(model, definitions, component) else {
                // already reported; skip the broken field
                continue;
            };
            let replaced = composite.set_field(component.name.clone(), field_type);
            if replaced {
                model.add_message(
                    Severity::Warn,
                    format!(
                        "field '{}' declared more than once in item definition '{}'; the last declaration wins",
                        component.name, item.name
                    ),
                    item.id.as_deref(),
                );
            }
        }
        Some(Arc::new(DmnType::Composite(composite)))
    }

    /// Narrow a resolved type with the declared allowed values.
    fn constrain(
        &self,
        model: &mut DmnModel,
        item: &ItemDefinition,
        resolved: Arc<DmnType>,
        allowed_text: &str,
    ) -> Arc<DmnType> {
        let values = match self.feel.evaluate_unary_tests(allowed_text) {
            Ok(values) => values,
            Err(e) => {
                error!(
                    "allowed values of item definition '{}' failed to parse: {e}",
                    item.name
                );
                model.add_message(
                    Severity::Error,
                    format!(
                        "allowed values '{allowed_text}' of item definition '{}' are invalid: {e}",
                        item.name
                    ),
                    item.id.as_deref(),
                );
                return resolved;
            }
        };
        match resolved.as_ref() {
            DmnType::Feel(feel_type) => {
                let mut constrained = feel_type.clone();
                constrained.allowed_values = values;
                Arc::new(DmnType::Feel(constrained))
            }
            DmnType::Composite(_) => {
                model.add_message(
                    Severity::Error,
                    format!(
                        "allowed values are not applicable to the composite type referenced by '{}'",
                        item.name
                    ),
                    item.id.as_deref(),
                );
                resolved
            }
        }
    }
}
