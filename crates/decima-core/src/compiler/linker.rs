//! DRG element linking
//!
//! Two passes over the document's DRG elements: the first creates a typed
//! node per element, the second resolves requirement edges by element id.
//! Broken references become error messages and the edge is dropped; the
//! dependent decision still compiles against its remaining dependencies.
//! A final walk rejects requirement cycles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use decima_feel::is_valid_variable_name;
use log::error;

use super::types::TypeResolver;
use crate::ast::{DecisionNode, Dependency, DependencyRef, InputDataNode};
use crate::document::{Definitions, DrgElement};
use crate::message::Severity;
use crate::model::DmnModel;

pub struct ModelLinker;

impl ModelLinker {
    pub fn new() -> Self {
        ModelLinker
    }

    pub fn process_drg_elements(&self, model: &mut DmnModel, definitions: &Definitions) {
        self.create_nodes(model, definitions);
        self.link_requirements(model, definitions);
        self.detect_requirement_cycles(model);
    }

    fn create_nodes(&self, model: &mut DmnModel, definitions: &Definitions) {
        for element in &definitions.drg_elements {
            match element {
                DrgElement::InputData(input) => {
                    let variable_name = input.variable.as_ref().map(|v| v.name.as_str());
                    match variable_name {
                        Some(name) if is_valid_variable_name(name) => {}
                        _ => {
                            let shown = variable_name.unwrap_or("null");
                            error!(
                                "invalid variable name '{shown}' in input data '{}'",
                                input.id
                            );
                            model.add_message(
                                Severity::Error,
                                format!(
                                    "invalid variable name '{shown}' in input data '{}'",
                                    input.id
                                ),
                                Some(&input.id),
                            );
                        }
                    }
                    let type_ref = input.variable.as_ref().and_then(|v| v.type_ref.as_deref());
                    let dmn_type = TypeResolver::resolve(
                        model,
                        definitions,
                        variable_name,
                        Some(&input.id),
                        type_ref,
                    );
                    if let (Some(type_ref), Some(dmn_type)) = (type_ref, &dmn_type) {
                        model.register_type(type_ref, Arc::clone(dmn_type));
                    }
                    model.add_input(InputDataNode {
                        id: input.id.clone(),
                        name: variable_name.unwrap_or(&input.id).to_string(),
                        dmn_type,
                    });
                }
                DrgElement::Decision(decision) => {
                    let type_ref = decision
                        .variable
                        .as_ref()
                        .and_then(|v| v.type_ref.as_deref());
                    let dmn_type = TypeResolver::resolve(
                        model,
                        definitions,
                        Some(&decision.name),
                        Some(&decision.id),
                        type_ref,
                    );
                    model.add_decision(DecisionNode {
                        id: decision.id.clone(),
                        name: decision.name.clone(),
                        dmn_type,
                        dependencies: Vec::new(),
                        evaluator: None,
                    });
                }
            }
        }
    }

    fn link_requirements(&self, model: &mut DmnModel, definitions: &Definitions) {
        // resolve every edge against the finished node set before mutating
        let mut linked: Vec<(String, Vec<Dependency>)> = Vec::new();
        let mut problems: Vec<(String, Option<String>)> = Vec::new();

        for element in &definitions.drg_elements {
            let DrgElement::Decision(decision) = element else {
                continue;
            };
            let mut dependencies = Vec::new();
            for requirement in &decision.information_requirements {
                if let Some(reference) = &requirement.required_input {
                    let id = reference.target_id();
                    match model.input_by_id(id) {
                        Some(input) => dependencies.push(Dependency {
                            name: input.name.clone(),
                            target: DependencyRef::Input(input.id.clone()),
                        }),
                        None => problems.push((
                            format!(
                                "required input '{id}' not found for decision '{}'",
                                decision.id
                            ),
                            Some(decision.id.clone()),
                        )),
                    }
                }
                if let Some(reference) = &requirement.required_decision {
                    let id = reference.target_id();
                    match model.decision_by_id(id) {
                        Some(required) => dependencies.push(Dependency {
                            name: required.name.clone(),
                            target: DependencyRef::Decision(required.id.clone()),
                        }),
                        None => problems.push((
                            format!(
                                "required decision '{id}' not found for decision '{}'",
                                decision.id
                            ),
                            Some(decision.id.clone()),
                        )),
                    }
                }
            }
            linked.push((decision.id.clone(), dependencies));
        }

        for (text, source_id) in problems {
            error!("{text}");
            model.add_message(Severity::Error, text, source_id.as_deref());
        }
        for (id, dependencies) in linked {
            if let Some(node) = model.decision_mut(&id) {
                node.dependencies = dependencies;
            }
        }
    }

    /// Depth-first walk over decision-to-decision edges. Every decision on
    /// a cycle is marked and reported; decisions merely downstream of a
    /// cycle stay compilable and fail at evaluation instead.
    fn detect_requirement_cycles(&self, model: &mut DmnModel) {
        let graph: HashMap<String, Vec<String>> = model
            .decisions()
            .iter()
            .map(|decision| {
                let required: Vec<String> = decision
                    .dependencies
                    .iter()
                    .filter_map(|dep| match &dep.target {
                        DependencyRef::Decision(id) => Some(id.clone()),
                        DependencyRef::Input(_) => None,
                    })
                    .collect();
                (decision.id.clone(), required)
            })
            .collect();

        let mut visited = HashSet::new();
        let mut stack = Vec::new();
        let mut cyclic = HashSet::new();
        for id in graph.keys() {
            visit(id, &graph, &mut visited, &mut stack, &mut cyclic);
        }

        for id in cyclic {
            error!("requirement cycle detected at decision '{id}'");
            model.add_message(
                Severity::Error,
                format!("decision '{id}' is part of a requirement cycle"),
                Some(&id),
            );
            model.mark_cyclic(&id);
        }
    }
}

fn visit(
    id: &str,
    graph: &HashMap<String, Vec<String>>,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
    cyclic: &mut HashSet<String>,
) {
    if let Some(position) = stack.iter().position(|entry| entry == id) {
        // back edge: everything from the first occurrence onwards cycles
        for entry in &stack[position..] {
            cyclic.insert(entry.clone());
        }
        return;
    }
    if !visited.insert(id.to_string()) {
        return;
    }
    stack.push(id.to_string());
    if let Some(required) = graph.get(id) {
        for next in required {
            visit(next, graph, visited, stack, cyclic);
        }
    }
    stack.pop();
}
