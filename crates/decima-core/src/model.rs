//! The compiled model
//!
//! [`DmnModel`] is what the compiler produces: the compiled nodes, the
//! resolved type registry and the accumulated diagnostics. Mutation happens
//! only inside the compiler; once compilation returns, the model is
//! read-only and safe to share across threads behind an `Arc`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::ast::{DecisionEvaluator, DecisionNode, InputDataNode, ItemDefNode};
use crate::message::{Message, Severity};
use crate::types::DmnType;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DmnModel {
    pub namespace: String,
    pub name: String,
    item_definitions: Vec<ItemDefNode>,
    inputs: Vec<InputDataNode>,
    decisions: Vec<DecisionNode>,
    messages: Vec<Message>,
    type_registry: HashMap<String, Arc<DmnType>>,
    cyclic_decisions: HashSet<String>,
}

impl DmnModel {
    pub fn new(namespace: &str, name: &str) -> Self {
        DmnModel {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ..DmnModel::default()
        }
    }

    // ---- compiled content ----

    pub fn item_definitions(&self) -> &[ItemDefNode] {
        &self.item_definitions
    }

    pub fn item_definition_by_name(&self, name: &str) -> Option<&ItemDefNode> {
        self.item_definitions.iter().find(|node| node.name == name)
    }

    pub fn inputs(&self) -> &[InputDataNode] {
        &self.inputs
    }

    pub fn input_by_id(&self, id: &str) -> Option<&InputDataNode> {
        self.inputs.iter().find(|node| node.id == id)
    }

    pub fn input_by_name(&self, name: &str) -> Option<&InputDataNode> {
        self.inputs.iter().find(|node| node.name == name)
    }

    pub fn decisions(&self) -> &[DecisionNode] {
        &self.decisions
    }

    pub fn decision_by_id(&self, id: &str) -> Option<&DecisionNode> {
        self.decisions.iter().find(|node| node.id == id)
    }

    pub fn decision_by_name(&self, name: &str) -> Option<&DecisionNode> {
        self.decisions.iter().find(|node| node.name == name)
    }

    /// Types registered under the reference text that resolved to them.
    pub fn type_registry(&self) -> &HashMap<String, Arc<DmnType>> {
        &self.type_registry
    }

    /// Whether the decision sits on a requirement cycle found at compile
    /// time. Such decisions carry no evaluator.
    pub fn is_on_requirement_cycle(&self, id: &str) -> bool {
        self.cyclic_decisions.contains(id)
    }

    // ---- diagnostics ----

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(Message::is_error)
    }

    pub fn error_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.is_error())
    }

    // ---- compiler-side mutation ----

    pub(crate) fn add_item_definition(&mut self, node: ItemDefNode) {
        self.item_definitions.push(node);
    }

    pub(crate) fn add_input(&mut self, node: InputDataNode) {
        self.inputs.push(node);
    }

    pub(crate) fn add_decision(&mut self, node: DecisionNode) {
        self.decisions.push(node);
    }

    pub(crate) fn decision_mut(&mut self, id: &str) -> Option<&mut DecisionNode> {
        self.decisions.iter_mut().find(|node| node.id == id)
    }

    pub(crate) fn attach_evaluator(&mut self, id: &str, evaluator: DecisionEvaluator) {
        if let Some(decision) = self.decision_mut(id) {
            decision.evaluator = Some(evaluator);
        }
    }

    pub(crate) fn register_type(&mut self, type_ref: &str, dmn_type: Arc<DmnType>) {
        self.type_registry.insert(type_ref.to_string(), dmn_type);
    }

    pub(crate) fn mark_cyclic(&mut self, id: &str) {
        self.cyclic_decisions.insert(id.to_string());
    }

    pub(crate) fn add_message(
        &mut self,
        severity: Severity,
        text: impl Into<String>,
        source_id: Option<&str>,
    ) {
        self.messages.push(Message::new(severity, text, source_id));
    }
}
