//! Model evaluation
//!
//! [`DmnRuntime`] evaluates a compiled model against caller-supplied
//! inputs. Required decisions resolve depth-first with memoization, so a
//! decision shared by several dependents computes once per run. Every
//! decision evaluates in a fresh context; a failure is recorded against
//! the decision that raised it and unrelated decisions still produce
//! results.

use std::collections::{BTreeMap, HashMap, HashSet};

use decima_feel::{EvaluationContext, Feel, Value};
use log::{debug, warn};

use crate::ast::{DecisionNode, DependencyRef};
use crate::error::EvaluationError;
use crate::message::Message;
use crate::model::DmnModel;

/// Caller-supplied input values, keyed by input-data variable name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DmnContext {
    values: BTreeMap<String, Value>,
}

impl DmnContext {
    pub fn new() -> Self {
        DmnContext::default()
    }

    /// Build a context from a JSON object, one entry per field. Anything
    /// other than an object yields an empty context.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut context = DmnContext::new();
        if let serde_json::Value::Object(fields) = json {
            for (name, value) in fields {
                context.set(name, Value::from_json(value));
            }
        }
        context
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Builder-style [`set`](DmnContext::set).
    pub fn with_value(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

/// Outcome of a single decision within a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionResult {
    pub decision_id: String,
    pub decision_name: String,
    pub result: Result<Value, EvaluationError>,
}

/// Everything one run produced: per-decision outcomes in evaluation
/// order, run-scoped messages, and the input context with every
/// successful decision value bound beside the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct DmnResult {
    pub decision_results: Vec<DecisionResult>,
    pub messages: Vec<Message>,
    pub context: DmnContext,
}

impl DmnResult {
    pub fn decision_result(&self, name: &str) -> Option<&DecisionResult> {
        self.decision_results
            .iter()
            .find(|r| r.decision_name == name)
    }

    /// The value of a named decision, if it evaluated successfully.
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.decision_result(name) {
            Some(DecisionResult {
                result: Ok(value), ..
            }) => Some(value),
            _ => None,
        }
    }
}

/// Evaluates compiled models. Stateless; one instance serves any number
/// of threads and models.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmnRuntime {
    feel: Feel,
}

impl DmnRuntime {
    pub fn new() -> Self {
        DmnRuntime { feel: Feel::new() }
    }

    /// Evaluate every decision in the model, in declaration order.
    pub fn evaluate_all(&self, model: &DmnModel, input: &DmnContext) -> DmnResult {
        let mut evaluation = Evaluation::new(&self.feel, model, input);
        for decision in model.decisions() {
            evaluation.record(&decision.id);
        }
        evaluation.finish()
    }

    /// Evaluate one decision by name, plus whatever it requires. Required
    /// decisions contribute to the result context but are not listed as
    /// results of their own.
    pub fn evaluate_decision(
        &self,
        model: &DmnModel,
        name: &str,
        input: &DmnContext,
    ) -> DmnResult {
        let mut evaluation = Evaluation::new(&self.feel, model, input);
        match model.decision_by_name(name) {
            Some(decision) => evaluation.record(&decision.id),
            None => evaluation.messages.push(Message::error(
                format!("no decision named '{name}' in model '{}'", model.name),
                None,
            )),
        }
        evaluation.finish()
    }

    /// [`evaluate_decision`](DmnRuntime::evaluate_decision), addressing the
    /// decision by element id instead of name.
    pub fn evaluate_decision_by_id(
        &self,
        model: &DmnModel,
        id: &str,
        input: &DmnContext,
    ) -> DmnResult {
        let mut evaluation = Evaluation::new(&self.feel, model, input);
        match model.decision_by_id(id) {
            Some(decision) => evaluation.record(&decision.id),
            None => evaluation.messages.push(Message::error(
                format!("no decision with id '{id}' in model '{}'", model.name),
                Some(id),
            )),
        }
        evaluation.finish()
    }
}

/// One run: memoized depth-first resolution over the requirement graph.
struct Evaluation<'a> {
    feel: &'a Feel,
    model: &'a DmnModel,
    input: &'a DmnContext,
    memo: HashMap<String, Result<Value, EvaluationError>>,
    in_progress: HashSet<String>,
    results: Vec<DecisionResult>,
    messages: Vec<Message>,
    missing_reported: HashSet<String>,
}

impl<'a> Evaluation<'a> {
    fn new(feel: &'a Feel, model: &'a DmnModel, input: &'a DmnContext) -> Self {
        Evaluation {
            feel,
            model,
            input,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            results: Vec::new(),
            messages: Vec::new(),
            missing_reported: HashSet::new(),
        }
    }

    /// Evaluate (or reuse) the decision and append it to the reported
    /// results.
    fn record(&mut self, id: &str) {
        let Some(decision) = self.model.decision_by_id(id) else {
            return;
        };
        let result = self.decision_value(decision);
        self.results.push(DecisionResult {
            decision_id: decision.id.clone(),
            decision_name: decision.name.clone(),
            result,
        });
    }

    fn decision_value(&mut self, decision: &'a DecisionNode) -> Result<Value, EvaluationError> {
        if let Some(known) = self.memo.get(&decision.id) {
            return known.clone();
        }
        if !self.in_progress.insert(decision.id.clone()) {
            return Err(EvaluationError::RequirementCycle {
                decision: decision.name.clone(),
            });
        }
        let result = self.compute(decision);
        self.in_progress.remove(&decision.id);
        self.memo.insert(decision.id.clone(), result.clone());
        result
    }

    fn compute(&mut self, decision: &'a DecisionNode) -> Result<Value, EvaluationError> {
        let mut bindings = Vec::with_capacity(decision.dependencies.len());
        for dependency in &decision.dependencies {
            let value = match &dependency.target {
                DependencyRef::Input(_) => match self.input.get(&dependency.name) {
                    Some(value) => value.clone(),
                    None => {
                        self.report_missing_input(&dependency.name);
                        Value::Null
                    }
                },
                DependencyRef::Decision(required_id) => {
                    let required = self
                        .model
                        .decision_by_id(required_id)
                        .ok_or_else(|| EvaluationError::DependencyFailed {
                            decision: decision.name.clone(),
                            dependency: dependency.name.clone(),
                        })?;
                    self.decision_value(required).map_err(|_| {
                        EvaluationError::DependencyFailed {
                            decision: decision.name.clone(),
                            dependency: dependency.name.clone(),
                        }
                    })?
                }
            };
            bindings.push((dependency.name.clone(), value));
        }

        let Some(evaluator) = &decision.evaluator else {
            return Err(EvaluationError::NoEvaluator {
                decision: decision.name.clone(),
            });
        };

        let mut ctx = EvaluationContext::new();
        for (name, value) in bindings {
            ctx.set_value(&name, value);
        }
        debug!("evaluating decision '{}'", decision.name);
        evaluator.evaluate(self.feel, &mut ctx)
    }

    fn report_missing_input(&mut self, name: &str) {
        if self.missing_reported.insert(name.to_string()) {
            warn!("no value provided for input data '{name}'");
            self.messages.push(Message::warn(
                format!("no value provided for input data '{name}'"),
                None,
            ));
        }
    }

    fn finish(self) -> DmnResult {
        // every computed decision lands in the context, including ones
        // evaluated only as requirements of the requested decision
        let mut context = self.input.clone();
        for (id, result) in &self.memo {
            if let (Some(decision), Ok(value)) = (self.model.decision_by_id(id), result) {
                context.set(&decision.name, value.clone());
            }
        }
        DmnResult {
            decision_results: self.results,
            messages: self.messages,
            context,
        }
    }
}
