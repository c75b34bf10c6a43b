//! Compiled model nodes
//!
//! The compiler turns marshalled DRG elements into these nodes. They are
//! immutable after compilation and shared freely; the runtime walks them
//! without ever mutating the model.

use std::sync::Arc;

use decima_feel::{DecisionTable, EvaluationContext, Feel, Value};

use crate::error::EvaluationError;
use crate::types::DmnType;

/// A compiled item definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefNode {
    pub id: Option<String>,
    pub name: String,
    pub is_collection: bool,
    /// Absent when the definition's type reference failed to resolve
    pub dmn_type: Option<Arc<DmnType>>,
}

/// A compiled input data element.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDataNode {
    pub id: String,
    /// The variable name callers bind values to
    pub name: String,
    pub dmn_type: Option<Arc<DmnType>>,
}

/// A compiled decision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub id: String,
    pub name: String,
    pub dmn_type: Option<Arc<DmnType>>,
    /// Requirement edges in declaration order
    pub dependencies: Vec<Dependency>,
    /// Absent when compilation failed; such decisions error at evaluation
    pub evaluator: Option<DecisionEvaluator>,
}

impl DecisionNode {
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|dep| dep.name == name)
    }

    /// Dependency names in declaration order; these become the parameter
    /// names of the decision's expression.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies.iter().map(|dep| dep.name.clone()).collect()
    }
}

/// An edge to a required element, keyed by that element's variable name.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub name: String,
    pub target: DependencyRef,
}

/// Reference to the required node, by kind and element id.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyRef {
    Input(String),
    Decision(String),
}

impl DependencyRef {
    pub fn id(&self) -> &str {
        match self {
            DependencyRef::Input(id) => id,
            DependencyRef::Decision(id) => id,
        }
    }
}

/// The executable form of a decision's expression.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionEvaluator {
    /// A compiled literal FEEL expression
    Literal(decima_feel::CompiledExpression),
    /// An executable decision table
    Table(DecisionTable),
}

impl DecisionEvaluator {
    /// Evaluate with the decision's dependency values already bound in the
    /// context. A table pulls its parameters back out of the context by
    /// the names they were bound under.
    pub fn evaluate(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
    ) -> Result<Value, EvaluationError> {
        match self {
            DecisionEvaluator::Literal(expression) => Ok(expression.evaluate(ctx)),
            DecisionEvaluator::Table(table) => {
                let params: Vec<Value> = table
                    .parameter_names
                    .iter()
                    .map(|name| ctx.value(name).cloned().unwrap_or(Value::Null))
                    .collect();
                table
                    .evaluate(feel, ctx, &params)
                    .map_err(EvaluationError::from)
            }
        }
    }
}
