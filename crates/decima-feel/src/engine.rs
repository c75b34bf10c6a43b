//! Engine facade
//!
//! [`Feel`] is the seam between the model compiler and expression
//! evaluation: compile text once into a reusable [`CompiledExpression`],
//! or parse and evaluate in one step. The facade holds no state, so one
//! instance can serve any number of threads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::ast::Expression;
use crate::context::EvaluationContext;
use crate::error::Result;
use crate::parser;
use crate::types::BuiltInType;
use crate::value::Value;

/// Declared input variables for expression compilation.
#[derive(Debug, Clone, Default)]
pub struct CompilerContext {
    inputs: HashMap<String, BuiltInType>,
}

impl CompilerContext {
    pub fn new() -> Self {
        CompilerContext::default()
    }

    /// Declare an input variable and its type.
    pub fn add_input_variable_type(&mut self, name: &str, input_type: BuiltInType) {
        self.inputs.insert(name.to_string(), input_type);
    }

    pub fn input_variable_type(&self, name: &str) -> Option<BuiltInType> {
        self.inputs.get(name).copied()
    }
}

/// A parsed expression, reusable across evaluations and threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Arc<Expression>,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext) -> Value {
        self.ast.evaluate(ctx)
    }
}

/// Stateless FEEL engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct Feel;

impl Feel {
    pub fn new() -> Self {
        Feel
    }

    /// Compile expression text into a reusable form. Declared inputs are
    /// accepted for the caller's bookkeeping; names resolve dynamically at
    /// evaluation time.
    pub fn compile(&self, text: &str, _ctx: &CompilerContext) -> Result<CompiledExpression> {
        let ast = parser::parse_expression(text)?;
        Ok(CompiledExpression {
            source: text.to_string(),
            ast: Arc::new(ast),
        })
    }

    /// Parse and evaluate in a fresh context.
    pub fn evaluate(&self, text: &str) -> Result<Value> {
        let mut ctx = EvaluationContext::new();
        self.evaluate_in(text, &mut ctx)
    }

    /// Parse and evaluate against an existing context.
    pub fn evaluate_in(&self, text: &str, ctx: &mut EvaluationContext) -> Result<Value> {
        Ok(parser::parse_expression(text)?.evaluate(ctx))
    }

    /// Evaluate cell text to a list of test values: unary tests stay
    /// unapplied, ranges and scalars evaluate to themselves. Blank text and
    /// the `-` marker produce an empty list (an irrelevant cell).
    pub fn evaluate_unary_tests(&self, text: &str) -> Result<Vec<Value>> {
        let mut ctx = EvaluationContext::new();
        Ok(parser::parse_unary_tests(text)?
            .iter()
            .map(|test| test.evaluate(&mut ctx))
            .collect())
    }
}

/// Whether a name can be used as a FEEL variable. The first character must
/// be a letter or underscore; later characters also allow digits, spaces
/// and apostrophes, matching the names DMN documents commonly declare.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == ' ' || c == '\'')
}
