//! Scoped evaluation contexts
//!
//! Variable resolution walks a stack of execution frames from the innermost
//! scope outwards, then falls through to the shared built-in function table,
//! which acts as the read-only root frame of every context. Contexts are
//! cheap to create; each top-level evaluation gets a fresh one.

use std::collections::HashMap;

use crate::functions;
use crate::value::Value;

/// One lexical binding frame.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFrame {
    variables: HashMap<String, Value>,
}

impl ExecutionFrame {
    pub fn new() -> Self {
        ExecutionFrame::default()
    }

    pub fn set_value(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }
}

/// A chain of nested variable scopes.
///
/// The global frame is created with the context and never popped; nested
/// frames come and go with `enter_frame`/`exit_frame`. Bindings shadow
/// outer frames and the built-ins by simple name precedence.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    global: ExecutionFrame,
    frames: Vec<ExecutionFrame>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        EvaluationContext::default()
    }

    /// Enter a nested scope.
    pub fn enter_frame(&mut self) {
        self.frames.push(ExecutionFrame::new());
    }

    /// Leave the current scope. The global frame survives unbalanced exits.
    pub fn exit_frame(&mut self) {
        self.frames.pop();
    }

    /// Bind a name in the innermost scope.
    pub fn set_value(&mut self, name: &str, value: Value) {
        self.frames
            .last_mut()
            .unwrap_or(&mut self.global)
            .set_value(name, value);
    }

    /// Resolve a name through the scope chain, ending at the built-in
    /// function table.
    pub fn value(&self, name: &str) -> Option<&Value> {
        for frame in self.frames.iter().rev() {
            if let Some(value) = frame.value(name) {
                return Some(value);
            }
        }
        if let Some(value) = self.global.value(name) {
            return Some(value);
        }
        functions::lookup(name)
    }

    /// Number of frames including the global one.
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }
}
