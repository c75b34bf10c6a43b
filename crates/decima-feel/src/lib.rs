//! decima FEEL - expression language runtime for the decima decision engine
//!
//! This crate provides the expression side of decima:
//! - Runtime values: exact decimal numbers, temporal values, lists,
//!   contexts, ranges, unary tests and functions
//! - A tree-walking evaluator over scoped contexts seeded with the
//!   built-in function library
//! - A text front end for the supported FEEL subset, with a dedicated
//!   parse mode for decision-table cells
//! - Executable decision tables with the seven standard hit policies
//!
//! Evaluation is null-soft: failures inside expressions produce null, and
//! three-valued logic decides what matches. Hard errors are reserved for
//! syntax problems and decision-table faults.

pub mod ast;
pub mod context;
pub mod dtable;
pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod range;
pub mod types;
pub mod value;

pub use ast::{satisfies, BinaryOp, Expression};
pub use context::{EvaluationContext, ExecutionFrame};
pub use dtable::{Aggregator, DecisionTable, DtInputClause, DtOutputClause, DtRule, HitPolicy};
pub use engine::{is_valid_variable_name, CompiledExpression, CompilerContext, Feel};
pub use error::{DecisionTableError, FeelError};
pub use range::{RangeBoundary, RangeValue};
pub use types::BuiltInType;
pub use value::{compare, FunctionValue, Truth, UnaryTestOp, UnaryTestValue, Value};
