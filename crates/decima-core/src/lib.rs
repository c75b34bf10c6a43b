//! decima core - decision-model semantic compiler and runtime
//!
//! This crate turns a marshalled decision document into an executable
//! model and evaluates it:
//! - A semantic compiler that resolves item-definition types, links
//!   requirement edges between DRG elements and compiles each decision's
//!   logic into an evaluator
//! - A compiled [`DmnModel`] that is immutable after compilation and safe
//!   to share across threads
//! - A [`DmnRuntime`] that resolves decision dependencies depth-first and
//!   evaluates each decision in its own context
//!
//! Compilation never fails as a whole: problems are accumulated as
//! [`Message`]s on the model and every compilable decision still gets an
//! evaluator. At evaluation time, a failure stays scoped to the decision
//! that raised it.

pub mod ast;
pub mod compiler;
pub mod document;
pub mod error;
pub mod message;
pub mod model;
pub mod runtime;
pub mod types;

pub use ast::{
    DecisionEvaluator, DecisionNode, Dependency, DependencyRef, InputDataNode, ItemDefNode,
};
pub use compiler::{
    DecisionCompiler, DecisionTableCompiler, DmnCompiler, ItemDefinitionCompiler, ModelLinker,
    TypeResolver, UnaryTestCompiler,
};
pub use document::{
    Decision, DecisionRuleDef, DecisionTableDef, Definitions, DrgElement, ElementReference,
    ExpressionDef, InformationItem, InformationRequirement, InputClauseDef, InputData,
    ItemDefinition, LiteralExpression, OutputClauseDef, UnaryTests, URI_FEEL,
};
pub use error::EvaluationError;
pub use message::{Message, Severity};
pub use model::DmnModel;
pub use runtime::{DecisionResult, DmnContext, DmnResult, DmnRuntime};
pub use types::{CompositeTypeDef, DmnType, FeelTypeDef};

// the engine types that appear in this crate's public signatures
pub use decima_feel::{BuiltInType, DecisionTable, DecisionTableError, HitPolicy, Value};
