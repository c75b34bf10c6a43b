//! Evaluation error types

use thiserror::Error;

use decima_feel::DecisionTableError;

/// Failure to evaluate a single decision. Errors are scoped to the
/// decision they occur in; other decisions in the same evaluation proceed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The decision carries no evaluator because its compilation failed
    #[error("decision '{decision}' has no evaluator; see the model's compile messages")]
    NoEvaluator { decision: String },
    /// A required decision failed, so this one cannot produce a
    /// trustworthy result
    #[error("decision '{decision}' not evaluated: required decision '{dependency}' failed")]
    DependencyFailed {
        decision: String,
        dependency: String,
    },
    /// Requirement recursion reached at evaluation time (possible only in
    /// hand-assembled models; the compiler rejects cyclic documents)
    #[error("decision '{decision}' is part of a requirement cycle")]
    RequirementCycle { decision: String },
    #[error(transparent)]
    Table(#[from] DecisionTableError),
}

pub type Result<T> = std::result::Result<T, EvaluationError>;
