//! Error types for the FEEL front end and decision tables

use thiserror::Error;

/// Failure to turn expression text into an AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeelError {
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },
}

impl FeelError {
    pub fn syntax(position: usize, message: impl Into<String>) -> FeelError {
        FeelError::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Failure while evaluating a decision table.
///
/// These are genuine faults in the table or its inputs; ordinary "no rule
/// matched" situations produce values, not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecisionTableError {
    /// UNIQUE or ANY hit policy violated by rules with diverging outputs
    #[error("decision table '{table}': rules {rules:?} match with different outputs under the {policy} hit policy")]
    Overlap {
        table: String,
        policy: String,
        rules: Vec<usize>,
    },
    /// SUM, MIN or MAX aggregation ran into a non-numeric output
    #[error("decision table '{table}': {aggregator} aggregation over non-numeric output {value}")]
    NonNumericAggregate {
        table: String,
        aggregator: String,
        value: String,
    },
    /// An input value fell outside the clause's allowed input values
    #[error("decision table '{table}': input '{input}' value {value} does not match any allowed value")]
    InputMismatch {
        table: String,
        input: String,
        value: String,
    },
    /// An output entry failed to parse when its rule was selected
    #[error("decision table '{table}': output entry of rule {rule} is invalid: {source}")]
    OutputEntry {
        table: String,
        rule: usize,
        #[source]
        source: FeelError,
    },
}

pub type Result<T> = std::result::Result<T, FeelError>;
