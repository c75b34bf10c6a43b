//! Compile and evaluation diagnostics
//!
//! Problems found while compiling a document are collected as messages on
//! the model instead of failing the compilation, so one bad decision never
//! hides the rest of the document. The runtime appends its own messages to
//! evaluation results the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A diagnostic tied to the document element that caused it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
    /// Id of the element the message is about, when one exists
    pub source_id: Option<String>,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>, source_id: Option<&str>) -> Self {
        Message {
            severity,
            text: text.into(),
            source_id: source_id.map(str::to_string),
        }
    }

    pub fn error(text: impl Into<String>, source_id: Option<&str>) -> Self {
        Message::new(Severity::Error, text, source_id)
    }

    pub fn warn(text: impl Into<String>, source_id: Option<&str>) -> Self {
        Message::new(Severity::Warn, text, source_id)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_id {
            Some(id) => write!(f, "[{}] {} ({})", self.severity, self.text, id),
            None => write!(f, "[{}] {}", self.severity, self.text),
        }
    }
}
