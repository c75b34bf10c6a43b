//! Built-in FEEL types

/// The FEEL built-in type kinds a model element can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInType {
    /// Any value; also the placeholder for undeclared types
    Unknown,
    Number,
    String,
    Boolean,
    Date,
    Time,
    DateTime,
    Duration,
    List,
    Context,
    Range,
    Function,
}

impl BuiltInType {
    /// Map a declared type name to its kind. Both the spaced FEEL names and
    /// the camel-case aliases used by existing documents are accepted.
    pub fn from_name(name: &str) -> Option<BuiltInType> {
        match name {
            "number" => Some(BuiltInType::Number),
            "string" => Some(BuiltInType::String),
            "boolean" => Some(BuiltInType::Boolean),
            "date" => Some(BuiltInType::Date),
            "time" => Some(BuiltInType::Time),
            "date and time" | "dateTime" => Some(BuiltInType::DateTime),
            "duration"
            | "days and time duration"
            | "dayTimeDuration"
            | "years and months duration"
            | "yearMonthDuration" => Some(BuiltInType::Duration),
            "list" => Some(BuiltInType::List),
            "context" => Some(BuiltInType::Context),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltInType::Unknown => "unknown",
            BuiltInType::Number => "number",
            BuiltInType::String => "string",
            BuiltInType::Boolean => "boolean",
            BuiltInType::Date => "date",
            BuiltInType::Time => "time",
            BuiltInType::DateTime => "date and time",
            BuiltInType::Duration => "duration",
            BuiltInType::List => "list",
            BuiltInType::Context => "context",
            BuiltInType::Range => "range",
            BuiltInType::Function => "function",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_spaced_and_alias() {
        assert_eq!(BuiltInType::from_name("number"), Some(BuiltInType::Number));
        assert_eq!(
            BuiltInType::from_name("date and time"),
            Some(BuiltInType::DateTime)
        );
        assert_eq!(
            BuiltInType::from_name("dateTime"),
            Some(BuiltInType::DateTime)
        );
        assert_eq!(
            BuiltInType::from_name("years and months duration"),
            Some(BuiltInType::Duration)
        );
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert_eq!(BuiltInType::from_name("integer"), None);
        assert_eq!(BuiltInType::from_name(""), None);
    }
}
