//! Runtime values for FEEL evaluation
//!
//! Every expression evaluates to a [`Value`]. Numbers are exact decimals,
//! temporal values use chrono's naive types, and the language-level values
//! (ranges, unary tests, functions) are first-class so they can flow through
//! contexts and decision-table cells like any other value.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::ast::Expression;
use crate::range::RangeValue;

/// A FEEL runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(Decimal),
    String(String),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Days-and-time duration with second precision
    DaysDuration(Duration),
    /// Years-and-months duration stored as a total month count
    YearsDuration(i64),
    List(Vec<Value>),
    Context(BTreeMap<String, Value>),
    Range(Arc<RangeValue>),
    UnaryTest(UnaryTestValue),
    Function(FunctionValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date and time",
            Value::DaysDuration(_) => "days and time duration",
            Value::YearsDuration(_) => "years and months duration",
            Value::List(_) => "list",
            Value::Context(_) => "context",
            Value::Range(_) => "range",
            Value::UnaryTest(_) => "unary test",
            Value::Function(_) => "function",
        }
    }

    /// Convert a JSON value to a FEEL value. Integers stay exact; other
    /// numbers go through the closest decimal representation.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Number(Decimal::from(i))
                } else if let Some(u) = n.as_u64() {
                    Value::Number(Decimal::from(u))
                } else {
                    n.as_f64()
                        .and_then(Decimal::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(fields) => Value::Context(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a data value to JSON. Language-level values (ranges, tests,
    /// functions) and temporal values have no JSON equivalent and map to
    /// their string form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Number(n) => n
                .to_f64()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Context(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::DaysDuration(d) => write!(f, "duration of {}s", d.num_seconds()),
            Value::YearsDuration(months) => write!(f, "duration of {months} months"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Context(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Range(r) => write!(f, "{r}"),
            Value::UnaryTest(t) => write!(f, "{t}"),
            Value::Function(func) => write!(f, "function {}", func.name),
        }
    }
}

/// Three-valued logical outcome used by comparisons, membership tests and
/// rule matching. `Unknown` arises when operands cannot be ordered; only
/// `True` selects a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn is_true(self) -> bool {
        matches!(self, Truth::True)
    }

    /// Kleene conjunction: false dominates, unknown absorbs the rest.
    pub fn and(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::False, _) | (_, Truth::False) => Truth::False,
            (Truth::True, Truth::True) => Truth::True,
            _ => Truth::Unknown,
        }
    }

    /// Kleene disjunction: true dominates.
    pub fn or(self, other: Truth) -> Truth {
        match (self, other) {
            (Truth::True, _) | (_, Truth::True) => Truth::True,
            (Truth::False, Truth::False) => Truth::False,
            _ => Truth::Unknown,
        }
    }

    pub fn negate(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    /// Unknown collapses to null, the two known outcomes to booleans.
    pub fn to_value(self) -> Value {
        match self {
            Truth::True => Value::Boolean(true),
            Truth::False => Value::Boolean(false),
            Truth::Unknown => Value::Null,
        }
    }

    /// Read a value as a logical operand: booleans map to their truth,
    /// everything else (including null) is unknown.
    pub fn of(value: &Value) -> Truth {
        match value {
            Value::Boolean(true) => Truth::True,
            Value::Boolean(false) => Truth::False,
            _ => Truth::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(b: bool) -> Truth {
        if b {
            Truth::True
        } else {
            Truth::False
        }
    }
}

/// Comparison operator of a unary test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryTestOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl UnaryTestOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryTestOp::Lt => "<",
            UnaryTestOp::Le => "<=",
            UnaryTestOp::Gt => ">",
            UnaryTestOp::Ge => ">=",
            UnaryTestOp::Eq => "=",
            UnaryTestOp::Ne => "!=",
        }
    }
}

/// A compiled unary test: a comparison whose left side is supplied later,
/// when the test is applied to a candidate value.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryTestValue {
    pub op: UnaryTestOp,
    pub operand: Arc<Expression>,
}

impl UnaryTestValue {
    /// Apply the test to a candidate. The operand is evaluated against the
    /// given context each time, so tests can reference bound variables.
    pub fn apply(&self, ctx: &mut crate::context::EvaluationContext, candidate: &Value) -> Truth {
        let target = self.operand.evaluate(ctx);
        match self.op {
            UnaryTestOp::Eq => Truth::from(*candidate == target),
            UnaryTestOp::Ne => Truth::from(*candidate != target),
            UnaryTestOp::Lt => ordered(candidate, &target, |o| o == Ordering::Less),
            UnaryTestOp::Le => ordered(candidate, &target, |o| o != Ordering::Greater),
            UnaryTestOp::Gt => ordered(candidate, &target, |o| o == Ordering::Greater),
            UnaryTestOp::Ge => ordered(candidate, &target, |o| o != Ordering::Less),
        }
    }
}

impl fmt::Display for UnaryTestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unary test {} ...", self.op.symbol())
    }
}

fn ordered(left: &Value, right: &Value, pred: impl Fn(Ordering) -> bool) -> Truth {
    match compare(left, right) {
        Some(ordering) => Truth::from(pred(ordering)),
        None => Truth::Unknown,
    }
}

/// Order two values of the same comparable kind. `None` means the pair has
/// no defined ordering (mixed kinds, nulls, lists, contexts).
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::DaysDuration(a), Value::DaysDuration(b)) => Some(a.cmp(b)),
        (Value::YearsDuration(a), Value::YearsDuration(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// A named built-in function. Invocation is a plain fn pointer so function
/// values stay cheap to clone and comparable.
#[derive(Clone)]
pub struct FunctionValue {
    pub name: &'static str,
    pub invoke: fn(&[Value]) -> Value,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({})", self.name)
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.invoke == other.invoke
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_number_equality_ignores_scale() {
        let a = Value::Number(Decimal::from_str("1.50").unwrap());
        let b = Value::Number(Decimal::from_str("1.5").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_null_equality() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Null, Value::Number(Decimal::ZERO));
    }

    #[test]
    fn test_compare_same_kind() {
        let five = Value::Number(Decimal::from(5));
        let ten = Value::Number(Decimal::from(10));
        assert_eq!(compare(&five, &ten), Some(Ordering::Less));
        assert_eq!(
            compare(&Value::String("a".into()), &Value::String("b".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_compare_mixed_kinds_is_undefined() {
        let five = Value::Number(Decimal::from(5));
        assert_eq!(compare(&five, &Value::String("5".into())), None);
        assert_eq!(compare(&five, &Value::Null), None);
        assert_eq!(compare(&Value::Null, &Value::Null), None);
    }

    #[test]
    fn test_kleene_and() {
        use Truth::*;
        assert_eq!(True.and(True), True);
        assert_eq!(True.and(False), False);
        assert_eq!(True.and(Unknown), Unknown);
        assert_eq!(False.and(Unknown), False);
        assert_eq!(Unknown.and(Unknown), Unknown);
    }

    #[test]
    fn test_kleene_or() {
        use Truth::*;
        assert_eq!(False.or(False), False);
        assert_eq!(False.or(True), True);
        assert_eq!(Unknown.or(True), True);
        assert_eq!(Unknown.or(False), Unknown);
    }

    #[test]
    fn test_truth_to_value() {
        assert_eq!(Truth::True.to_value(), Value::Boolean(true));
        assert_eq!(Truth::Unknown.to_value(), Value::Null);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::from_str(r#"{"age": 47, "tags": ["a"]}"#).unwrap();
        let value = Value::from_json(&json);
        match value {
            Value::Context(fields) => {
                assert_eq!(fields.get("age"), Some(&Value::Number(Decimal::from(47))));
                assert_eq!(
                    fields.get("tags"),
                    Some(&Value::List(vec![Value::String("a".into())]))
                );
            }
            other => panic!("expected context, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let list = Value::List(vec![
            Value::Number(Decimal::from(1)),
            Value::String("x".into()),
        ]);
        assert_eq!(list.to_string(), "[1, x]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
