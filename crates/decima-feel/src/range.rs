//! Range values and inclusion tests

use std::cmp::Ordering;
use std::fmt;

use crate::value::{compare, Truth, Value};

/// Whether a range endpoint belongs to the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBoundary {
    Open,
    Closed,
}

/// An interval with typed endpoints, e.g. `[1..10]` or `(0.5..2]`.
///
/// Endpoints are plain values; a range over numbers, strings or temporal
/// values behaves as expected, while inclusion against an endpoint of a
/// different kind has no answer and reports [`Truth::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub start_kind: RangeBoundary,
    pub start: Value,
    pub end: Value,
    pub end_kind: RangeBoundary,
}

impl RangeValue {
    pub fn new(start_kind: RangeBoundary, start: Value, end: Value, end_kind: RangeBoundary) -> Self {
        RangeValue {
            start_kind,
            start,
            end,
            end_kind,
        }
    }

    /// Range including both endpoints.
    pub fn closed(start: Value, end: Value) -> Self {
        RangeValue::new(RangeBoundary::Closed, start, end, RangeBoundary::Closed)
    }

    /// Three-valued inclusion test. `Unknown` when the candidate cannot be
    /// ordered against either endpoint (nulls and mixed kinds included).
    pub fn includes(&self, value: &Value) -> Truth {
        let lower = match compare(value, &self.start) {
            Some(ordering) => ordering,
            None => return Truth::Unknown,
        };
        let upper = match compare(value, &self.end) {
            Some(ordering) => ordering,
            None => return Truth::Unknown,
        };
        let above_start = match self.start_kind {
            RangeBoundary::Closed => lower != Ordering::Less,
            RangeBoundary::Open => lower == Ordering::Greater,
        };
        let below_end = match self.end_kind {
            RangeBoundary::Closed => upper != Ordering::Greater,
            RangeBoundary::Open => upper == Ordering::Less,
        };
        Truth::from(above_start && below_end)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = match self.start_kind {
            RangeBoundary::Closed => '[',
            RangeBoundary::Open => '(',
        };
        let close = match self.end_kind {
            RangeBoundary::Closed => ']',
            RangeBoundary::Open => ')',
        };
        write!(f, "{open}{}..{}{close}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn num(n: i64) -> Value {
        Value::Number(Decimal::from(n))
    }

    #[test]
    fn test_closed_range_includes_endpoints() {
        let range = RangeValue::closed(num(1), num(10));
        assert_eq!(range.includes(&num(1)), Truth::True);
        assert_eq!(range.includes(&num(5)), Truth::True);
        assert_eq!(range.includes(&num(10)), Truth::True);
        assert_eq!(range.includes(&num(0)), Truth::False);
        assert_eq!(range.includes(&num(11)), Truth::False);
    }

    #[test]
    fn test_open_range_excludes_endpoints() {
        let range = RangeValue::new(RangeBoundary::Open, num(1), num(10), RangeBoundary::Open);
        assert_eq!(range.includes(&num(1)), Truth::False);
        assert_eq!(range.includes(&num(10)), Truth::False);
        assert_eq!(range.includes(&num(2)), Truth::True);
    }

    #[test]
    fn test_half_open_range() {
        let range = RangeValue::new(RangeBoundary::Closed, num(0), num(1), RangeBoundary::Open);
        assert_eq!(range.includes(&num(0)), Truth::True);
        assert_eq!(range.includes(&num(1)), Truth::False);
    }

    #[test]
    fn test_incomparable_candidate_is_unknown() {
        let range = RangeValue::closed(num(1), num(10));
        assert_eq!(range.includes(&Value::String("5".into())), Truth::Unknown);
        assert_eq!(range.includes(&Value::Null), Truth::Unknown);
    }

    #[test]
    fn test_string_range() {
        let range = RangeValue::closed(Value::String("a".into()), Value::String("m".into()));
        assert_eq!(range.includes(&Value::String("f".into())), Truth::True);
        assert_eq!(range.includes(&Value::String("z".into())), Truth::False);
    }

    #[test]
    fn test_display() {
        let range = RangeValue::new(RangeBoundary::Closed, num(1), num(10), RangeBoundary::Open);
        assert_eq!(range.to_string(), "[1..10)");
    }
}
