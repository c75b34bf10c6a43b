//! Built-in function library
//!
//! The table is built once per process and shared read-only by every
//! evaluation context; name resolution falls through to it after the user
//! frames. Built-ins are total: bad arguments yield null, never an error.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::value::{compare, FunctionValue, Value};

static FUNCTIONS: OnceLock<HashMap<&'static str, Value>> = OnceLock::new();

/// The shared built-in function table.
pub fn builtin_functions() -> &'static HashMap<&'static str, Value> {
    FUNCTIONS.get_or_init(|| {
        let entries: [(&'static str, fn(&[Value]) -> Value); 13] = [
            ("date", date),
            ("time", time),
            ("duration", duration),
            ("number", number),
            ("string", string),
            ("not", not),
            ("count", count),
            ("sum", sum),
            ("min", min),
            ("max", max),
            ("concatenate", concatenate),
            ("contains", contains),
            ("append", append),
        ];
        entries
            .into_iter()
            .map(|(name, invoke)| (name, Value::Function(FunctionValue { name, invoke })))
            .collect()
    })
}

/// Resolve a built-in by name.
pub fn lookup(name: &str) -> Option<&'static Value> {
    builtin_functions().get(name)
}

fn date(args: &[Value]) -> Value {
    match args {
        [Value::String(text)] => text
            .parse::<NaiveDate>()
            .map(Value::Date)
            .unwrap_or(Value::Null),
        [Value::Number(y), Value::Number(m), Value::Number(d)] => {
            match (y.to_i32(), m.to_u32(), d.to_u32()) {
                (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d)
                    .map(Value::Date)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        }
        [Value::DateTime(dt)] => Value::Date(dt.date()),
        [Value::Date(d)] => Value::Date(*d),
        _ => Value::Null,
    }
}

fn time(args: &[Value]) -> Value {
    match args {
        [Value::String(text)] => text
            .parse::<NaiveTime>()
            .map(Value::Time)
            .unwrap_or(Value::Null),
        [Value::Number(h), Value::Number(m), Value::Number(s)] => {
            match (h.to_u32(), m.to_u32(), s.to_u32()) {
                (Some(h), Some(m), Some(s)) => NaiveTime::from_hms_opt(h, m, s)
                    .map(Value::Time)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        }
        [Value::DateTime(dt)] => Value::Time(dt.time()),
        [Value::Time(t)] => Value::Time(*t),
        _ => Value::Null,
    }
}

fn duration(args: &[Value]) -> Value {
    match args {
        [Value::String(text)] => parse_iso_duration(text).unwrap_or(Value::Null),
        [Value::DaysDuration(d)] => Value::DaysDuration(*d),
        [Value::YearsDuration(m)] => Value::YearsDuration(*m),
        _ => Value::Null,
    }
}

fn number(args: &[Value]) -> Value {
    match args {
        [Value::String(text)] => Decimal::from_str(text.trim())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        [Value::Number(n)] => Value::Number(*n),
        _ => Value::Null,
    }
}

fn string(args: &[Value]) -> Value {
    match args {
        [Value::Null] => Value::Null,
        [value] => Value::String(value.to_string()),
        _ => Value::Null,
    }
}

fn not(args: &[Value]) -> Value {
    match args {
        [Value::Boolean(b)] => Value::Boolean(!b),
        _ => Value::Null,
    }
}

fn count(args: &[Value]) -> Value {
    match args {
        [Value::List(items)] => Value::Number(Decimal::from(items.len() as u64)),
        _ => Value::Null,
    }
}

fn sum(args: &[Value]) -> Value {
    let items = list_or_args(args);
    if items.is_empty() {
        return Value::Null;
    }
    let mut total = Decimal::ZERO;
    for item in items {
        match item {
            Value::Number(n) => total += *n,
            _ => return Value::Null,
        }
    }
    Value::Number(total)
}

fn min(args: &[Value]) -> Value {
    fold_extreme(list_or_args(args), Ordering::Less)
}

fn max(args: &[Value]) -> Value {
    fold_extreme(list_or_args(args), Ordering::Greater)
}

fn concatenate(args: &[Value]) -> Value {
    let mut result = Vec::new();
    for arg in args {
        match arg {
            Value::List(items) => result.extend(items.iter().cloned()),
            Value::Null => return Value::Null,
            other => result.push(other.clone()),
        }
    }
    Value::List(result)
}

fn contains(args: &[Value]) -> Value {
    match args {
        [Value::String(text), Value::String(substring)] => {
            Value::Boolean(text.contains(substring.as_str()))
        }
        _ => Value::Null,
    }
}

fn append(args: &[Value]) -> Value {
    match args {
        [Value::List(items), rest @ ..] => {
            let mut result = items.clone();
            result.extend(rest.iter().cloned());
            Value::List(result)
        }
        _ => Value::Null,
    }
}

/// Aggregates accept either a single list or the elements as arguments.
fn list_or_args(args: &[Value]) -> &[Value] {
    match args {
        [Value::List(items)] => items,
        other => other,
    }
}

fn fold_extreme(items: &[Value], keep: Ordering) -> Value {
    let mut iter = items.iter();
    let Some(mut best) = iter.next() else {
        return Value::Null;
    };
    for item in iter {
        match compare(item, best) {
            Some(ordering) if ordering == keep => best = item,
            Some(_) => {}
            None => return Value::Null,
        }
    }
    best.clone()
}

/// ISO-8601 duration text in the two DMN shapes: `PnYnM` (years and months)
/// and `PnDTnHnMnS` (days and time), with an optional leading sign.
fn parse_iso_duration(text: &str) -> Option<Value> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let rest = rest.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    // a month designator before T makes this a years-and-months duration
    if date_part.contains('Y') || date_part.contains('M') {
        if time_part.is_some() {
            return None;
        }
        let mut months: i64 = 0;
        for (n, unit) in segments(date_part)? {
            match unit {
                'Y' => months += n * 12,
                'M' => months += n,
                _ => return None,
            }
        }
        return Some(Value::YearsDuration(if negative { -months } else { months }));
    }

    let mut seconds: i64 = 0;
    for (n, unit) in segments(date_part)? {
        match unit {
            'D' => seconds += n * 86_400,
            _ => return None,
        }
    }
    if let Some(time_part) = time_part {
        for (n, unit) in segments(time_part)? {
            match unit {
                'H' => seconds += n * 3_600,
                'M' => seconds += n * 60,
                'S' => seconds += n,
                _ => return None,
            }
        }
    }
    Some(Value::DaysDuration(Duration::seconds(if negative {
        -seconds
    } else {
        seconds
    })))
}

fn segments(part: &str) -> Option<Vec<(i64, char)>> {
    let mut result = Vec::new();
    let mut digits = String::new();
    for c in part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            let n: i64 = digits.parse().ok()?;
            digits.clear();
            result.push((n, c));
        }
    }
    if digits.is_empty() {
        Some(result)
    } else {
        None
    }
}
