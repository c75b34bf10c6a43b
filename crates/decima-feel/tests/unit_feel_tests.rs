//! Unit tests for the FEEL language surface
//!
//! Drives parsing and evaluation through the engine facade the way the
//! model compiler uses it.

use decima_feel::{
    satisfies, EvaluationContext, Feel, Truth, Value,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

fn eval(text: &str) -> Value {
    Feel::new().evaluate(text).unwrap()
}

// =============================================================================
// Arithmetic and Comparison
// =============================================================================

#[test]
fn test_decimal_arithmetic_is_exact() {
    assert_eq!(
        eval("0.1 + 0.2"),
        Value::Number(Decimal::from_str("0.3").unwrap())
    );
    assert_eq!(
        eval("10 / 4"),
        Value::Number(Decimal::from_str("2.5").unwrap())
    );
}

#[test]
fn test_division_by_zero_is_null() {
    assert_eq!(eval("1 / 0"), Value::Null);
    assert_eq!(eval("1 / (2 - 2)"), Value::Null);
}

#[test]
fn test_arithmetic_with_null_is_null() {
    assert_eq!(eval("null + 1"), Value::Null);
    assert_eq!(eval("2 * null"), Value::Null);
    assert_eq!(eval("-null"), Value::Null);
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("1 < 2"), Value::Boolean(true));
    assert_eq!(eval("2 <= 2"), Value::Boolean(true));
    assert_eq!(eval("\"a\" < \"b\""), Value::Boolean(true));
    assert_eq!(eval("1 < \"2\""), Value::Null);
    assert_eq!(eval("null < 1"), Value::Null);
}

#[test]
fn test_equality_is_null_aware() {
    assert_eq!(eval("null = null"), Value::Boolean(true));
    assert_eq!(eval("1 = null"), Value::Boolean(false));
    assert_eq!(eval("1 != null"), Value::Boolean(true));
    assert_eq!(eval("[1, 2] = [1, 2]"), Value::Boolean(true));
}

// =============================================================================
// Three-Valued Logic
// =============================================================================

#[test]
fn test_kleene_conjunction() {
    assert_eq!(eval("true and true"), Value::Boolean(true));
    assert_eq!(eval("true and false"), Value::Boolean(false));
    assert_eq!(eval("false and null"), Value::Boolean(false));
    assert_eq!(eval("null and false"), Value::Boolean(false));
    assert_eq!(eval("true and null"), Value::Null);
    assert_eq!(eval("null and null"), Value::Null);
}

#[test]
fn test_kleene_disjunction() {
    assert_eq!(eval("false or true"), Value::Boolean(true));
    assert_eq!(eval("null or true"), Value::Boolean(true));
    assert_eq!(eval("null or false"), Value::Null);
    assert_eq!(eval("false or false"), Value::Boolean(false));
}

#[test]
fn test_non_boolean_logic_operand_is_unknown() {
    assert_eq!(eval("1 and true"), Value::Null);
    assert_eq!(eval("\"yes\" or false"), Value::Null);
}

// =============================================================================
// Membership
// =============================================================================

#[test]
fn test_in_range() {
    assert_eq!(eval("5 in [1..10]"), Value::Boolean(true));
    assert_eq!(eval("1 in (1..10]"), Value::Boolean(false));
    assert_eq!(eval("10 in [1..10)"), Value::Boolean(false));
}

#[test]
fn test_in_list_checks_each_element() {
    assert_eq!(eval("5 in [1, 2, 3]"), Value::Boolean(false));
    assert_eq!(eval("2 in [1, 2, 3]"), Value::Boolean(true));
    // a range inside a list applies as a range
    assert_eq!(eval("5 in [[1..3], [4..6]]"), Value::Boolean(true));
}

#[test]
fn test_in_asymmetric_null_rule() {
    // both absent: membership holds
    assert_eq!(eval("null in null"), Value::Boolean(true));
    // a value is never in an absent target
    assert_eq!(eval("5 in null"), Value::Boolean(false));
    // an absent value never equals a present scalar
    assert_eq!(eval("null in 5"), Value::Boolean(false));
    // but is found in a list that contains null
    assert_eq!(eval("null in [1, null]"), Value::Boolean(true));
}

#[test]
fn test_in_incomparable_range_is_null() {
    assert_eq!(eval("\"x\" in [1..10]"), Value::Null);
    assert_eq!(eval("null in [1..10]"), Value::Null);
}

#[test]
fn test_satisfies_rule_directly() {
    let mut ctx = EvaluationContext::new();
    assert_eq!(satisfies(&mut ctx, &Value::Null, &Value::Null), Truth::True);
    assert_eq!(satisfies(&mut ctx, &num(5), &Value::Null), Truth::False);
    assert_eq!(satisfies(&mut ctx, &Value::Null, &num(5)), Truth::False);
    assert_eq!(satisfies(&mut ctx, &num(5), &num(5)), Truth::True);
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn test_context_entries_bind_in_order() {
    let result = eval("{a: 1, b: a + 1, c: b * 2}.c");
    assert_eq!(result, num(4));
}

#[test]
fn test_inner_bindings_do_not_leak() {
    let feel = Feel::new();
    let mut ctx = EvaluationContext::new();
    ctx.set_value("x", num(1));
    feel.evaluate_in("{x: 99, y: x}", &mut ctx).unwrap();
    assert_eq!(ctx.value("x"), Some(&num(1)));
    assert_eq!(ctx.value("y"), None);
}

#[test]
fn test_shadowing_restores_after_frame_exit() {
    let feel = Feel::new();
    let mut ctx = EvaluationContext::new();
    ctx.set_value("x", num(10));
    // the literal shadows x while its entries evaluate
    let inner = feel.evaluate_in("{x: 2, doubled: x * 2}.doubled", &mut ctx).unwrap();
    assert_eq!(inner, num(4));
    let outer = feel.evaluate_in("x * 2", &mut ctx).unwrap();
    assert_eq!(outer, num(20));
}

// =============================================================================
// Built-in Functions Through the Language
// =============================================================================

#[test]
fn test_builtin_calls() {
    assert_eq!(eval("sum([1, 2, 3]) * 2"), num(12));
    assert_eq!(eval("count([])"), num(0));
    assert_eq!(eval("min([3, 1, 2])"), num(1));
    assert_eq!(eval("max([3, 1, 2])"), num(3));
    assert_eq!(
        eval("concatenate([1], [2, 3])"),
        Value::List(vec![num(1), num(2), num(3)])
    );
}

#[test]
fn test_date_comparison_through_language() {
    assert_eq!(
        eval("date(\"2016-07-29\") < date(\"2016-08-01\")"),
        Value::Boolean(true)
    );
    assert_eq!(
        eval("date(\"2016-07-29\") in [date(\"2016-01-01\")..date(\"2016-12-31\")]"),
        Value::Boolean(true)
    );
}

#[test]
fn test_unknown_function_is_null() {
    assert_eq!(eval("no_such_function(1)"), Value::Null);
}

#[test]
fn test_salutation_scenario() {
    let feel = Feel::new();
    let mut ctx = EvaluationContext::new();
    ctx.set_value("name", Value::String("John Doe".into()));
    let result = feel.evaluate_in("\"Hello \" + name", &mut ctx).unwrap();
    assert_eq!(result, Value::String("Hello John Doe".into()));
}

// =============================================================================
// Unary Test Values
// =============================================================================

#[test]
fn test_unary_test_against_bound_variable() {
    let feel = Feel::new();
    let tests = feel.evaluate_unary_tests("< threshold").unwrap();
    assert_eq!(tests.len(), 1);

    // the operand resolves when the test is applied, not when compiled
    let mut ctx = EvaluationContext::new();
    ctx.set_value("threshold", num(10));
    match &tests[0] {
        Value::UnaryTest(test) => {
            assert_eq!(test.apply(&mut ctx, &num(5)), Truth::True);
            assert_eq!(test.apply(&mut ctx, &num(15)), Truth::False);
        }
        other => panic!("expected unary test, got {other:?}"),
    }
}

#[test]
fn test_unary_test_list_matches_any() {
    let feel = Feel::new();
    let tests = feel.evaluate_unary_tests("\"HIGH\", \"MEDIUM\"").unwrap();
    let mut ctx = EvaluationContext::new();
    let high = Value::String("HIGH".into());
    let low = Value::String("LOW".into());
    assert!(tests.iter().any(|t| satisfies(&mut ctx, &high, t).is_true()));
    assert!(!tests.iter().any(|t| satisfies(&mut ctx, &low, t).is_true()));
}
