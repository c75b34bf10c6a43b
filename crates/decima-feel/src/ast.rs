//! Expression AST and tree-walking evaluation
//!
//! Evaluation is total: a node always produces a value, with null standing
//! in for every failure mode (unbound names, type mismatches, division by
//! zero). Three-valued logic surfaces only where the language calls for it;
//! everywhere else unknown collapses to null.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::context::EvaluationContext;
use crate::range::{RangeBoundary, RangeValue};
use crate::value::{compare, Truth, UnaryTestOp, UnaryTestValue, Value};

/// Binary operators of the supported FEEL subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// A FEEL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal number, string, boolean or null
    Literal(Value),
    /// Variable reference resolved through the scope chain
    Name(String),
    /// Member access on context values, e.g. `applicant.age`
    Path {
        base: Box<Expression>,
        segments: Vec<String>,
    },
    /// Arithmetic negation
    Negation(Box<Expression>),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Membership test `value in target`
    In {
        value: Box<Expression>,
        target: Box<Expression>,
    },
    /// Range literal such as `[1..10]` or `(0..1]`
    Range {
        start_kind: RangeBoundary,
        start: Box<Expression>,
        end: Box<Expression>,
        end_kind: RangeBoundary,
    },
    List(Vec<Expression>),
    /// Context literal `{a: 1, b: a + 1}`; entries bind in order and may
    /// reference earlier entries
    ContextLit(Vec<(String, Expression)>),
    If {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
    FunctionCall {
        function: Box<Expression>,
        args: Vec<Expression>,
    },
    /// Unary test such as `< 10`; evaluates to a test value applied later
    UnaryTest {
        op: UnaryTestOp,
        operand: Arc<Expression>,
    },
}

impl Expression {
    /// Evaluate against the given context.
    pub fn evaluate(&self, ctx: &mut EvaluationContext) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),
            Expression::Name(name) => ctx.value(name).cloned().unwrap_or(Value::Null),
            Expression::Path { base, segments } => {
                let mut current = base.evaluate(ctx);
                for segment in segments {
                    current = match current {
                        Value::Context(mut fields) => {
                            fields.remove(segment).unwrap_or(Value::Null)
                        }
                        _ => Value::Null,
                    };
                }
                current
            }
            Expression::Negation(inner) => match inner.evaluate(ctx) {
                Value::Number(n) => Value::Number(-n),
                _ => Value::Null,
            },
            Expression::Binary { op, left, right } => evaluate_binary(*op, left, right, ctx),
            Expression::In { value, target } => {
                let value = value.evaluate(ctx);
                let target = target.evaluate(ctx);
                evaluate_in(ctx, &value, &target)
            }
            Expression::Range {
                start_kind,
                start,
                end,
                end_kind,
            } => {
                let start = start.evaluate(ctx);
                let end = end.evaluate(ctx);
                Value::Range(Arc::new(RangeValue::new(*start_kind, start, end, *end_kind)))
            }
            Expression::List(items) => {
                Value::List(items.iter().map(|item| item.evaluate(ctx)).collect())
            }
            Expression::ContextLit(entries) => {
                ctx.enter_frame();
                let mut result = BTreeMap::new();
                for (key, expr) in entries {
                    let value = expr.evaluate(ctx);
                    ctx.set_value(key, value.clone());
                    result.insert(key.clone(), value);
                }
                ctx.exit_frame();
                Value::Context(result)
            }
            Expression::If {
                condition,
                then_branch,
                else_branch,
            } => match condition.evaluate(ctx) {
                // anything but a strict true falls through to the else branch
                Value::Boolean(true) => then_branch.evaluate(ctx),
                _ => else_branch.evaluate(ctx),
            },
            Expression::FunctionCall { function, args } => {
                let target = function.evaluate(ctx);
                let arg_values: Vec<Value> = args.iter().map(|arg| arg.evaluate(ctx)).collect();
                match target {
                    Value::Function(f) => (f.invoke)(&arg_values),
                    other => {
                        debug!("call target is not a function: {}", other.type_name());
                        Value::Null
                    }
                }
            }
            Expression::UnaryTest { op, operand } => Value::UnaryTest(UnaryTestValue {
                op: *op,
                operand: Arc::clone(operand),
            }),
        }
    }
}

/// The membership rule shared by `in` expressions and decision-table cells.
///
/// A test value applies itself, a range tests inclusion, a null target
/// matches only a null candidate, and any other value is an equality test
/// that a null candidate never passes.
pub fn satisfies(ctx: &mut EvaluationContext, candidate: &Value, target: &Value) -> Truth {
    match target {
        Value::Null => Truth::from(candidate.is_null()),
        Value::UnaryTest(test) => test.apply(ctx, candidate),
        Value::Range(range) => range.includes(candidate),
        other if !candidate.is_null() => Truth::from(candidate == other),
        _ => Truth::False,
    }
}

fn evaluate_in(ctx: &mut EvaluationContext, value: &Value, target: &Value) -> Value {
    if let Value::List(items) = target {
        for item in items {
            if satisfies(ctx, value, item).is_true() {
                return Value::Boolean(true);
            }
        }
        return Value::Boolean(false);
    }
    satisfies(ctx, value, target).to_value()
}

fn evaluate_binary(
    op: BinaryOp,
    left: &Expression,
    right: &Expression,
    ctx: &mut EvaluationContext,
) -> Value {
    match op {
        BinaryOp::And => {
            let lhs = Truth::of(&left.evaluate(ctx));
            if lhs == Truth::False {
                return Value::Boolean(false);
            }
            lhs.and(Truth::of(&right.evaluate(ctx))).to_value()
        }
        BinaryOp::Or => {
            let lhs = Truth::of(&left.evaluate(ctx));
            if lhs == Truth::True {
                return Value::Boolean(true);
            }
            lhs.or(Truth::of(&right.evaluate(ctx))).to_value()
        }
        BinaryOp::Eq => Value::Boolean(left.evaluate(ctx) == right.evaluate(ctx)),
        BinaryOp::Ne => Value::Boolean(left.evaluate(ctx) != right.evaluate(ctx)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let lhs = left.evaluate(ctx);
            let rhs = right.evaluate(ctx);
            match compare(&lhs, &rhs) {
                Some(ordering) => {
                    let holds = match op {
                        BinaryOp::Lt => ordering == std::cmp::Ordering::Less,
                        BinaryOp::Le => ordering != std::cmp::Ordering::Greater,
                        BinaryOp::Gt => ordering == std::cmp::Ordering::Greater,
                        _ => ordering != std::cmp::Ordering::Less,
                    };
                    Value::Boolean(holds)
                }
                None => Value::Null,
            }
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            let lhs = left.evaluate(ctx);
            let rhs = right.evaluate(ctx);
            evaluate_arithmetic(op, &lhs, &rhs)
        }
    }
}

fn evaluate_arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => match op {
            BinaryOp::Add => Value::Number(a + b),
            BinaryOp::Sub => Value::Number(a - b),
            BinaryOp::Mul => Value::Number(a * b),
            _ => a.checked_div(*b).map(Value::Number).unwrap_or(Value::Null),
        },
        // string concatenation rides on +
        (Value::String(a), Value::String(b)) if op == BinaryOp::Add => {
            Value::String(format!("{a}{b}"))
        }
        _ => Value::Null,
    }
}
