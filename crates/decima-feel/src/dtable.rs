//! Executable decision tables
//!
//! A [`DecisionTable`] is the compiled, reusable form of a table: column
//! clauses with their allowed values, rule rows with compiled cell tests,
//! and a hit policy. Evaluation binds parameters in a nested frame,
//! matches rules in declaration order and combines the matching rules'
//! outputs according to the policy. Output entries are evaluated lazily,
//! only for rules the policy selects.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use rust_decimal::Decimal;

use crate::ast::satisfies;
use crate::context::EvaluationContext;
use crate::engine::Feel;
use crate::error::DecisionTableError;
use crate::value::Value;

/// Combination rule for multiple matching rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPolicy {
    Unique,
    First,
    Any,
    Priority,
    Collect(Option<Aggregator>),
    RuleOrder,
    OutputOrder,
}

/// COLLECT aggregation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregator {
    Sum,
    Count,
    Min,
    Max,
}

impl HitPolicy {
    /// Parse the document's policy and aggregation codes. Aggregation only
    /// combines with COLLECT; any other pairing is rejected.
    pub fn from_policy_code(policy: &str, aggregation: Option<&str>) -> Option<HitPolicy> {
        let aggregator = match aggregation.map(str::trim) {
            None | Some("") => None,
            Some("SUM") => Some(Aggregator::Sum),
            Some("COUNT") => Some(Aggregator::Count),
            Some("MIN") => Some(Aggregator::Min),
            Some("MAX") => Some(Aggregator::Max),
            Some(_) => return None,
        };
        let parsed = match policy.trim() {
            "UNIQUE" => HitPolicy::Unique,
            "FIRST" => HitPolicy::First,
            "ANY" => HitPolicy::Any,
            "PRIORITY" => HitPolicy::Priority,
            "RULE ORDER" => HitPolicy::RuleOrder,
            "OUTPUT ORDER" => HitPolicy::OutputOrder,
            "COLLECT" => return Some(HitPolicy::Collect(aggregator)),
            _ => return None,
        };
        if aggregator.is_some() {
            None
        } else {
            Some(parsed)
        }
    }
}

impl fmt::Display for HitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HitPolicy::Unique => write!(f, "UNIQUE"),
            HitPolicy::First => write!(f, "FIRST"),
            HitPolicy::Any => write!(f, "ANY"),
            HitPolicy::Priority => write!(f, "PRIORITY"),
            HitPolicy::Collect(None) => write!(f, "COLLECT"),
            HitPolicy::Collect(Some(aggregator)) => write!(f, "COLLECT {aggregator}"),
            HitPolicy::RuleOrder => write!(f, "RULE ORDER"),
            HitPolicy::OutputOrder => write!(f, "OUTPUT ORDER"),
        }
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Sum => write!(f, "SUM"),
            Aggregator::Count => write!(f, "COUNT"),
            Aggregator::Min => write!(f, "MIN"),
            Aggregator::Max => write!(f, "MAX"),
        }
    }
}

/// A compiled input column.
#[derive(Debug, Clone, PartialEq)]
pub struct DtInputClause {
    /// Expression producing the column value from the bound parameters
    pub input_expression: String,
    /// Raw allowed-values text, kept for diagnostics
    pub input_values_text: Option<String>,
    /// Compiled allowed-values tests; empty means unconstrained
    pub allowed_tests: Vec<Value>,
}

/// A compiled output column. `output_values` order is the ranking used by
/// PRIORITY and OUTPUT ORDER, highest priority first.
#[derive(Debug, Clone, PartialEq)]
pub struct DtOutputClause {
    pub name: Option<String>,
    pub id: Option<String>,
    pub output_values: Vec<Value>,
}

/// One rule row: a test list per input column and an output-entry
/// expression per output column.
#[derive(Debug, Clone, PartialEq)]
pub struct DtRule {
    /// Zero-based position in the table, also the FIRST/RULE ORDER rank
    pub index: usize,
    pub input_entries: Vec<Vec<Value>>,
    pub output_entries: Vec<String>,
}

/// An executable decision table.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTable {
    pub name: String,
    /// Names bound positionally to the evaluation parameters
    pub parameter_names: Vec<String>,
    pub inputs: Vec<DtInputClause>,
    pub outputs: Vec<DtOutputClause>,
    pub rules: Vec<DtRule>,
    pub hit_policy: HitPolicy,
}

impl DecisionTable {
    /// Evaluate the table with one value per parameter. Parameters are
    /// bound in a frame that is dropped before returning, so the caller's
    /// context is left untouched.
    pub fn evaluate(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        params: &[Value],
    ) -> Result<Value, DecisionTableError> {
        ctx.enter_frame();
        let outcome = self.evaluate_in_frame(feel, ctx, params);
        ctx.exit_frame();
        outcome
    }

    fn evaluate_in_frame(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        params: &[Value],
    ) -> Result<Value, DecisionTableError> {
        for (name, value) in self.parameter_names.iter().zip(params.iter()) {
            ctx.set_value(name, value.clone());
        }

        let mut column_values = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let value = match feel.evaluate_in(&input.input_expression, ctx) {
                Ok(value) => value,
                Err(e) => {
                    debug!(
                        "input expression '{}' of table '{}' failed: {e}",
                        input.input_expression, self.name
                    );
                    Value::Null
                }
            };
            if !input.allowed_tests.is_empty() && !any_satisfies(ctx, &value, &input.allowed_tests)
            {
                return Err(DecisionTableError::InputMismatch {
                    table: self.name.clone(),
                    input: input.input_expression.clone(),
                    value: value.to_string(),
                });
            }
            column_values.push(value);
        }

        let mut matches: Vec<&DtRule> = Vec::new();
        'rules: for rule in &self.rules {
            for (tests, value) in rule.input_entries.iter().zip(column_values.iter()) {
                // an empty test list is an irrelevant cell
                if !tests.is_empty() && !any_satisfies(ctx, value, tests) {
                    continue 'rules;
                }
            }
            matches.push(rule);
        }
        debug!(
            "table '{}': rules {:?} matched",
            self.name,
            matches.iter().map(|r| r.index).collect::<Vec<_>>()
        );

        self.apply_hit_policy(feel, ctx, &matches)
    }

    fn apply_hit_policy(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        matches: &[&DtRule],
    ) -> Result<Value, DecisionTableError> {
        match self.hit_policy {
            HitPolicy::First => match matches.first() {
                Some(rule) => Ok(self.wrap(self.rule_output(feel, ctx, rule)?)),
                None => Ok(Value::Null),
            },
            HitPolicy::Unique | HitPolicy::Any => self.single_result(feel, ctx, matches),
            HitPolicy::Priority => self.priority_result(feel, ctx, matches),
            HitPolicy::RuleOrder | HitPolicy::Collect(None) => {
                let mut results = Vec::with_capacity(matches.len());
                for rule in matches {
                    results.push(self.wrap(self.rule_output(feel, ctx, rule)?));
                }
                Ok(Value::List(results))
            }
            HitPolicy::Collect(Some(aggregator)) => {
                self.aggregate_result(feel, ctx, matches, aggregator)
            }
            HitPolicy::OutputOrder => self.output_order_result(feel, ctx, matches),
        }
    }

    /// UNIQUE and ANY: at most one distinct output tuple may be produced.
    /// Several rules agreeing on the same values are tolerated under both.
    fn single_result(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        matches: &[&DtRule],
    ) -> Result<Value, DecisionTableError> {
        let mut outputs = Vec::with_capacity(matches.len());
        for rule in matches {
            outputs.push(self.rule_output(feel, ctx, rule)?);
        }
        match outputs.len() {
            0 => Ok(Value::Null),
            _ if outputs.windows(2).all(|pair| pair[0] == pair[1]) => {
                Ok(self.wrap(outputs.swap_remove(0)))
            }
            _ => Err(DecisionTableError::Overlap {
                table: self.name.clone(),
                policy: self.hit_policy.to_string(),
                rules: matches.iter().map(|rule| rule.index).collect(),
            }),
        }
    }

    /// PRIORITY: per output column, the value ranked highest in the
    /// clause's declared values wins; undeclared values rank below all
    /// declared ones and ties keep rule order.
    fn priority_result(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        matches: &[&DtRule],
    ) -> Result<Value, DecisionTableError> {
        if matches.is_empty() {
            return Ok(Value::Null);
        }
        let mut outputs = Vec::with_capacity(matches.len());
        for rule in matches {
            outputs.push(self.rule_output(feel, ctx, rule)?);
        }
        let mut winners = Vec::with_capacity(self.outputs.len());
        for col in 0..self.outputs.len() {
            let mut best: Option<(usize, &Value)> = None;
            for output in &outputs {
                let Some(value) = output.get(col) else { continue };
                let rank = self.output_rank(col, value);
                if best.map_or(true, |(leader, _)| rank < leader) {
                    best = Some((rank, value));
                }
            }
            winners.push(best.map(|(_, value)| value.clone()).unwrap_or(Value::Null));
        }
        Ok(self.wrap(winners))
    }

    /// OUTPUT ORDER: all matching outputs, sorted by declared-value rank
    /// column by column. The sort is stable, so equal ranks keep rule order.
    fn output_order_result(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        matches: &[&DtRule],
    ) -> Result<Value, DecisionTableError> {
        let mut ranked = Vec::with_capacity(matches.len());
        for rule in matches {
            let output = self.rule_output(feel, ctx, rule)?;
            let ranks: Vec<usize> = (0..self.outputs.len())
                .map(|col| {
                    output
                        .get(col)
                        .map(|value| self.output_rank(col, value))
                        .unwrap_or(usize::MAX)
                })
                .collect();
            ranked.push((ranks, output));
        }
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Value::List(
            ranked
                .into_iter()
                .map(|(_, output)| self.wrap(output))
                .collect(),
        ))
    }

    fn aggregate_result(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        matches: &[&DtRule],
        aggregator: Aggregator,
    ) -> Result<Value, DecisionTableError> {
        if aggregator == Aggregator::Count {
            return Ok(Value::Number(Decimal::from(matches.len() as u64)));
        }
        let mut numbers = Vec::with_capacity(matches.len());
        for rule in matches {
            let output = self.rule_output(feel, ctx, rule)?;
            match output.into_iter().next() {
                Some(Value::Number(n)) => numbers.push(n),
                Some(other) => {
                    return Err(DecisionTableError::NonNumericAggregate {
                        table: self.name.clone(),
                        aggregator: aggregator.to_string(),
                        value: other.to_string(),
                    })
                }
                None => {
                    return Err(DecisionTableError::NonNumericAggregate {
                        table: self.name.clone(),
                        aggregator: aggregator.to_string(),
                        value: Value::Null.to_string(),
                    })
                }
            }
        }
        let result = numbers.iter().copied().reduce(|a, b| match aggregator {
            Aggregator::Min => a.min(b),
            Aggregator::Max => a.max(b),
            // SUM; COUNT never reaches the fold
            _ => a + b,
        });
        Ok(result.map(Value::Number).unwrap_or(Value::Null))
    }

    /// Evaluate one rule's output entries, one value per output column.
    fn rule_output(
        &self,
        feel: &Feel,
        ctx: &mut EvaluationContext,
        rule: &DtRule,
    ) -> Result<Vec<Value>, DecisionTableError> {
        let mut values = Vec::with_capacity(rule.output_entries.len());
        for entry in &rule.output_entries {
            let value =
                feel.evaluate_in(entry, ctx)
                    .map_err(|source| DecisionTableError::OutputEntry {
                        table: self.name.clone(),
                        rule: rule.index,
                        source,
                    })?;
            values.push(value);
        }
        Ok(values)
    }

    /// A single column yields its value bare; several columns yield a
    /// context keyed by clause name.
    fn wrap(&self, mut values: Vec<Value>) -> Value {
        if self.outputs.len() <= 1 {
            return values.pop().unwrap_or(Value::Null);
        }
        let mut fields = BTreeMap::new();
        for (index, value) in values.into_iter().enumerate() {
            fields.insert(self.output_key(index), value);
        }
        Value::Context(fields)
    }

    fn output_key(&self, index: usize) -> String {
        self.outputs
            .get(index)
            .and_then(|clause| clause.name.clone())
            .unwrap_or_else(|| format!("output {}", index + 1))
    }

    /// Position of a value in the column's declared output values, or
    /// `usize::MAX` when undeclared.
    fn output_rank(&self, col: usize, value: &Value) -> usize {
        self.outputs
            .get(col)
            .and_then(|clause| clause.output_values.iter().position(|v| v == value))
            .unwrap_or(usize::MAX)
    }
}

fn any_satisfies(ctx: &mut EvaluationContext, value: &Value, tests: &[Value]) -> bool {
    for test in tests {
        if satisfies(ctx, value, test).is_true() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_codes() {
        assert_eq!(
            HitPolicy::from_policy_code("UNIQUE", None),
            Some(HitPolicy::Unique)
        );
        assert_eq!(
            HitPolicy::from_policy_code("RULE ORDER", Some("")),
            Some(HitPolicy::RuleOrder)
        );
        assert_eq!(
            HitPolicy::from_policy_code("COLLECT", Some("SUM")),
            Some(HitPolicy::Collect(Some(Aggregator::Sum)))
        );
        assert_eq!(
            HitPolicy::from_policy_code("COLLECT", None),
            Some(HitPolicy::Collect(None))
        );
        assert_eq!(HitPolicy::from_policy_code("FIRST", Some("SUM")), None);
        assert_eq!(HitPolicy::from_policy_code("SECOND", None), None);
        assert_eq!(HitPolicy::from_policy_code("COLLECT", Some("AVG")), None);
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(HitPolicy::Unique.to_string(), "UNIQUE");
        assert_eq!(
            HitPolicy::Collect(Some(Aggregator::Max)).to_string(),
            "COLLECT MAX"
        );
    }
}
