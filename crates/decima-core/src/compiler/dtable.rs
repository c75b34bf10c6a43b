//! Decision-table compilation
//!
//! Turns a marshalled table definition into an executable
//! [`DecisionTable`]. Cell text compiles through [`UnaryTestCompiler`];
//! any structural defect (unknown hit policy, unparseable cell, a rule
//! with the wrong number of entries, a misconfigured aggregation) reports
//! an error and aborts the table, leaving the owning decision without an
//! evaluator.

use decima_feel::{
    Aggregator, DecisionTable, DtInputClause, DtOutputClause, DtRule, Feel, HitPolicy, Value,
};
use log::error;

use crate::document::DecisionTableDef;
use crate::message::Severity;
use crate::model::DmnModel;

/// Compiles cell text in the unary-test grammar, reporting failures as
/// model diagnostics.
pub struct UnaryTestCompiler<'a> {
    feel: &'a Feel,
}

impl<'a> UnaryTestCompiler<'a> {
    pub fn new(feel: &'a Feel) -> Self {
        UnaryTestCompiler { feel }
    }

    /// Compile one cell into its test values. An empty list is a cell that
    /// matches anything (blank or `-`). `None` means the text does not
    /// parse; an error naming `location` has been recorded on the model.
    pub fn compile(
        &self,
        model: &mut DmnModel,
        source_id: Option<&str>,
        location: &str,
        text: &str,
    ) -> Option<Vec<Value>> {
        match self.feel.evaluate_unary_tests(text) {
            Ok(tests) => Some(tests),
            Err(e) => {
                error!("cannot compile {location}: {e}");
                model.add_message(
                    Severity::Error,
                    format!("cannot compile {location}: {e}"),
                    source_id,
                );
                None
            }
        }
    }
}

/// Compiles a marshalled decision-table definition into its executable
/// form, validating hit policy and rule shape along the way.
pub struct DecisionTableCompiler<'a> {
    feel: &'a Feel,
}

impl<'a> DecisionTableCompiler<'a> {
    pub fn new(feel: &'a Feel) -> Self {
        DecisionTableCompiler { feel }
    }

    pub fn compile(
        &self,
        model: &mut DmnModel,
        decision_id: &str,
        decision_name: &str,
        parameter_names: Vec<String>,
        def: &DecisionTableDef,
    ) -> Option<DecisionTable> {
        let source_id = Some(decision_id);

        let Some(hit_policy) =
            HitPolicy::from_policy_code(&def.hit_policy, def.aggregation.as_deref())
        else {
            let shown = match def.aggregation.as_deref() {
                Some(aggregation) => format!("{} {aggregation}", def.hit_policy),
                None => def.hit_policy.clone(),
            };
            error!("unsupported hit policy '{shown}' in decision table '{decision_name}'");
            model.add_message(
                Severity::Error,
                format!("unsupported hit policy '{shown}' in decision table '{decision_name}'"),
                source_id,
            );
            return None;
        };

        let tests = UnaryTestCompiler::new(self.feel);

        let mut inputs = Vec::with_capacity(def.inputs.len());
        for clause in &def.inputs {
            let allowed_tests = match &clause.input_values {
                Some(values) => tests.compile(
                    model,
                    source_id,
                    &format!(
                        "input values '{}' of decision table '{decision_name}'",
                        values.text
                    ),
                    &values.text,
                )?,
                None => Vec::new(),
            };
            inputs.push(DtInputClause {
                input_expression: clause.input_expression.text.clone(),
                input_values_text: clause.input_values.as_ref().map(|v| v.text.clone()),
                allowed_tests,
            });
        }

        let mut outputs = Vec::with_capacity(def.outputs.len());
        for clause in &def.outputs {
            let output_values = match &clause.output_values {
                Some(values) => tests.compile(
                    model,
                    source_id,
                    &format!(
                        "output values '{}' of decision table '{decision_name}'",
                        values.text
                    ),
                    &values.text,
                )?,
                None => Vec::new(),
            };
            outputs.push(DtOutputClause {
                name: clause.name.clone(),
                id: clause.id.clone(),
                output_values,
            });
        }

        if !self.check_aggregation(model, source_id, decision_name, hit_policy, &outputs) {
            return None;
        }

        let mut rules = Vec::with_capacity(def.rules.len());
        for (index, rule) in def.rules.iter().enumerate() {
            if rule.input_entries.len() != inputs.len() {
                let text = format!(
                    "rule {} of decision table '{decision_name}' has {} input entries, expected {}",
                    index + 1,
                    rule.input_entries.len(),
                    inputs.len()
                );
                error!("{text}");
                model.add_message(Severity::Error, text, source_id);
                return None;
            }
            if rule.output_entries.len() != outputs.len() {
                let text = format!(
                    "rule {} of decision table '{decision_name}' has {} output entries, expected {}",
                    index + 1,
                    rule.output_entries.len(),
                    outputs.len()
                );
                error!("{text}");
                model.add_message(Severity::Error, text, source_id);
                return None;
            }

            let mut input_entries = Vec::with_capacity(rule.input_entries.len());
            for (column, cell) in rule.input_entries.iter().enumerate() {
                let compiled = tests.compile(
                    model,
                    source_id,
                    &format!(
                        "input entry '{}' (rule {}, column {}) of decision table '{decision_name}'",
                        cell.text,
                        index + 1,
                        column + 1
                    ),
                    &cell.text,
                )?;
                input_entries.push(compiled);
            }
            rules.push(DtRule {
                index,
                input_entries,
                output_entries: rule.output_entries.iter().map(|e| e.text.clone()).collect(),
            });
        }

        Some(DecisionTable {
            name: decision_name.to_string(),
            parameter_names,
            inputs,
            outputs,
            rules,
            hit_policy,
        })
    }

    /// A numeric aggregation works over exactly one output column, and any
    /// output values declared on it must themselves be numbers. COUNT only
    /// counts matches, so it skips the numeric check.
    fn check_aggregation(
        &self,
        model: &mut DmnModel,
        source_id: Option<&str>,
        decision_name: &str,
        hit_policy: HitPolicy,
        outputs: &[DtOutputClause],
    ) -> bool {
        let HitPolicy::Collect(Some(aggregator)) = hit_policy else {
            return true;
        };
        if outputs.len() != 1 {
            let text = format!(
                "hit policy COLLECT {aggregator} requires a single output column, decision table '{decision_name}' has {}",
                outputs.len()
            );
            error!("{text}");
            model.add_message(Severity::Error, text, source_id);
            return false;
        }
        if matches!(
            aggregator,
            Aggregator::Sum | Aggregator::Min | Aggregator::Max
        ) {
            if let Some(value) = outputs[0]
                .output_values
                .iter()
                .find(|value| !matches!(value, Value::Number(_)))
            {
                let text = format!(
                    "output values of decision table '{decision_name}' must be numbers under COLLECT {aggregator}, found {value}"
                );
                error!("{text}");
                model.add_message(Severity::Error, text, source_id);
                return false;
            }
        }
        true
    }
}
