//! Decision logic compilation
//!
//! The last compiler pass. Dispatches on each decision's expression kind:
//! a literal expression compiles through the FEEL engine with the
//! decision's dependency names declared as unknown-typed inputs, a
//! decision table goes through [`DecisionTableCompiler`]. Anything else,
//! or a missing expression, reports an error and leaves the decision
//! without an evaluator.

use decima_feel::{BuiltInType, CompilerContext, Feel};
use log::error;

use super::dtable::DecisionTableCompiler;
use crate::ast::DecisionEvaluator;
use crate::document::{Definitions, DrgElement, ExpressionDef};
use crate::message::Severity;
use crate::model::DmnModel;

pub struct DecisionCompiler<'a> {
    feel: &'a Feel,
}

impl<'a> DecisionCompiler<'a> {
    pub fn new(feel: &'a Feel) -> Self {
        DecisionCompiler { feel }
    }

    pub fn compile_decisions(&self, model: &mut DmnModel, definitions: &Definitions) {
        for element in &definitions.drg_elements {
            let DrgElement::Decision(decision) = element else {
                continue;
            };
            // cyclic decisions were already reported by the linker
            if model.is_on_requirement_cycle(&decision.id) {
                continue;
            }
            let Some(node) = model.decision_by_id(&decision.id) else {
                continue;
            };
            let dependency_names = node.dependency_names();

            match &decision.expression {
                Some(ExpressionDef::LiteralExpression(literal)) => {
                    let mut ctx = CompilerContext::new();
                    for name in &dependency_names {
                        ctx.add_input_variable_type(name, BuiltInType::Unknown);
                    }
                    match self.feel.compile(&literal.text, &ctx) {
                        Ok(compiled) => {
                            model.attach_evaluator(&decision.id, DecisionEvaluator::Literal(compiled));
                        }
                        Err(e) => {
                            error!("expression of decision '{}' failed to compile: {e}", decision.name);
                            model.add_message(
                                Severity::Error,
                                format!(
                                    "expression '{}' of decision '{}' failed to compile: {e}",
                                    literal.text, decision.name
                                ),
                                Some(&decision.id),
                            );
                        }
                    }
                }
                Some(ExpressionDef::DecisionTable(table)) => {
                    let compiler = DecisionTableCompiler::new(self.feel);
                    if let Some(compiled) = compiler.compile(
                        model,
                        &decision.id,
                        &decision.name,
                        dependency_names,
                        table,
                    ) {
                        model.attach_evaluator(&decision.id, DecisionEvaluator::Table(compiled));
                    }
                }
                Some(other) => {
                    error!(
                        "expression type '{}' of decision '{}' is not supported",
                        other.kind_name(),
                        decision.name
                    );
                    model.add_message(
                        Severity::Error,
                        format!(
                            "expression type '{}' of decision '{}' is not supported",
                            other.kind_name(),
                            decision.name
                        ),
                        Some(&decision.id),
                    );
                }
                None => {
                    error!("no expression defined for decision '{}'", decision.name);
                    model.add_message(
                        Severity::Error,
                        format!("no expression defined for decision '{}'", decision.name),
                        Some(&decision.id),
                    );
                }
            }
        }
    }
}
