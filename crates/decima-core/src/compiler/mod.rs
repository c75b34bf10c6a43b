//! The semantic compiler
//!
//! Transforms a marshalled document tree into a compiled [`DmnModel`] in
//! three passes: item definitions become shared types, DRG elements become
//! typed nodes with linked requirement edges, and each decision's
//! expression is compiled into an evaluator. Problems are accumulated as
//! messages on the model; the compiler itself never fails, so a partially
//! invalid document still yields every compilable decision.

mod decision;
mod dtable;
mod linker;
mod types;

pub use decision::DecisionCompiler;
pub use dtable::{DecisionTableCompiler, UnaryTestCompiler};
pub use linker::ModelLinker;
pub use types::{ItemDefinitionCompiler, TypeResolver};

use decima_feel::Feel;

use crate::document::Definitions;
use crate::model::DmnModel;

/// Compiles marshalled definitions into an immutable model.
#[derive(Debug, Clone, Copy, Default)]
pub struct DmnCompiler {
    feel: Feel,
}

impl DmnCompiler {
    pub fn new() -> Self {
        DmnCompiler { feel: Feel::new() }
    }

    /// Compile a document tree. Always returns a model; inspect
    /// [`DmnModel::messages`] for anything that went wrong along the way.
    pub fn compile(&self, definitions: &Definitions) -> DmnModel {
        let mut model = DmnModel::new(&definitions.namespace, &definitions.name);
        ItemDefinitionCompiler::new(&self.feel).process_item_definitions(&mut model, definitions);
        ModelLinker::new().process_drg_elements(&mut model, definitions);
        DecisionCompiler::new(&self.feel).compile_decisions(&mut model, definitions);
        model
    }
}
