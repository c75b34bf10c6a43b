//! Loan approval walkthrough
//!
//! This example demonstrates:
//! - Compiling a marshalled decision document into an executable model
//! - Item definitions with allowed values
//! - A UNIQUE decision table feeding downstream literal decisions
//! - Evaluating the whole model for several applicants

use decima_core::{Definitions, DmnCompiler, DmnContext, DmnResult, DmnRuntime};

const LOAN_MODEL: &str = r##"
name: Loan Approval
namespace: "https://example.org/loan-approval"
namespaces:
  feel: "http://www.omg.org/spec/FEEL/20140401"
item_definitions:
  - name: tRiskClass
    type_ref: "feel:string"
    allowed_values:
      text: '"LOW", "MEDIUM", "HIGH"'
drg_elements:
  - input_data:
      id: i-age
      variable:
        name: age
        type_ref: "feel:number"
  - input_data:
      id: i-income
      variable:
        name: monthlyIncome
        type_ref: "feel:number"
  - input_data:
      id: i-score
      variable:
        name: creditScore
        type_ref: "feel:number"
  - decision:
      id: d-risk
      name: Risk
      variable:
        name: Risk
        type_ref: tRiskClass
      expression:
        decision_table:
          hit_policy: UNIQUE
          inputs:
            - input_expression:
                text: creditScore
          outputs:
            - name: riskClass
          rules:
            - input_entries:
                - text: "< 580"
              output_entries:
                - text: '"HIGH"'
            - input_entries:
                - text: "[580..700)"
              output_entries:
                - text: '"MEDIUM"'
            - input_entries:
                - text: ">= 700"
              output_entries:
                - text: '"LOW"'
      information_requirements:
        - required_input:
            href: "#i-score"
  - decision:
      id: d-budget
      name: Budget
      expression:
        literal_expression:
          text: "monthlyIncome * 0.35"
      information_requirements:
        - required_input:
            href: "#i-income"
  - decision:
      id: d-approval
      name: Approval
      expression:
        decision_table:
          hit_policy: FIRST
          inputs:
            - input_expression:
                text: age
            - input_expression:
                text: Risk
            - input_expression:
                text: Budget
          outputs:
            - name: verdict
          rules:
            - input_entries:
                - text: "< 21"
                - text: "-"
                - text: "-"
              output_entries:
                - text: '"DECLINED"'
            - input_entries:
                - text: "-"
                - text: '"HIGH"'
                - text: "-"
              output_entries:
                - text: '"DECLINED"'
            - input_entries:
                - text: "-"
                - text: '"MEDIUM"'
                - text: ">= 900"
              output_entries:
                - text: '"REFERRED"'
            - input_entries:
                - text: "-"
                - text: '"LOW"'
                - text: "-"
              output_entries:
                - text: '"APPROVED"'
      information_requirements:
        - required_input:
            href: "#i-age"
        - required_decision:
            href: "#d-risk"
        - required_decision:
            href: "#d-budget"
"##;

fn main() -> anyhow::Result<()> {
    println!("=== Loan Approval Example ===\n");

    let definitions: Definitions = serde_yaml::from_str(LOAN_MODEL)?;
    let model = DmnCompiler::new().compile(&definitions);

    println!("Compiled model '{}'", model.name);
    println!("  inputs: {}", model.inputs().len());
    println!("  decisions: {}", model.decisions().len());
    for message in model.messages() {
        println!("  {message}");
    }
    println!();

    let runtime = DmnRuntime::new();

    let applicants = [
        ("Ada", serde_json::json!({"age": 35, "monthlyIncome": 4200, "creditScore": 745})),
        ("Ben", serde_json::json!({"age": 28, "monthlyIncome": 2600, "creditScore": 640})),
        ("Cleo", serde_json::json!({"age": 19, "monthlyIncome": 1800, "creditScore": 710})),
    ];

    for (name, data) in &applicants {
        let input = DmnContext::from_json(data);
        let result = runtime.evaluate_all(&model, &input);
        print_result(name, &result);
    }

    Ok(())
}

fn print_result(applicant: &str, result: &DmnResult) {
    println!("Applicant {applicant}:");
    for decision in &result.decision_results {
        match &decision.result {
            Ok(value) => println!("  {} = {value}", decision.decision_name),
            Err(e) => println!("  {} failed: {e}", decision.decision_name),
        }
    }
    for message in &result.messages {
        println!("  {message}");
    }
    println!();
}
