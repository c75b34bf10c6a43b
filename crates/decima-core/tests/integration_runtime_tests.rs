//! End-to-end tests: marshalled document to evaluated decisions
//!
//! Each scenario compiles a YAML fixture into a model and runs it through
//! the runtime, checking decision values, the result context and the
//! containment of per-decision failures.

use decima_core::{
    DecisionTableError, Definitions, DmnCompiler, DmnContext, DmnModel, DmnRuntime,
    EvaluationError, Severity, Value,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn compile_yaml(yaml: &str) -> DmnModel {
    let definitions: Definitions = serde_yaml::from_str(yaml).expect("fixture must deserialize");
    let model = DmnCompiler::new().compile(&definitions);
    assert!(
        !model.has_errors(),
        "unexpected compile errors: {:?}",
        model.error_messages().collect::<Vec<_>>()
    );
    model
}

fn compile_yaml_lenient(yaml: &str) -> DmnModel {
    let definitions: Definitions = serde_yaml::from_str(yaml).expect("fixture must deserialize");
    DmnCompiler::new().compile(&definitions)
}

fn num(n: i64) -> Value {
    Value::Number(Decimal::from(n))
}

fn dec(text: &str) -> Value {
    Value::Number(Decimal::from_str(text).unwrap())
}

const HEADER: &str = r#"
name: Scenarios
namespace: "https://example.org/scenarios"
namespaces:
  feel: "http://www.omg.org/spec/FEEL/20140401"
"#;

fn with_header(body: &str) -> String {
    format!("{HEADER}{body}")
}

// =============================================================================
// Literal Decision Chains
// =============================================================================

const ADULT_GREETING: &str = r##"
drg_elements:
  - input_data:
      id: i-age
      variable:
        name: Age
        type_ref: "feel:number"
  - decision:
      id: d-adult
      name: Adult
      expression:
        literal_expression:
          text: "Age >= 18"
      information_requirements:
        - required_input:
            href: "#i-age"
  - decision:
      id: d-greeting
      name: Greeting
      expression:
        literal_expression:
          text: 'if Adult then "welcome" else "come back later"'
      information_requirements:
        - required_decision:
            href: "#d-adult"
"##;

#[test]
fn test_literal_chain_evaluates_in_order() {
    let model = compile_yaml(&with_header(ADULT_GREETING));
    let runtime = DmnRuntime::new();
    let input = DmnContext::new().with_value("Age", num(21));

    let result = runtime.evaluate_all(&model, &input);
    assert_eq!(result.value("Adult"), Some(&Value::Boolean(true)));
    assert_eq!(
        result.value("Greeting"),
        Some(&Value::String("welcome".to_string()))
    );
    assert!(result.messages.is_empty());

    // the result context carries inputs and decision values side by side
    assert_eq!(result.context.get("Age"), Some(&num(21)));
    assert_eq!(result.context.get("Adult"), Some(&Value::Boolean(true)));
}

#[test]
fn test_missing_input_warns_once_and_binds_null() {
    let model = compile_yaml(&with_header(ADULT_GREETING));
    let runtime = DmnRuntime::new();

    let result = runtime.evaluate_all(&model, &DmnContext::new());
    // null is not >= 18, the comparison itself is unknown
    assert_eq!(result.value("Adult"), Some(&Value::Null));
    // a non-true condition takes the else branch
    assert_eq!(
        result.value("Greeting"),
        Some(&Value::String("come back later".to_string()))
    );

    let warnings: Vec<_> = result
        .messages
        .iter()
        .filter(|m| m.severity == Severity::Warn)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].text.contains("no value provided for input data 'Age'"));
}

#[test]
fn test_evaluate_single_decision_pulls_requirements() {
    let model = compile_yaml(&with_header(ADULT_GREETING));
    let runtime = DmnRuntime::new();
    let input = DmnContext::new().with_value("Age", num(16));

    let result = runtime.evaluate_decision(&model, "Greeting", &input);
    assert_eq!(result.decision_results.len(), 1);
    assert_eq!(
        result.value("Greeting"),
        Some(&Value::String("come back later".to_string()))
    );
    // the required decision was computed on the way and lands in the context
    assert_eq!(result.context.get("Adult"), Some(&Value::Boolean(false)));

    // addressing the same decision by element id gives the same outcome
    let by_id = runtime.evaluate_decision_by_id(&model, "d-greeting", &input);
    assert_eq!(by_id.value("Greeting"), result.value("Greeting"));
}

#[test]
fn test_unknown_decision_name_is_reported() {
    let model = compile_yaml(&with_header(ADULT_GREETING));
    let runtime = DmnRuntime::new();

    let result = runtime.evaluate_decision(&model, "Nope", &DmnContext::new());
    assert!(result.decision_results.is_empty());
    assert!(result
        .messages
        .iter()
        .any(|m| m.is_error() && m.text.contains("no decision named 'Nope'")));
}

#[test]
fn test_diamond_dependencies_evaluate_consistently() {
    let model = compile_yaml(&with_header(
        r##"
drg_elements:
  - input_data:
      id: i-base
      variable:
        name: Start
        type_ref: "feel:number"
  - decision:
      id: d-base
      name: Base
      expression:
        literal_expression:
          text: "Start + 1"
      information_requirements:
        - required_input:
            href: "#i-base"
  - decision:
      id: d-left
      name: Left
      expression:
        literal_expression:
          text: "Base * 2"
      information_requirements:
        - required_decision:
            href: "#d-base"
  - decision:
      id: d-right
      name: Right
      expression:
        literal_expression:
          text: "Base * 3"
      information_requirements:
        - required_decision:
            href: "#d-base"
  - decision:
      id: d-top
      name: Top
      expression:
        literal_expression:
          text: "Left + Right"
      information_requirements:
        - required_decision:
            href: "#d-left"
        - required_decision:
            href: "#d-right"
"##,
    ));
    let runtime = DmnRuntime::new();
    let input = DmnContext::new().with_value("Start", num(9));

    let result = runtime.evaluate_all(&model, &input);
    assert_eq!(result.value("Base"), Some(&num(10)));
    assert_eq!(result.value("Top"), Some(&num(50)));
    // every decision reports exactly once even though Base is required twice
    assert_eq!(result.decision_results.len(), 4);
}

// =============================================================================
// Decision Tables in a Model
// =============================================================================

const DISCOUNT_MODEL: &str = r##"
drg_elements:
  - input_data:
      id: i-customer
      variable:
        name: customer
        type_ref: "feel:string"
  - input_data:
      id: i-size
      variable:
        name: orderSize
        type_ref: "feel:number"
  - decision:
      id: d-discount
      name: Discount
      expression:
        decision_table:
          hit_policy: UNIQUE
          inputs:
            - input_expression:
                text: customer
              input_values:
                text: '"Business", "Private"'
            - input_expression:
                text: orderSize
          outputs:
            - name: discount
          rules:
            - input_entries:
                - text: '"Business"'
                - text: "< 10"
              output_entries:
                - text: "0.10"
            - input_entries:
                - text: '"Business"'
                - text: ">= 10"
              output_entries:
                - text: "0.15"
            - input_entries:
                - text: '"Private"'
                - text: "-"
              output_entries:
                - text: "0.05"
      information_requirements:
        - required_input:
            href: "#i-customer"
        - required_input:
            href: "#i-size"
"##;

#[test]
fn test_decision_table_end_to_end() {
    let model = compile_yaml(&with_header(DISCOUNT_MODEL));
    let runtime = DmnRuntime::new();

    let input = DmnContext::new()
        .with_value("customer", Value::String("Business".to_string()))
        .with_value("orderSize", num(15));
    let result = runtime.evaluate_all(&model, &input);
    assert_eq!(result.value("Discount"), Some(&dec("0.15")));

    let input = DmnContext::new()
        .with_value("customer", Value::String("Private".to_string()))
        .with_value("orderSize", num(2));
    let result = runtime.evaluate_all(&model, &input);
    assert_eq!(result.value("Discount"), Some(&dec("0.05")));
}

#[test]
fn test_table_input_outside_allowed_values_fails_that_decision() {
    let model = compile_yaml(&with_header(DISCOUNT_MODEL));
    let runtime = DmnRuntime::new();

    let input = DmnContext::new()
        .with_value("customer", Value::String("Reseller".to_string()))
        .with_value("orderSize", num(2));
    let result = runtime.evaluate_all(&model, &input);
    match &result.decision_result("Discount").unwrap().result {
        Err(EvaluationError::Table(DecisionTableError::InputMismatch { value, .. })) => {
            assert_eq!(value, "Reseller");
        }
        other => panic!("expected input mismatch, got {other:?}"),
    }
    // nothing for the failed decision shows up in the context
    assert!(result.context.get("Discount").is_none());
}

#[test]
fn test_unique_overlap_surfaces_as_evaluation_error() {
    let model = compile_yaml(&with_header(
        r##"
drg_elements:
  - input_data:
      id: i-n
      variable:
        name: n
        type_ref: "feel:number"
  - decision:
      id: d-band
      name: Band
      expression:
        decision_table:
          hit_policy: UNIQUE
          inputs:
            - input_expression:
                text: n
          outputs:
            - name: band
          rules:
            - input_entries:
                - text: "> 0"
              output_entries:
                - text: '"positive"'
            - input_entries:
                - text: "> 10"
              output_entries:
                - text: '"large"'
      information_requirements:
        - required_input:
            href: "#i-n"
"##,
    ));
    let runtime = DmnRuntime::new();

    let result = runtime.evaluate_all(&model, &DmnContext::new().with_value("n", num(20)));
    match &result.decision_result("Band").unwrap().result {
        Err(EvaluationError::Table(DecisionTableError::Overlap { rules, .. })) => {
            assert_eq!(rules, &vec![0, 1]);
        }
        other => panic!("expected overlap, got {other:?}"),
    }

    // a value matching only one rule is fine
    let result = runtime.evaluate_all(&model, &DmnContext::new().with_value("n", num(5)));
    assert_eq!(
        result.value("Band"),
        Some(&Value::String("positive".to_string()))
    );
}

#[test]
fn test_collect_sum_through_model() {
    let model = compile_yaml(&with_header(
        r##"
drg_elements:
  - input_data:
      id: i-student
      variable:
        name: student
        type_ref: "feel:boolean"
  - input_data:
      id: i-member
      variable:
        name: member
        type_ref: "feel:boolean"
  - decision:
      id: d-points
      name: Points
      expression:
        decision_table:
          hit_policy: COLLECT
          aggregation: SUM
          inputs:
            - input_expression:
                text: student
            - input_expression:
                text: member
          outputs:
            - name: points
          rules:
            - input_entries:
                - text: "true"
                - text: "-"
              output_entries:
                - text: "10"
            - input_entries:
                - text: "-"
                - text: "true"
              output_entries:
                - text: "25"
      information_requirements:
        - required_input:
            href: "#i-student"
        - required_input:
            href: "#i-member"
"##,
    ));
    let runtime = DmnRuntime::new();

    let input = DmnContext::new()
        .with_value("student", Value::Boolean(true))
        .with_value("member", Value::Boolean(true));
    assert_eq!(runtime.evaluate_all(&model, &input).value("Points"), Some(&num(35)));

    let input = DmnContext::new()
        .with_value("student", Value::Boolean(false))
        .with_value("member", Value::Boolean(true));
    assert_eq!(runtime.evaluate_all(&model, &input).value("Points"), Some(&num(25)));
}

#[test]
fn test_priority_policy_through_model() {
    let model = compile_yaml(&with_header(
        r##"
drg_elements:
  - input_data:
      id: i-score
      variable:
        name: score
        type_ref: "feel:number"
  - decision:
      id: d-risk
      name: Risk
      expression:
        decision_table:
          hit_policy: PRIORITY
          inputs:
            - input_expression:
                text: score
          outputs:
            - name: risk
              output_values:
                text: '"HIGH", "LOW"'
          rules:
            - input_entries:
                - text: "< 600"
              output_entries:
                - text: '"HIGH"'
            - input_entries:
                - text: "< 700"
              output_entries:
                - text: '"LOW"'
      information_requirements:
        - required_input:
            href: "#i-score"
"##,
    ));
    let runtime = DmnRuntime::new();

    // both rules match; HIGH is declared first, so it wins
    let result = runtime.evaluate_all(&model, &DmnContext::new().with_value("score", num(550)));
    assert_eq!(result.value("Risk"), Some(&Value::String("HIGH".to_string())));

    let result = runtime.evaluate_all(&model, &DmnContext::new().with_value("score", num(650)));
    assert_eq!(result.value("Risk"), Some(&Value::String("LOW".to_string())));
}

// =============================================================================
// Failure Containment
// =============================================================================

#[test]
fn test_failed_dependency_is_isolated() {
    // Broken has no expression; Dependent needs it; Fine is unrelated
    let model = compile_yaml_lenient(&with_header(
        r##"
drg_elements:
  - decision:
      id: d-broken
      name: Broken
  - decision:
      id: d-dependent
      name: Dependent
      expression:
        literal_expression:
          text: "Broken = null"
      information_requirements:
        - required_decision:
            href: "#d-broken"
  - decision:
      id: d-fine
      name: Fine
      expression:
        literal_expression:
          text: '"still here"'
"##,
    ));
    assert!(model.has_errors());
    let runtime = DmnRuntime::new();
    let result = runtime.evaluate_all(&model, &DmnContext::new());

    match &result.decision_result("Broken").unwrap().result {
        Err(EvaluationError::NoEvaluator { decision }) => assert_eq!(decision, "Broken"),
        other => panic!("expected missing evaluator, got {other:?}"),
    }
    match &result.decision_result("Dependent").unwrap().result {
        Err(EvaluationError::DependencyFailed { dependency, .. }) => {
            assert_eq!(dependency, "Broken");
        }
        other => panic!("expected failed dependency, got {other:?}"),
    }
    assert_eq!(
        result.value("Fine"),
        Some(&Value::String("still here".to_string()))
    );
}

#[test]
fn test_cyclic_decisions_fail_only_themselves() {
    let model = compile_yaml_lenient(&with_header(
        r##"
drg_elements:
  - decision:
      id: d-a
      name: Alpha
      expression:
        literal_expression:
          text: Beta
      information_requirements:
        - required_decision:
            href: "#d-b"
  - decision:
      id: d-b
      name: Beta
      expression:
        literal_expression:
          text: Alpha
      information_requirements:
        - required_decision:
            href: "#d-a"
  - decision:
      id: d-solo
      name: Solo
      expression:
        literal_expression:
          text: "1 + 2"
"##,
    ));
    assert!(model.is_on_requirement_cycle("d-a"));
    let runtime = DmnRuntime::new();

    let result = runtime.evaluate_all(&model, &DmnContext::new());
    // the cyclic pair compiled without evaluators, so both fail
    assert!(result.decision_result("Alpha").unwrap().result.is_err());
    assert!(result.decision_result("Beta").unwrap().result.is_err());
    assert_eq!(result.value("Solo"), Some(&num(3)));
}
