//! Marshalled document model
//!
//! The element tree an external marshaller produces from a persisted DMN
//! document. The compiler consumes it read-only; serde derives keep the
//! records front-end agnostic, so XML, JSON and YAML marshallers all land
//! on the same structs (the test fixtures use YAML).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Namespace URI of the FEEL built-in types.
pub const URI_FEEL: &str = "http://www.omg.org/spec/FEEL/20140401";

/// Root of a marshalled document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Definitions {
    pub id: Option<String>,
    pub name: String,
    /// The model's own namespace URI
    pub namespace: String,
    /// Prefix to namespace-URI bindings visible to every element
    pub namespaces: HashMap<String, String>,
    pub item_definitions: Vec<ItemDefinition>,
    pub drg_elements: Vec<DrgElement>,
}

impl Definitions {
    /// Resolve a namespace prefix declared on the document.
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }
}

/// A declared type: either an alias of another type reference (optionally
/// constrained by allowed values) or a composite assembled from components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemDefinition {
    pub id: Option<String>,
    pub name: String,
    pub type_ref: Option<String>,
    pub allowed_values: Option<UnaryTests>,
    pub item_components: Vec<ItemDefinition>,
    pub is_collection: bool,
}

/// A node of the decision requirements graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrgElement {
    InputData(InputData),
    Decision(Decision),
}

/// An externally supplied value, exposed under its variable's name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputData {
    pub id: String,
    pub variable: Option<InformationItem>,
}

/// The variable an element binds: its name and declared type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationItem {
    pub name: String,
    pub type_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Decision {
    pub id: String,
    pub name: String,
    pub variable: Option<InformationItem>,
    pub expression: Option<ExpressionDef>,
    pub information_requirements: Vec<InformationRequirement>,
}

/// A requirement edge: exactly one of the two references is expected.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationRequirement {
    pub required_input: Option<ElementReference>,
    pub required_decision: Option<ElementReference>,
}

/// An href-style reference to another element, e.g. `#monthly-salary`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementReference {
    pub href: String,
}

impl ElementReference {
    /// The referenced element id with the local fragment marker stripped.
    pub fn target_id(&self) -> &str {
        self.href.strip_prefix('#').unwrap_or(&self.href)
    }
}

/// The decision logic attached to a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionDef {
    LiteralExpression(LiteralExpression),
    DecisionTable(DecisionTableDef),
    /// Expression kinds outside the compiler's scope (context, invocation,
    /// relation, ...), carried as their document kind name
    Unsupported(String),
}

impl ExpressionDef {
    pub fn kind_name(&self) -> &str {
        match self {
            ExpressionDef::LiteralExpression(_) => "literalExpression",
            ExpressionDef::DecisionTable(_) => "decisionTable",
            ExpressionDef::Unsupported(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteralExpression {
    pub id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTableDef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default = "default_hit_policy")]
    pub hit_policy: String,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputClauseDef>,
    #[serde(default)]
    pub outputs: Vec<OutputClauseDef>,
    #[serde(default)]
    pub rules: Vec<DecisionRuleDef>,
}

impl Default for DecisionTableDef {
    fn default() -> Self {
        DecisionTableDef {
            id: None,
            hit_policy: default_hit_policy(),
            aggregation: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            rules: Vec::new(),
        }
    }
}

fn default_hit_policy() -> String {
    "UNIQUE".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputClauseDef {
    pub id: Option<String>,
    pub input_expression: LiteralExpression,
    pub input_values: Option<UnaryTests>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputClauseDef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub type_ref: Option<String>,
    pub output_values: Option<UnaryTests>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionRuleDef {
    pub id: Option<String>,
    pub input_entries: Vec<UnaryTests>,
    pub output_entries: Vec<LiteralExpression>,
}

/// Cell text in the unary-test grammar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnaryTests {
    pub text: String,
}

impl UnaryTests {
    pub fn new(text: impl Into<String>) -> Self {
        UnaryTests { text: text.into() }
    }
}

/// Split a qualified type reference into its prefix and local parts.
pub fn split_type_ref(type_ref: &str) -> (Option<&str>, &str) {
    match type_ref.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, type_ref),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id_strips_fragment() {
        let reference = ElementReference {
            href: "#monthly-salary".to_string(),
        };
        assert_eq!(reference.target_id(), "monthly-salary");
        let plain = ElementReference {
            href: "already-plain".to_string(),
        };
        assert_eq!(plain.target_id(), "already-plain");
    }

    #[test]
    fn test_split_type_ref() {
        assert_eq!(split_type_ref("feel:number"), (Some("feel"), "number"));
        assert_eq!(split_type_ref("tPerson"), (None, "tPerson"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let yaml = r##"
name: Example
namespace: "https://example.org/model"
namespaces:
  feel: "http://www.omg.org/spec/FEEL/20140401"
drg_elements:
  - input_data:
      id: i1
      variable:
        name: Age
        type_ref: "feel:number"
  - decision:
      id: d1
      name: Verdict
      expression:
        literal_expression:
          text: "Age >= 18"
      information_requirements:
        - required_input:
            href: "#i1"
"##;
        let definitions: Definitions = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definitions.name, "Example");
        assert_eq!(definitions.drg_elements.len(), 2);
        match &definitions.drg_elements[1] {
            DrgElement::Decision(decision) => {
                assert_eq!(decision.name, "Verdict");
                assert_eq!(
                    decision.information_requirements[0]
                        .required_input
                        .as_ref()
                        .unwrap()
                        .target_id(),
                    "i1"
                );
            }
            other => panic!("expected decision, got {other:?}"),
        }
    }

    #[test]
    fn test_hit_policy_defaults_to_unique() {
        let yaml = r#"
decision_table:
  outputs:
    - name: out
"#;
        let expr: ExpressionDef = serde_yaml::from_str(yaml).unwrap();
        match expr {
            ExpressionDef::DecisionTable(table) => assert_eq!(table.hit_policy, "UNIQUE"),
            other => panic!("expected decision table, got {other:?}"),
        }
    }
}
