//! Shipment routing with ranked and collecting hit policies
//!
//! This example demonstrates:
//! - A PRIORITY decision table choosing a carrier by declared ranking
//! - A COLLECT SUM decision table accumulating surcharges
//! - A literal decision combining both results into a routing label

use decima_core::{Definitions, DmnCompiler, DmnContext, DmnRuntime};

const ROUTING_MODEL: &str = r##"
name: Shipment Routing
namespace: "https://example.org/shipment-routing"
namespaces:
  feel: "http://www.omg.org/spec/FEEL/20140401"
drg_elements:
  - input_data:
      id: i-weight
      variable:
        name: weightKg
        type_ref: "feel:number"
  - input_data:
      id: i-express
      variable:
        name: express
        type_ref: "feel:boolean"
  - input_data:
      id: i-zone
      variable:
        name: zone
        type_ref: "feel:string"
  - decision:
      id: d-carrier
      name: Carrier
      expression:
        decision_table:
          hit_policy: PRIORITY
          inputs:
            - input_expression:
                text: express
            - input_expression:
                text: weightKg
          outputs:
            - name: carrier
              output_values:
                text: '"AIR", "ROAD", "RAIL"'
          rules:
            - input_entries:
                - text: "true"
                - text: "< 200"
              output_entries:
                - text: '"AIR"'
            - input_entries:
                - text: "-"
                - text: ">= 100"
              output_entries:
                - text: '"RAIL"'
            - input_entries:
                - text: "-"
                - text: "< 100"
              output_entries:
                - text: '"ROAD"'
      information_requirements:
        - required_input:
            href: "#i-express"
        - required_input:
            href: "#i-weight"
  - decision:
      id: d-surcharge
      name: Surcharge
      expression:
        decision_table:
          hit_policy: COLLECT
          aggregation: SUM
          inputs:
            - input_expression:
                text: express
            - input_expression:
                text: weightKg
            - input_expression:
                text: zone
          outputs:
            - name: fee
          rules:
            - input_entries:
                - text: "true"
                - text: "-"
                - text: "-"
              output_entries:
                - text: "12"
            - input_entries:
                - text: "-"
                - text: "> 50"
                - text: "-"
              output_entries:
                - text: "8"
            - input_entries:
                - text: "-"
                - text: "-"
                - text: '"REMOTE"'
              output_entries:
                - text: "15"
      information_requirements:
        - required_input:
            href: "#i-express"
        - required_input:
            href: "#i-weight"
        - required_input:
            href: "#i-zone"
  - decision:
      id: d-route
      name: Route
      expression:
        literal_expression:
          text: 'Carrier + " to " + zone'
      information_requirements:
        - required_decision:
            href: "#d-carrier"
        - required_input:
            href: "#i-zone"
"##;

fn main() -> anyhow::Result<()> {
    println!("=== Shipment Routing Example ===\n");

    let definitions: Definitions = serde_yaml::from_str(ROUTING_MODEL)?;
    let model = DmnCompiler::new().compile(&definitions);
    for message in model.messages() {
        println!("{message}");
    }

    let runtime = DmnRuntime::new();
    let shipments = [
        serde_json::json!({"weightKg": 12, "express": true, "zone": "CITY"}),
        serde_json::json!({"weightKg": 140, "express": false, "zone": "REMOTE"}),
        serde_json::json!({"weightKg": 60, "express": false, "zone": "CITY"}),
    ];

    for (index, shipment) in shipments.iter().enumerate() {
        let input = DmnContext::from_json(shipment);
        let result = runtime.evaluate_all(&model, &input);

        println!("Shipment {} ({shipment}):", index + 1);
        for decision in &result.decision_results {
            match &decision.result {
                Ok(value) => println!("  {} = {value}", decision.decision_name),
                Err(e) => println!("  {} failed: {e}", decision.decision_name),
            }
        }
        println!();
    }

    Ok(())
}
