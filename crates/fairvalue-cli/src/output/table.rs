use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::scalar_to_string;

/// Format an engine result as tables: a field/value summary plus, where
/// present, the FCF schedule or the sensitivity grid.
pub fn print_table(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) if map.contains_key("fcf_table") => {
            print_valuation_summary(map);
            if let Some(Value::Array(rows)) = map.get("fcf_table") {
                println!();
                print_fcf_schedule(rows);
            }
        }
        Value::Object(map) if map.contains_key("fair_values") => {
            print_sensitivity_grid(map);
        }
        _ => print_flat_object(result),
    }

    print_envelope_footer(value);
}

fn print_valuation_summary(map: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if key == "fcf_table" {
            continue;
        }
        builder.push_record([key.as_str(), &scalar_to_string(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_fcf_schedule(rows: &[Value]) {
    let columns = [
        ("revenue", "Revenue"),
        ("ebit", "EBIT"),
        ("tax", "Tax"),
        ("nopat", "NOPAT"),
        ("plus_depreciation", "Depreciation"),
        ("less_capex", "CapEx"),
        ("less_wc_change", "WC Change"),
        ("fcf", "FCF"),
        ("discount_factor", "Discount"),
        ("pv_fcf", "PV of FCF"),
    ];

    let mut builder = Builder::default();
    let mut header = vec!["Year".to_string()];
    header.extend(columns.iter().map(|(_, label)| label.to_string()));
    builder.push_record(header);

    for row in rows {
        let year = row
            .get("period")
            .and_then(|p| p.get("year"))
            .map(scalar_to_string)
            .unwrap_or_default();
        let mut record = vec![year];
        record.extend(
            columns
                .iter()
                .map(|(key, _)| row.get(*key).map(scalar_to_string).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_sensitivity_grid(map: &serde_json::Map<String, Value>) {
    let empty = Vec::new();
    let growth_values = map
        .get("growth_values")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);
    let ebit_values = map
        .get("ebit_values")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);
    let matrix = map
        .get("fair_values")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);

    // EBIT margin varies down rows, growth across columns
    let mut builder = Builder::default();
    let mut header = vec!["EBIT % \\ Growth %".to_string()];
    header.extend(growth_values.iter().map(scalar_to_string));
    builder.push_record(header);

    for (ebit, row) in ebit_values.iter().zip(matrix) {
        let mut record = vec![scalar_to_string(ebit)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(scalar_to_string));
        }
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &scalar_to_string(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn print_envelope_footer(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = value.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}
