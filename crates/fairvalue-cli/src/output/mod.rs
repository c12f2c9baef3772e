pub mod csv_out;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => print_minimal(value),
    }
}

/// Pretty-print the full envelope as JSON.
fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Print just the key answer value from the output.
fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // The per-share answer for a valuation, the base case for a sweep
    let priority_keys = [
        "fair_value_per_share",
        "base_case_value",
        "enterprise_value",
        "equity_value",
    ];

    if let Value::Object(map) = result {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar_to_string(val));
                    return;
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar_to_string(val));
            return;
        }
    }

    println!("{}", scalar_to_string(result));
}

/// Render a JSON leaf for display. Decimal fields arrive as strings on
/// the wire; compound values fall back to compact JSON.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
