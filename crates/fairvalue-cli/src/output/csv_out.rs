use serde_json::Value;
use std::io;

use super::scalar_to_string;

/// Write output as CSV to stdout: the FCF schedule for a valuation, the
/// grid for a sensitivity sweep, field/value pairs otherwise.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) if map.contains_key("fcf_table") => {
            if let Some(Value::Array(rows)) = map.get("fcf_table") {
                write_fcf_schedule(&mut wtr, rows);
            }
        }
        Value::Object(map) if map.contains_key("fair_values") => {
            write_sensitivity_grid(&mut wtr, map);
        }
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), &scalar_to_string(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&scalar_to_string(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fcf_schedule(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let columns = [
        "revenue",
        "ebit",
        "tax",
        "nopat",
        "plus_depreciation",
        "less_capex",
        "less_wc_change",
        "fcf",
        "discount_factor",
        "pv_fcf",
    ];

    let mut header = vec!["year".to_string()];
    header.extend(columns.iter().map(|c| c.to_string()));
    let _ = wtr.write_record(&header);

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
                .map(|key| row.get(*key).map(scalar_to_string).unwrap_or_default()),
        );
        let _ = wtr.write_record(&record);
    }
}

fn write_sensitivity_grid(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    map: &serde_json::Map<String, Value>,
) {
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

    let mut header = vec!["ebit_margin".to_string()];
    header.extend(growth_values.iter().map(scalar_to_string));
    let _ = wtr.write_record(&header);

    for (ebit, row) in ebit_values.iter().zip(matrix) {
        let mut record = vec![scalar_to_string(ebit)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(scalar_to_string));
        }
        let _ = wtr.write_record(&record);
    }
}
