//! Report output: delimited text or JSON.

use super::engine::QueryOutcome;
use crate::sparql::ResultTable;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};
use std::io::{self, Write};

pub const UNBOUND: &str = "<unbound>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Write `outcomes` to `out` in the requested format.
pub fn render<W: Write>(
    outcomes: &[QueryOutcome],
    format: OutputFormat,
    delimiter: &str,
    out: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => render_text(outcomes, delimiter, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &outcomes_to_json(outcomes))?;
            writeln!(out)
        }
    }
}

/// One block per query: name, description, then one line per row.
pub fn render_text<W: Write>(
    outcomes: &[QueryOutcome],
    delimiter: &str,
    out: &mut W,
) -> io::Result<()> {
    for outcome in outcomes {
        writeln!(out, "Query: {}", outcome.name)?;
        writeln!(out, "{}", outcome.description)?;
        match &outcome.result {
            Ok(table) => {
                for line in table_lines(table, delimiter) {
                    writeln!(out, "{line}")?;
                }
            }
            Err(error) => writeln!(out, "error: {error}")?,
        }
        writeln!(out)?;
    }
    Ok(())
}

fn table_lines(table: &ResultTable, delimiter: &str) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(value) => value.to_string(),
                    None => UNBOUND.to_string(),
                })
                .collect::<Vec<_>>()
                .join(delimiter)
        })
        .collect()
}

pub fn outcomes_to_json(outcomes: &[QueryOutcome]) -> JsonValue {
    let queries: Vec<JsonValue> = outcomes
        .iter()
        .map(|outcome| {
            let mut entry = json!({
                "name": outcome.name,
                "description": outcome.description,
                "shape": outcome.shape,
            });
            match &outcome.result {
                Ok(table) => {
                    entry["variables"] = json!(table.variables);
                    entry["rows"] = JsonValue::Array(
                        table
                            .rows
                            .iter()
                            .map(|row| {
                                let mut map = Map::new();
                                for (var, cell) in table.variables.iter().zip(row) {
                                    let value = cell
                                        .as_ref()
                                        .map(|v| v.to_json())
                                        .unwrap_or(JsonValue::Null);
                                    map.insert(var.clone(), value);
                                }
                                JsonValue::Object(map)
                            })
                            .collect(),
                    );
                    entry["error"] = JsonValue::Null;
                }
                Err(error) => {
                    entry["rows"] = JsonValue::Array(Vec::new());
                    entry["error"] = json!(error.to_string());
                }
            }
            entry
        })
        .collect();

    json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "queries": queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::report::ResultShape;
    use crate::sparql::TypedValue;

    fn outcomes() -> Vec<QueryOutcome> {
        vec![
            QueryOutcome {
                name: "cba_coverage".into(),
                description: "coverage".into(),
                shape: ResultShape::Rows,
                result: Ok(ResultTable {
                    variables: vec!["companyName".into(), "cbaPercentage".into()],
                    rows: vec![
                        vec![
                            Some(TypedValue::Literal("Acme".into())),
                            Some(TypedValue::Decimal(80.5)),
                        ],
                        vec![Some(TypedValue::Literal("Beta".into())), None],
                    ],
                }),
            },
            QueryOutcome {
                name: "ratio".into(),
                description: "ratio".into(),
                shape: ResultShape::SingleRow,
                result: Err(ReportError::DivisionByZero {
                    query: "ratio".into(),
                    denominator: "total".into(),
                }),
            },
        ]
    }

    #[test]
    fn text_rows_use_delimiter() {
        let mut out = Vec::new();
        render_text(&outcomes(), " | ", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Acme | 80.5\n"));
        assert!(text.contains("Beta | <unbound>\n"));
        assert!(text.contains("error: division by zero in 'ratio'"));
    }

    #[test]
    fn json_carries_rows_and_errors() {
        let json = outcomes_to_json(&outcomes());
        let queries = json["queries"].as_array().unwrap();
        assert_eq!(queries[0]["rows"][0]["companyName"], "Acme");
        assert_eq!(queries[0]["rows"][1]["cbaPercentage"], JsonValue::Null);
        assert_eq!(queries[0]["shape"], "rows");
        assert!(queries[1]["error"].as_str().unwrap().contains("division by zero"));
    }
}
