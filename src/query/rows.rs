//! Result materialization.
//!
//! With `JSON_ARRAY` format every cell arrives as a string (or null). The
//! manifest says what each column really is; booleans and numeric types are
//! converted back, everything else is passed through untouched.

use serde_json::{Map, Number, Value};

use super::{QueryError, QueryResult};

/// A row keyed by column name, in manifest column order.
pub type Row = Map<String, Value>;

/// One column of a result manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResultColumn {
    pub name: String,
    pub type_name: String,
}

/// Read the column list from a statement payload's manifest.
pub(crate) fn manifest_columns(payload: &Value) -> QueryResult<Vec<ResultColumn>> {
    let columns = payload
        .pointer("/manifest/schema/columns")
        .and_then(Value::as_array)
        .ok_or_else(|| QueryError::Malformed("result manifest has no column schema".to_string()))?;

    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| -> QueryResult<ResultColumn> {
            let name = column
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| QueryError::Malformed(format!("result column {} has no name", idx)))?;
            Ok(ResultColumn {
                name: name.to_string(),
                type_name: column
                    .get("type_name")
                    .and_then(Value::as_str)
                    .unwrap_or("STRING")
                    .to_ascii_uppercase(),
            })
        })
        .collect()
}

/// Convert the `data_array` of a result (or chunk) into rows.
///
/// Missing cells become null; surplus cells are ignored.
pub(crate) fn rows_from(columns: &[ResultColumn], chunk: &Value) -> QueryResult<Vec<Row>> {
    let Some(data) = chunk.get("data_array") else {
        return Ok(Vec::new());
    };
    let data = data
        .as_array()
        .ok_or_else(|| QueryError::Malformed("data_array is not an array".to_string()))?;

    data.iter()
        .map(|row| -> QueryResult<Row> {
            let cells = row
                .as_array()
                .ok_or_else(|| QueryError::Malformed("result row is not an array".to_string()))?;
            Ok(columns
                .iter()
                .enumerate()
                .map(|(idx, column)| {
                    let value = match cells.get(idx) {
                        Some(cell) => convert(cell, &column.type_name),
                        None => Value::Null,
                    };
                    (column.name.clone(), value)
                })
                .collect())
        })
        .collect()
}

/// Index of the chunk that follows `chunk`, if any.
pub(crate) fn next_chunk_index(chunk: &Value) -> Option<u64> {
    chunk.get("next_chunk_index").and_then(Value::as_u64)
}

fn convert(cell: &Value, type_name: &str) -> Value {
    let Value::String(text) = cell else {
        return cell.clone();
    };

    let converted = match type_name {
        "BOOLEAN" => match text.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        "BYTE" | "SHORT" | "INT" | "LONG" => text.parse::<i64>().ok().map(Value::from),
        "FLOAT" | "DOUBLE" => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    converted.unwrap_or_else(|| cell.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> Value {
        json!({
            "manifest": {
                "schema": {
                    "columns": [
                        {"name": "id", "type_name": "LONG", "position": 0},
                        {"name": "active", "type_name": "BOOLEAN", "position": 1},
                        {"name": "score", "type_name": "DOUBLE", "position": 2},
                        {"name": "price", "type_name": "DECIMAL", "position": 3},
                        {"name": "label", "type_name": "STRING", "position": 4}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_cells_converted_by_manifest_type() {
        let columns = manifest_columns(&manifest()).unwrap();
        let chunk = json!({
            "data_array": [
                ["1", "true", "2.5", "10.00", "a"],
                [null, "false", "NaN", null, null],
                ["3"]
            ]
        });

        let rows = rows_from(&columns, &chunk).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(
            Value::Object(rows[0].clone()),
            json!({"id": 1, "active": true, "score": 2.5, "price": "10.00", "label": "a"})
        );
        // Not representable as a JSON number: kept as sent.
        assert_eq!(rows[1]["score"], json!("NaN"));
        assert_eq!(rows[1]["id"], Value::Null);
        assert_eq!(rows[2]["label"], Value::Null);
    }

    #[test]
    fn test_rows_preserve_column_order() {
        let columns = manifest_columns(&manifest()).unwrap();
        let rows = rows_from(&columns, &json!({"data_array": [["1", "true", "1", "1", "x"]]})).unwrap();
        let keys: Vec<_> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "active", "score", "price", "label"]);
    }

    #[test]
    fn test_missing_data_array_is_empty() {
        let columns = manifest_columns(&manifest()).unwrap();
        assert!(rows_from(&columns, &json!({"row_count": 0})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_manifest() {
        assert!(matches!(
            manifest_columns(&json!({"status": {"state": "SUCCEEDED"}})),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn test_next_chunk_index() {
        assert_eq!(next_chunk_index(&json!({"next_chunk_index": 2})), Some(2));
        assert_eq!(next_chunk_index(&json!({})), None);
    }
}
