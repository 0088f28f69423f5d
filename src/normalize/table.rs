//! Table descriptor normalization.

use serde_json::{Map, Value};
use tracing::debug;

use super::{array, as_object, text, NormalizationError, NormalizeResult};
use crate::catalog::{ColumnDescriptor, ConstraintDescriptor, ConstraintKind, TableDescriptor};

/// Type shown for a column that reports neither `type_text` nor `type_name`.
const UNKNOWN_TYPE: &str = "UNKNOWN";

/// Normalize a single table payload.
///
/// Columns come back sorted by ordinal position. A column without a position
/// takes its payload index. Lineage is left empty; attach it with
/// [`TableDescriptor::with_lineage`].
pub fn normalize_table(raw: &Value) -> NormalizeResult<TableDescriptor> {
    let map = as_object(raw, "table")?.ok_or(NormalizationError::NotAnObject { context: "table" })?;
    let full_name = full_name(map)?;

    let mut columns = Vec::new();
    for (index, entry) in array(map, "columns").iter().enumerate() {
        columns.push(column(entry, index, &full_name)?);
    }
    // Stable, so columns sharing a position keep payload order.
    columns.sort_by_key(|c| c.position);

    let constraints: Vec<_> = array(map, "table_constraints")
        .iter()
        .filter_map(constraint)
        .collect();

    debug!(
        table = %full_name,
        columns = columns.len(),
        constraints = constraints.len(),
        "normalized table"
    );

    Ok(TableDescriptor {
        full_name,
        table_type: text(map, "table_type"),
        data_source_format: text(map, "data_source_format"),
        comment: text(map, "comment"),
        columns,
        constraints,
        lineage_upstream: Vec::new(),
        lineage_downstream: Vec::new(),
    })
}

fn full_name(map: &Map<String, Value>) -> NormalizeResult<String> {
    if let Some(full_name) = text(map, "full_name") {
        return Ok(full_name);
    }
    match (
        text(map, "catalog_name"),
        text(map, "schema_name"),
        text(map, "name"),
    ) {
        (Some(catalog), Some(schema), Some(name)) => Ok(format!("{}.{}.{}", catalog, schema, name)),
        _ => Err(NormalizationError::MissingField {
            context: "table".to_string(),
            field: "full_name",
        }),
    }
}

fn column(entry: &Value, index: usize, table: &str) -> NormalizeResult<ColumnDescriptor> {
    let context = || format!("column #{} of {}", index, table);
    let map = entry.as_object().ok_or_else(|| NormalizationError::MissingField {
        context: context(),
        field: "name",
    })?;
    let name = text(map, "name").ok_or_else(|| NormalizationError::MissingField {
        context: context(),
        field: "name",
    })?;

    Ok(ColumnDescriptor {
        name,
        data_type: text(map, "type_text")
            .or_else(|| text(map, "type_name"))
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        nullable: map.get("nullable").and_then(Value::as_bool).unwrap_or(true),
        comment: text(map, "comment"),
        position: map
            .get("position")
            .and_then(Value::as_i64)
            .unwrap_or(index as i64),
    })
}

fn names(map: &Map<String, Value>, key: &str) -> Vec<String> {
    array(map, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn constraint(entry: &Value) -> Option<ConstraintDescriptor> {
    let map = entry.as_object()?;
    // Each entry holds exactly one constraint object, keyed by its kind.
    let (key, body) = map.iter().find_map(|(k, v)| v.as_object().map(|o| (k.as_str(), o)))?;

    let (kind, definition) = match key {
        "primary_key_constraint" => {
            let mut definition = format!("PRIMARY KEY ({})", names(body, "child_columns").join(", "));
            let timeseries = names(body, "timeseries_columns");
            if !timeseries.is_empty() {
                definition.push_str(&format!(" TIMESERIES ({})", timeseries.join(", ")));
            }
            (ConstraintKind::PrimaryKey, definition)
        }
        "foreign_key_constraint" => (
            ConstraintKind::ForeignKey,
            format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                names(body, "child_columns").join(", "),
                text(body, "parent_table").unwrap_or_else(|| "?".to_string()),
                names(body, "parent_columns").join(", ")
            ),
        ),
        "check_constraint" => (
            ConstraintKind::Check,
            format!("CHECK ({})", text(body, "condition").unwrap_or_default()),
        ),
        other => (ConstraintKind::Other, other.to_ascii_uppercase()),
    };

    Some(ConstraintDescriptor {
        name: text(body, "name").unwrap_or_else(|| "(unnamed)".to_string()),
        kind,
        definition,
        rely: body.get("rely").and_then(Value::as_bool),
    })
}
