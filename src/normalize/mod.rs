//! Raw payload normalization.
//!
//! The workspace does not return uniformly complete metadata: comments,
//! constraints, positions and even nullability may be absent. Everything in
//! this module is tolerant of missing optional fields (they become `None` or
//! empty) and strict only about identity: a table without a name, or a column
//! without a name, is a [`NormalizationError`].
//!
//! Errors are per payload. A batch caller normalizes each table separately so
//! one malformed descriptor never affects the others.

mod lineage;
mod table;

pub use lineage::normalize_lineage;
pub use table::normalize_table;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{CatalogRef, SchemaRef, SchemaSummary, TableSummary};

/// Result type for normalization.
pub type NormalizeResult<T> = Result<T, NormalizationError>;

/// A payload is missing data needed to identify what it describes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("malformed {context} payload: expected a JSON object")]
    NotAnObject { context: &'static str },

    #[error("malformed {context} payload: missing `{field}`")]
    MissingField { context: String, field: &'static str },
}

/// Borrow `raw` as an object; `null` is treated as an empty object.
fn as_object<'a>(raw: &'a Value, context: &'static str) -> NormalizeResult<Option<&'a Map<String, Value>>> {
    match raw {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(NormalizationError::NotAnObject { context }),
    }
}

/// Non-blank string field.
fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Array field; anything else (including absence) is empty.
fn array<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Normalize a schema listing (`{"schemas": [...]}`).
///
/// Entries without a name are skipped. Order follows the payload; sorting is a
/// rendering concern.
pub fn normalize_schemas(raw: &Value, catalog: &CatalogRef) -> NormalizeResult<Vec<SchemaSummary>> {
    let Some(map) = as_object(raw, "schema listing")? else {
        return Ok(Vec::new());
    };

    let mut schemas = Vec::new();
    for entry in array(map, "schemas") {
        let Some(entry) = entry.as_object() else {
            warn!("skipping non-object schema entry");
            continue;
        };
        let Some(name) = text(entry, "name") else {
            warn!(catalog = catalog.catalog(), "skipping schema entry without a name");
            continue;
        };
        schemas.push(SchemaSummary {
            catalog: text(entry, "catalog_name").unwrap_or_else(|| catalog.catalog().to_string()),
            name,
            comment: text(entry, "comment"),
        });
    }
    Ok(schemas)
}

/// Normalize a table listing (`{"tables": [...]}`).
pub fn normalize_tables(raw: &Value, schema: &SchemaRef) -> NormalizeResult<Vec<TableSummary>> {
    let Some(map) = as_object(raw, "table listing")? else {
        return Ok(Vec::new());
    };

    let mut tables = Vec::new();
    for entry in array(map, "tables") {
        let Some(entry) = entry.as_object() else {
            warn!("skipping non-object table entry");
            continue;
        };
        let Some(name) = text(entry, "name") else {
            warn!(schema = %schema, "skipping table entry without a name");
            continue;
        };
        tables.push(TableSummary {
            catalog: text(entry, "catalog_name").unwrap_or_else(|| schema.catalog().to_string()),
            schema: text(entry, "schema_name").unwrap_or_else(|| schema.schema().to_string()),
            name,
            table_type: text(entry, "table_type"),
        });
    }
    Ok(tables)
}
