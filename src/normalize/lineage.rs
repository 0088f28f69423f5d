//! Lineage normalization.
//!
//! A lineage payload lists `upstreams` and `downstreams`. Each entry may name
//! a table (`tableInfo`) and any number of notebooks, jobs or queries that
//! read or wrote it. Non-table entities have no three-part name, so they are
//! identified as `notebook:<id>`, `job:<id>` and `query:<id>`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{array, as_object, text, NormalizeResult};
use crate::catalog::{EntityKind, LineageEdge};

/// Normalize a lineage payload for `full_name` into `(upstream, downstream)`.
///
/// Upstream edges point at the table, downstream edges away from it. Duplicate
/// edges are dropped, first occurrence wins.
pub fn normalize_lineage(
    raw: &Value,
    full_name: &str,
) -> NormalizeResult<(Vec<LineageEdge>, Vec<LineageEdge>)> {
    let Some(map) = as_object(raw, "lineage")? else {
        return Ok((Vec::new(), Vec::new()));
    };

    let upstream = edges(array(map, "upstreams"), |entity, kind| LineageEdge {
        source_entity: entity,
        target_entity: full_name.to_string(),
        entity_kind: kind,
    });
    let downstream = edges(array(map, "downstreams"), |entity, kind| LineageEdge {
        source_entity: full_name.to_string(),
        target_entity: entity,
        entity_kind: kind,
    });

    Ok((upstream, downstream))
}

fn edges(entries: &[Value], make: impl Fn(String, EntityKind) -> LineageEdge) -> Vec<LineageEdge> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(Value::as_object)
        .flat_map(entities)
        .map(|(entity, kind)| make(entity, kind))
        .filter(|edge| seen.insert(edge.clone()))
        .collect()
}

fn entities(entry: &Map<String, Value>) -> Vec<(String, EntityKind)> {
    let mut found = Vec::new();

    if let Some(info) = entry.get("tableInfo").and_then(Value::as_object) {
        if let (Some(catalog), Some(schema), Some(name)) = (
            text(info, "catalog_name"),
            text(info, "schema_name"),
            text(info, "name"),
        ) {
            found.push((format!("{}.{}.{}", catalog, schema, name), EntityKind::Table));
        }
    }

    let referenced = [
        ("notebookInfos", "notebook_id", "notebook", EntityKind::Notebook),
        ("jobInfos", "job_id", "job", EntityKind::Job),
        ("queryInfos", "query_id", "query", EntityKind::Query),
    ];
    for (key, id_field, prefix, kind) in referenced {
        for info in array(entry, key).iter().filter_map(Value::as_object) {
            if let Some(id) = identifier(info.get(id_field)) {
                found.push((format!("{}:{}", prefix, id), kind));
            }
        }
    }

    found
}

/// Ids arrive as numbers or strings depending on the entity type.
fn identifier(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
