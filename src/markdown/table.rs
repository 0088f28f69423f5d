//! Table detail rendering.

use super::{escape_cell, finish, render_error};
use crate::catalog::{ConstraintDescriptor, LineageEdge, TableDescriptor, TableReport};

const SEPARATOR: &str = "---";

/// Render a batch of table reports as one document.
///
/// Sections follow the order of `reports`. A failed report renders an error
/// block in place of its section; the others are unaffected.
#[must_use]
pub fn render_table_reports(reports: &[TableReport]) -> String {
    let mut lines = vec!["# Table Information".to_string(), String::new()];

    if reports.is_empty() {
        lines.push("**No tables requested**".to_string());
    }

    for (idx, report) in reports.iter().enumerate() {
        if idx > 0 {
            lines.push(SEPARATOR.to_string());
            lines.push(String::new());
        }
        match report {
            TableReport::Described {
                table,
                lineage_error,
            } => table_section(&mut lines, table, lineage_error.as_deref()),
            TableReport::Failed { requested, reason } => {
                lines.push(format!("## `{}`", requested));
                lines.push(String::new());
                lines.extend(
                    render_error("Could not retrieve table information", reason)
                        .lines()
                        .map(str::to_string),
                );
                lines.push(String::new());
            }
        }
    }

    // Sections end with a blank line; the document ends with one newline.
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    finish(lines)
}

fn table_section(lines: &mut Vec<String>, table: &TableDescriptor, lineage_error: Option<&str>) {
    lines.push(format!("## `{}`", table.full_name));
    lines.push(String::new());
    lines.push(format!(
        "**Type:** `{}`",
        table.table_type.as_deref().unwrap_or("UNKNOWN")
    ));
    lines.push(format!(
        "**Data Format:** `{}`",
        table.data_source_format.as_deref().unwrap_or("UNKNOWN")
    ));
    lines.push(format!(
        "**Description:** {}",
        table.comment.as_deref().unwrap_or("No description")
    ));
    lines.push(String::new());

    lines.push("### Columns".to_string());
    lines.push(String::new());
    if table.columns.is_empty() {
        lines.push("No columns defined.".to_string());
    } else {
        lines.push("| Column | Type | Nullable | Comment |".to_string());
        lines.push("|--------|------|----------|---------|".to_string());
        for column in &table.columns {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                escape_cell(&column.name),
                escape_cell(&column.data_type),
                if column.nullable { "TRUE" } else { "FALSE" },
                escape_cell(column.comment.as_deref().unwrap_or(""))
            ));
        }
    }
    lines.push(String::new());

    if !table.constraints.is_empty() {
        lines.push("### Constraints".to_string());
        lines.push(String::new());
        lines.push("| Constraint Name | Type | Definition | Rely |".to_string());
        lines.push("|---|---|---|---|".to_string());
        lines.extend(table.constraints.iter().map(constraint_row));
        lines.push(String::new());
    }

    lines.push("### Lineage".to_string());
    lines.push(String::new());
    match lineage_error {
        Some(reason) => lines.push(format!("_Lineage unavailable: {}_", reason.trim())),
        None => {
            lines.push("**Upstream:**".to_string());
            edge_list(lines, &table.lineage_upstream, |e| &e.source_entity);
            lines.push(String::new());
            lines.push("**Downstream:**".to_string());
            edge_list(lines, &table.lineage_downstream, |e| &e.target_entity);
        }
    }
    lines.push(String::new());
}

fn constraint_row(constraint: &ConstraintDescriptor) -> String {
    let rely = match constraint.rely {
        Some(true) => "TRUE",
        Some(false) => "FALSE",
        None => "UNKNOWN",
    };
    format!(
        "| {} | {} | {} | {} |",
        escape_cell(&constraint.name),
        constraint.kind,
        escape_cell(&constraint.definition),
        rely
    )
}

fn edge_list(lines: &mut Vec<String>, edges: &[LineageEdge], far_end: fn(&LineageEdge) -> &String) {
    if edges.is_empty() {
        lines.push("_None_".to_string());
        return;
    }
    for edge in edges {
        lines.push(format!("- `{}` ({})", far_end(edge), edge.entity_kind));
    }
}
