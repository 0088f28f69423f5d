//! Markdown rendering for agent consumption.
//!
//! All renderers are pure: the same input always produces byte-identical
//! output. Listings are sorted by name; table details keep request order.

mod table;

pub use table::render_table_reports;

use crate::catalog::{CatalogRef, SchemaRef, SchemaSummary, TableSummary};

/// Escape text for use inside a Markdown table cell.
///
/// Pipes would split the cell and newlines would end the row.
#[must_use]
pub fn escape_cell(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '|' => result.push_str("\\|"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("<br>");
            }
            '\n' => result.push_str("<br>"),
            c => result.push(c),
        }
    }
    result
}

/// Render a whole-tool failure.
///
/// ````text
/// **Error**: Could not retrieve list of schemas
/// **Details:**
/// ```
/// workspace unavailable: HTTP 503: ...
/// ```
/// ````
#[must_use]
pub fn render_error(summary: &str, details: &str) -> String {
    format!(
        "**Error**: {}\n**Details:**\n```\n{}\n```\n",
        summary,
        details.trim_end()
    )
}

/// Render the schemas of a catalog, sorted by name.
#[must_use]
pub fn render_schemas(catalog: &CatalogRef, schemas: &[SchemaSummary]) -> String {
    let mut sorted: Vec<&SchemaSummary> = schemas.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut lines = vec![
        format!("# Schemas in `{}`", catalog),
        String::new(),
        format!("*Number of Schemas*: {}", sorted.len()),
        String::new(),
    ];

    if sorted.is_empty() {
        lines.push("_No schemas found._".to_string());
    }
    for schema in sorted {
        match &schema.comment {
            Some(comment) => lines.push(format!("- `{}` — {}", schema.name, one_line(comment))),
            None => lines.push(format!("- `{}`", schema.name)),
        }
    }

    finish(lines)
}

/// Render the tables of a schema, sorted by name.
#[must_use]
pub fn render_tables(schema: &SchemaRef, tables: &[TableSummary]) -> String {
    let mut names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();

    let mut lines = vec![
        format!("# Tables in `{}`", schema),
        String::new(),
        format!("*Number of Tables*: {}", names.len()),
        String::new(),
    ];

    if names.is_empty() {
        lines.push("_No tables found._".to_string());
    }
    lines.extend(names.into_iter().map(|name| format!("- `{}`", name)));

    finish(lines)
}

/// Collapse line breaks so a value stays on its list item.
fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    fn schema(name: &str, comment: Option<&str>) -> SchemaSummary {
        SchemaSummary {
            catalog: "main".to_string(),
            name: name.to_string(),
            comment: comment.map(str::to_string),
        }
    }

    fn table(name: &str) -> TableSummary {
        TableSummary {
            catalog: "main".to_string(),
            schema: "sales".to_string(),
            name: name.to_string(),
            table_type: None,
        }
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("line1\nline2\r\nline3"), "line1<br>line2<br>line3");
        assert_eq!(escape_cell("plain"), "plain");
    }

    #[test]
    fn test_render_schemas() {
        let catalog = CatalogRef::new("main").unwrap();
        let schemas = vec![
            schema("sales", Some("Sales data\nowned by finance")),
            schema("default", None),
            schema("information_schema", Some("System views")),
        ];

        assert_snapshot!(render_schemas(&catalog, &schemas), @r"
        # Schemas in `main`

        *Number of Schemas*: 3

        - `default`
        - `information_schema` — System views
        - `sales` — Sales data owned by finance
        ");
    }

    #[test]
    fn test_render_schemas_is_order_independent() {
        let catalog = CatalogRef::new("main").unwrap();
        let a = vec![schema("b", None), schema("a", Some("x"))];
        let b = vec![schema("a", Some("x")), schema("b", None)];
        assert_eq!(render_schemas(&catalog, &a), render_schemas(&catalog, &b));
    }

    #[test]
    fn test_render_tables() {
        let schema = SchemaRef::new("main", "sales").unwrap();
        let rendered = render_tables(&schema, &[table("orders"), table("customers")]);

        assert_snapshot!(rendered, @r"
        # Tables in `main.sales`

        *Number of Tables*: 2

        - `customers`
        - `orders`
        ");
    }

    #[test]
    fn test_render_empty_tables() {
        let schema = SchemaRef::new("main", "empty").unwrap();
        assert_eq!(
            render_tables(&schema, &[]),
            "# Tables in `main.empty`\n\n*Number of Tables*: 0\n\n_No tables found._\n"
        );
    }

    #[test]
    fn test_render_error() {
        assert_eq!(
            render_error("Could not retrieve list of tables", "boom\n"),
            "**Error**: Could not retrieve list of tables\n**Details:**\n```\nboom\n```\n"
        );
    }
}
