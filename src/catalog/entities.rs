//! Normalized catalog entities.
//!
//! These are the strictly typed values produced by [`crate::normalize`] from raw
//! backend payloads. They are immutable once built and carry no references to
//! the payload they came from.

use std::fmt;

use serde::Serialize;

/// A schema as seen in a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub catalog: String,
    pub name: String,
    pub comment: Option<String>,
}

/// A table as seen in a schema listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub catalog: String,
    pub schema: String,
    pub name: String,
    pub table_type: Option<String>,
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type as declared by the backend (e.g. `decimal(10,2)`).
    pub data_type: String,
    pub nullable: bool,
    pub comment: Option<String>,
    /// Ordinal position; columns are always kept sorted by this value.
    pub position: i64,
}

/// Kind of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Check,
    Other,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY_KEY",
            ConstraintKind::ForeignKey => "FOREIGN_KEY",
            ConstraintKind::Check => "CHECK",
            ConstraintKind::Other => "OTHER",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintDescriptor {
    pub name: String,
    pub kind: ConstraintKind,
    /// SQL-like rendering, e.g. `FOREIGN KEY (customer_id) REFERENCES main.crm.customers (id)`.
    pub definition: String,
    /// Informational `RELY` flag, when the backend reports one.
    pub rely: Option<bool>,
}

/// The kind of entity on the far side of a lineage edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Table,
    Notebook,
    Job,
    Query,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Table => "TABLE",
            EntityKind::Notebook => "NOTEBOOK",
            EntityKind::Job => "JOB",
            EntityKind::Query => "QUERY",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed lineage relationship, upstream `source` to downstream `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LineageEdge {
    pub source_entity: String,
    pub target_entity: String,
    pub entity_kind: EntityKind,
}

/// Full description of one table, built fresh for every describe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub full_name: String,
    pub table_type: Option<String>,
    pub data_source_format: Option<String>,
    pub comment: Option<String>,
    pub columns: Vec<ColumnDescriptor>,
    pub constraints: Vec<ConstraintDescriptor>,
    pub lineage_upstream: Vec<LineageEdge>,
    pub lineage_downstream: Vec<LineageEdge>,
}

impl TableDescriptor {
    /// Attach lineage edges to an otherwise complete descriptor.
    pub fn with_lineage(mut self, upstream: Vec<LineageEdge>, downstream: Vec<LineageEdge>) -> Self {
        self.lineage_upstream = upstream;
        self.lineage_downstream = downstream;
        self
    }
}

/// Outcome of describing one requested table in a batch.
///
/// Failures are carried as values so one bad table never hides the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableReport {
    Described {
        table: TableDescriptor,
        /// Set when the table was fetched but its lineage could not be.
        lineage_error: Option<String>,
    },
    Failed {
        requested: String,
        reason: String,
    },
}

impl TableReport {
    pub fn failed(requested: impl Into<String>, reason: impl fmt::Display) -> Self {
        TableReport::Failed {
            requested: requested.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TableReport::Failed { .. })
    }
}
