//! Catalog entity model.
//!
//! Identifiers ([`CatalogRef`], [`SchemaRef`], [`TableName`]) are validated on
//! construction from caller input. Entities ([`TableDescriptor`] and friends)
//! are the normalized form of backend payloads.

mod entities;
mod refs;

pub use entities::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, EntityKind, LineageEdge,
    SchemaSummary, TableDescriptor, TableReport, TableSummary,
};
pub use refs::{CatalogRef, ReferenceError, SchemaRef, TableName};
