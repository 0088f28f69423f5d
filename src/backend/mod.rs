//! Workspace API access.
//!
//! This module is the transport boundary: it knows endpoints, authentication
//! headers and HTTP status semantics, and hands back raw JSON payloads.
//! Turning those payloads into typed entities is [`crate::normalize`]'s job.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CatalogBackend (trait)                     │
//! │  - list_schemas()            - submit_statement()               │
//! │  - list_tables()             - get_statement_status()           │
//! │  - get_table()               - get_result_chunk()               │
//! │  - get_lineage()                                                │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      HttpBackend (reqwest)                      │
//! │      bearer header from CredentialProvider, one auth retry      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod error;
#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use error::{BackendError, BackendResult};
pub use http::HttpBackend;

use async_trait::async_trait;

use crate::catalog::{CatalogRef, SchemaRef, TableName};

/// A backend response body, exactly as the workspace sent it.
pub type RawPayload = serde_json::Value;

/// REST paths, as segment lists relative to the workspace host.
pub mod paths {
    pub const SCHEMAS: &[&str] = &["api", "2.1", "unity-catalog", "schemas"];
    pub const TABLES: &[&str] = &["api", "2.1", "unity-catalog", "tables"];
    pub const TABLE_LINEAGE: &[&str] = &["api", "2.0", "lineage-tracking", "table-lineage"];
    pub const STATEMENTS: &[&str] = &["api", "2.0", "sql", "statements"];
}

/// Remote catalog, lineage and statement-execution capabilities.
///
/// Listing calls follow pagination and return one merged payload with the
/// same top-level key the endpoint uses (`schemas` / `tables`).
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    /// List the schemas of a catalog.
    async fn list_schemas(&self, catalog: &CatalogRef) -> BackendResult<RawPayload>;

    /// List the tables of a schema.
    async fn list_tables(&self, schema: &SchemaRef) -> BackendResult<RawPayload>;

    /// Fetch the full descriptor of a table.
    async fn get_table(&self, table: &TableName) -> BackendResult<RawPayload>;

    /// Fetch upstream and downstream lineage of a table.
    async fn get_lineage(&self, table: &TableName) -> BackendResult<RawPayload>;

    /// Submit a statement for asynchronous execution and return its id.
    async fn submit_statement(&self, sql: &str, warehouse_id: &str) -> BackendResult<String>;

    /// Fetch the current status (and inline result, if any) of a statement.
    async fn get_statement_status(&self, statement_id: &str) -> BackendResult<RawPayload>;

    /// Fetch one additional result chunk of a finished statement.
    async fn get_result_chunk(
        &self,
        statement_id: &str,
        chunk_index: u64,
    ) -> BackendResult<RawPayload>;
}
