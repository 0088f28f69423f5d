//! # Heron
//!
//! A bridge between LLM agents and a Databricks workspace: Unity Catalog
//! metadata rendered as Markdown, plus guarded read-only SQL execution.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  CatalogTools (tools)                   │
//! │  fetch_schemas_in_catalog   fetch_tables_in_schema      │
//! │  fetch_table_info           execute_spark_sql_query     │
//! └─────────────────────────────────────────────────────────┘
//!            │                                  │
//!            ▼ [normalize + markdown]           ▼ [query]
//! ┌───────────────────────────┐   ┌─────────────────────────┐
//! │  typed catalog entities   │   │ guard, submit, poll,    │
//! │  rendered as Markdown     │   │ materialize rows        │
//! └───────────────────────────┘   └─────────────────────────┘
//!            │                                  │
//!            └───────────────┬──────────────────┘
//!                            ▼ [backend]
//! ┌─────────────────────────────────────────────────────────┐
//! │        CatalogBackend / HttpBackend (raw JSON)          │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼ [auth]
//! ┌─────────────────────────────────────────────────────────┐
//! │   CredentialProvider (static token or OAuth client)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod markdown;
pub mod normalize;
pub mod query;
pub mod tools;

pub use error::{Error, Result};
pub use tools::CatalogTools;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{BackendError, CatalogBackend, HttpBackend};
    pub use crate::catalog::{
        CatalogRef, ColumnDescriptor, ConstraintDescriptor, LineageEdge, SchemaRef, TableDescriptor,
        TableName, TableReport,
    };
    pub use crate::config::{Settings, WorkspaceConfig};
    pub use crate::query::{QueryOutcome, QueryState};
    pub use crate::tools::CatalogTools;
}
