//! In-memory [`CatalogBackend`] used by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{BackendError, BackendResult, CatalogBackend, RawPayload};
use crate::catalog::{CatalogRef, SchemaRef, TableName};

fn not_found(code: &str, what: &str) -> BackendError {
    BackendError::Request {
        status: 404,
        message: format!("{}: {} does not exist.", code, what),
    }
}

/// Canned responses keyed by identifier, plus a log of every call made.
#[derive(Default)]
pub(crate) struct FakeBackend {
    schemas: HashMap<String, BackendResult<Value>>,
    tables: HashMap<String, BackendResult<Value>>,
    table_details: HashMap<String, BackendResult<Value>>,
    lineage: HashMap<String, BackendResult<Value>>,
    statuses: Mutex<VecDeque<BackendResult<Value>>>,
    chunks: HashMap<u64, Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schemas(mut self, catalog: &str, payload: Value) -> Self {
        self.schemas.insert(catalog.to_string(), Ok(payload));
        self
    }

    pub fn with_tables(mut self, schema: &str, payload: Value) -> Self {
        self.tables.insert(schema.to_string(), Ok(payload));
        self
    }

    pub fn with_table(mut self, full_name: &str, payload: Value) -> Self {
        self.table_details.insert(full_name.to_string(), Ok(payload));
        self
    }

    pub fn with_table_error(mut self, full_name: &str, error: BackendError) -> Self {
        self.table_details.insert(full_name.to_string(), Err(error));
        self
    }

    pub fn with_lineage(mut self, full_name: &str, payload: Value) -> Self {
        self.lineage.insert(full_name.to_string(), Ok(payload));
        self
    }

    pub fn with_lineage_error(mut self, full_name: &str, error: BackendError) -> Self {
        self.lineage.insert(full_name.to_string(), Err(error));
        self
    }

    /// Status responses returned in order; the last one repeats forever.
    pub fn with_statuses(self, statuses: Vec<BackendResult<Value>>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_chunk(mut self, index: u64, payload: Value) -> Self {
        self.chunks.insert(index, payload);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogBackend for FakeBackend {
    async fn list_schemas(&self, catalog: &CatalogRef) -> BackendResult<RawPayload> {
        self.record(format!("list_schemas {}", catalog));
        self.schemas
            .get(catalog.catalog())
            .cloned()
            .unwrap_or_else(|| Err(not_found("CATALOG_DOES_NOT_EXIST", catalog.catalog())))
    }

    async fn list_tables(&self, schema: &SchemaRef) -> BackendResult<RawPayload> {
        self.record(format!("list_tables {}", schema));
        self.tables
            .get(&schema.to_string())
            .cloned()
            .unwrap_or_else(|| Err(not_found("SCHEMA_DOES_NOT_EXIST", &schema.to_string())))
    }

    async fn get_table(&self, table: &TableName) -> BackendResult<RawPayload> {
        self.record(format!("get_table {}", table));
        self.table_details
            .get(&table.full_name())
            .cloned()
            .unwrap_or_else(|| Err(not_found("TABLE_DOES_NOT_EXIST", &table.full_name())))
    }

    async fn get_lineage(&self, table: &TableName) -> BackendResult<RawPayload> {
        self.record(format!("get_lineage {}", table));
        self.lineage
            .get(&table.full_name())
            .cloned()
            .unwrap_or_else(|| Ok(json!({})))
    }

    async fn submit_statement(&self, sql: &str, warehouse_id: &str) -> BackendResult<String> {
        self.record(format!("submit_statement {} {}", warehouse_id, sql));
        Ok("stmt-1".to_string())
    }

    async fn get_statement_status(&self, statement_id: &str) -> BackendResult<RawPayload> {
        self.record(format!("get_statement_status {}", statement_id));
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => Err(not_found("RESOURCE_DOES_NOT_EXIST", statement_id)),
            1 => statuses[0].clone(),
            _ => statuses.pop_front().unwrap_or_else(|| Ok(Value::Null)),
        }
    }

    async fn get_result_chunk(
        &self,
        statement_id: &str,
        chunk_index: u64,
    ) -> BackendResult<RawPayload> {
        self.record(format!("get_result_chunk {} {}", statement_id, chunk_index));
        self.chunks
            .get(&chunk_index)
            .cloned()
            .ok_or_else(|| not_found("RESOURCE_DOES_NOT_EXIST", "chunk"))
    }
}
