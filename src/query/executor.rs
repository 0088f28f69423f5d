//! Statement submission and polling.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::guard::ensure_read_only;
use super::outcome::QueryOutcome;
use super::poll::PollPolicy;
use super::rows::{manifest_columns, next_chunk_index, rows_from, Row};
use super::{QueryError, QueryResult};
use crate::backend::CatalogBackend;
use crate::config::QuerySettings;

/// Statement state as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatementState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Closed,
}

impl StatementState {
    fn parse(state: &str) -> Option<Self> {
        match state {
            "PENDING" => Some(Self::Pending),
            "RUNNING" => Some(Self::Running),
            "SUCCEEDED" => Some(Self::Succeeded),
            "FAILED" => Some(Self::Failed),
            "CANCELED" => Some(Self::Canceled),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    fn of(payload: &Value) -> QueryResult<Self> {
        let state = payload
            .pointer("/status/state")
            .and_then(Value::as_str)
            .ok_or_else(|| QueryError::Malformed("statement status has no state".to_string()))?;
        Self::parse(state)
            .ok_or_else(|| QueryError::Malformed(format!("unknown statement state `{}`", state)))
    }
}

/// Backend error detail as `ERROR_CODE - message`.
fn error_detail(payload: &Value) -> Option<String> {
    let error = payload.pointer("/status/error")?;
    let code = error.get("error_code").and_then(Value::as_str);
    let message = error.get("message").and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => Some(format!("{} - {}", code, message)),
        (None, Some(message)) => Some(message.to_string()),
        (Some(code), None) => Some(code.to_string()),
        (None, None) => None,
    }
}

/// Runs read-only statements against a SQL warehouse.
pub struct QueryExecutor {
    backend: Arc<dyn CatalogBackend>,
    settings: QuerySettings,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn CatalogBackend>, settings: &QuerySettings) -> Self {
        Self {
            backend,
            settings: settings.clone(),
        }
    }

    /// Run `sql` on `warehouse_id`, waiting at most `wait_timeout` for a result.
    ///
    /// Terminal backend states (including FAILED) are returned as outcomes.
    /// `Err` means the statement was rejected locally or the backend could not
    /// be reached. Dropping the returned future stops polling but does not
    /// cancel the remote statement.
    pub async fn execute(
        &self,
        sql: &str,
        warehouse_id: &str,
        wait_timeout: Duration,
    ) -> QueryResult<QueryOutcome> {
        ensure_read_only(sql)?;

        let statement_id = self
            .backend
            .submit_statement(sql, warehouse_id)
            .await
            .map_err(QueryError::Submit)?;

        let policy = PollPolicy::from_settings(&self.settings, wait_timeout);
        for delay in policy.schedule() {
            tokio::time::sleep(delay).await;

            let payload = self
                .backend
                .get_statement_status(&statement_id)
                .await
                .map_err(|source| QueryError::Poll {
                    statement_id: statement_id.clone(),
                    source,
                })?;
            let state = StatementState::of(&payload)?;
            debug!(statement_id = %statement_id, ?state, "statement polled");

            match state {
                StatementState::Pending | StatementState::Running => continue,
                StatementState::Succeeded => {
                    let rows = self.collect_rows(&statement_id, &payload).await?;
                    info!(statement_id = %statement_id, rows = rows.len(), "statement succeeded");
                    return Ok(QueryOutcome::succeeded(sql, statement_id, rows));
                }
                StatementState::Failed => {
                    let error = error_detail(&payload)
                        .unwrap_or_else(|| "statement failed without error detail".to_string());
                    warn!(statement_id = %statement_id, error = %error, "statement failed");
                    return Ok(QueryOutcome::failed(sql, Some(statement_id), error));
                }
                StatementState::Canceled => {
                    let error = error_detail(&payload)
                        .unwrap_or_else(|| "statement was cancelled".to_string());
                    warn!(statement_id = %statement_id, "statement cancelled");
                    return Ok(QueryOutcome::cancelled(sql, statement_id, error));
                }
                StatementState::Closed => {
                    warn!(statement_id = %statement_id, "statement closed before its result was read");
                    return Ok(QueryOutcome::failed(
                        sql,
                        Some(statement_id),
                        "statement was closed before its result could be read",
                    ));
                }
            }
        }

        info!(
            statement_id = %statement_id,
            wait_timeout_ms = policy.wait_timeout().as_millis() as u64,
            "statement still running after wait budget"
        );
        Ok(QueryOutcome::running(sql, statement_id))
    }

    /// Materialize the inline result and every following chunk.
    async fn collect_rows(&self, statement_id: &str, payload: &Value) -> QueryResult<Vec<Row>> {
        let Some(result) = payload.get("result") else {
            return Ok(Vec::new());
        };
        if result.get("data_array").is_none() && next_chunk_index(result).is_none() {
            return Ok(Vec::new());
        }

        let columns = manifest_columns(payload)?;
        let mut rows = rows_from(&columns, result)?;
        let mut current = result.get("chunk_index").and_then(Value::as_u64).unwrap_or(0);
        let mut next = next_chunk_index(result);

        while let Some(index) = next {
            if index <= current {
                return Err(QueryError::Malformed(format!(
                    "chunk index {} does not advance past {}",
                    index, current
                )));
            }
            let chunk = self
                .backend
                .get_result_chunk(statement_id, index)
                .await
                .map_err(|source| QueryError::Poll {
                    statement_id: statement_id.to_string(),
                    source,
                })?;
            debug!(statement_id, chunk_index = index, "result chunk fetched");
            rows.extend(rows_from(&columns, &chunk)?);
            current = index;
            next = next_chunk_index(&chunk);
        }

        Ok(rows)
    }
}
