//! Query outcome value.

use serde::Serialize;

use super::rows::Row;

/// Final (or last observed) state of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    Succeeded,
    Failed,
    /// Still executing when the wait budget ran out.
    Running,
    Cancelled,
}

/// What a caller gets back from running a query.
///
/// `data` is only ever present for [`QueryState::Succeeded`], `error` only for
/// failed or cancelled statements, and a running outcome always carries the
/// statement id. The constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    query: String,
    state: QueryState,
    data: Option<Vec<Row>>,
    error: Option<String>,
    statement_id: Option<String>,
}

impl QueryOutcome {
    pub fn succeeded(query: impl Into<String>, statement_id: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            query: query.into(),
            state: QueryState::Succeeded,
            data: Some(rows),
            error: None,
            statement_id: Some(statement_id.into()),
        }
    }

    /// `statement_id` is `None` when the statement never reached the backend.
    pub fn failed(query: impl Into<String>, statement_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            state: QueryState::Failed,
            data: None,
            error: Some(error.into()),
            statement_id,
        }
    }

    pub fn running(query: impl Into<String>, statement_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            state: QueryState::Running,
            data: None,
            error: None,
            statement_id: Some(statement_id.into()),
        }
    }

    pub fn cancelled(query: impl Into<String>, statement_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            state: QueryState::Cancelled,
            data: None,
            error: Some(error.into()),
            statement_id: Some(statement_id.into()),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn data(&self) -> Option<&[Row]> {
        self.data.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn statement_id(&self) -> Option<&str> {
        self.statement_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let running = QueryOutcome::running("SELECT 1", "01ef-abc");
        assert_eq!(
            serde_json::to_value(&running).unwrap(),
            json!({
                "query": "SELECT 1",
                "state": "RUNNING",
                "data": null,
                "error": null,
                "statement_id": "01ef-abc"
            })
        );

        let failed = QueryOutcome::failed("DELETE FROM t", None, "not read-only");
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["state"], "FAILED");
        assert_eq!(value["error"], "not read-only");
        assert_eq!(value["statement_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_only_success_carries_data() {
        let ok = QueryOutcome::succeeded("SELECT 1", "s", Vec::new());
        assert_eq!(ok.data().map(<[Row]>::len), Some(0));
        assert_eq!(ok.error(), None);

        let cancelled = QueryOutcome::cancelled("SELECT 1", "s", "statement was cancelled");
        assert_eq!(cancelled.state(), QueryState::Cancelled);
        assert!(cancelled.data().is_none());
    }
}
