//! Read-only SQL execution.
//!
//! A statement goes through a fixed lifecycle:
//!
//! ```text
//!  guard ──▶ SUBMITTED ──▶ POLLING ──┬──▶ SUCCEEDED  (rows materialized, all chunks)
//!                            ▲   │   ├──▶ FAILED     (backend error copied verbatim)
//!                            └───┘   ├──▶ CANCELLED
//!                    PENDING/RUNNING └──▶ RUNNING    (wait budget exhausted)
//! ```
//!
//! Statements that fail the read-only guard never reach the backend.

mod executor;
mod guard;
mod outcome;
mod poll;
mod rows;

pub use executor::QueryExecutor;
pub use guard::ensure_read_only;
pub use outcome::{QueryOutcome, QueryState};
pub use poll::{PollPolicy, Schedule};
pub use rows::Row;

use thiserror::Error;

use crate::backend::BackendError;

/// Result type for query execution.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised before a terminal statement state could be observed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("only read-only statements are allowed: {reason}")]
    NonReadOnly { reason: String },

    #[error("statement submission failed: {0}")]
    Submit(#[source] BackendError),

    #[error("polling statement {statement_id} failed: {source}")]
    Poll {
        statement_id: String,
        #[source]
        source: BackendError,
    },

    #[error("unexpected statement payload: {0}")]
    Malformed(String),
}

impl QueryError {
    /// Statement id, if the statement was accepted by the backend.
    pub fn statement_id(&self) -> Option<&str> {
        match self {
            Self::Poll { statement_id, .. } => Some(statement_id),
            _ => None,
        }
    }
}
