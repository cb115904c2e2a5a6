//! Execution probing against the warehouse.
//!
//! Runs an already-sanitized query and reports success or failure without
//! surfacing raw errors, so bulk evaluation loops over hundreds of questions
//! survive individual failures.

use std::sync::Arc;

use tracing::debug;

use crate::warehouse::{QueryResult, WarehouseClient};

/// Outcome of probing a query. Execution failure is a value, not an error.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    /// Whether the query executed successfully.
    pub succeeded: bool,
    /// The rows, present only on success.
    pub rows: Option<QueryResult>,
}

impl ExecutionOutcome {
    /// Outcome for a failed or skipped execution.
    pub fn failed() -> Self {
        Self {
            succeeded: false,
            rows: None,
        }
    }
}

/// Executes candidate queries and swallows execution-time errors.
pub struct ExecutionProbe {
    warehouse: Arc<dyn WarehouseClient>,
}

impl ExecutionProbe {
    /// Creates a probe over the given warehouse client.
    pub fn new(warehouse: Arc<dyn WarehouseClient>) -> Self {
        Self { warehouse }
    }

    /// Executes a query. Single attempt; any error becomes `(false, None)`.
    pub async fn execute(&self, sql: &str) -> ExecutionOutcome {
        match self.warehouse.execute_query(sql).await {
            Ok(result) => ExecutionOutcome {
                succeeded: true,
                rows: Some(result),
            },
            Err(e) => {
                debug!(error = %e, "query execution failed");
                ExecutionOutcome::failed()
            }
        }
    }
}
