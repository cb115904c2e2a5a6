//! Mock warehouse clients for testing.
//!
//! Provides in-memory implementations for offline runs and for exercising
//! the probe's failure policy.

use super::{ColumnInfo, DatasetSchema, QueryResult, TableSchema, Value, WarehouseClient};
use crate::error::{Result, SqlwardError};
use async_trait::async_trait;
use std::time::Duration;

/// A mock warehouse client that returns predefined results.
pub struct MockWarehouseClient {
    schema: DatasetSchema,
}

impl MockWarehouseClient {
    /// Creates a new mock client with a small retail schema.
    pub fn new() -> Self {
        Self {
            schema: default_retail_schema(),
        }
    }

    /// Creates a new mock client with the given schema.
    pub fn with_schema(schema: DatasetSchema) -> Self {
        Self { schema }
    }
}

impl Default for MockWarehouseClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample schema used when no real warehouse is attached.
fn default_retail_schema() -> DatasetSchema {
    DatasetSchema {
        tables: vec![
            TableSchema::new("mock.retail.tickets")
                .field("TICKET_ID", "INTEGER")
                .field("DATE_TICKET", "STRING")
                .field("montant", "FLOAT"),
            TableSchema::new("mock.retail.clients")
                .field("CLIENT_ID", "INTEGER")
                .field("VILLE", "STRING"),
            TableSchema::new("mock.retail.ventes")
                .field("produit", "STRING")
                .field("solde", "BOOLEAN"),
        ],
    }
}

#[async_trait]
impl WarehouseClient for MockWarehouseClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let sql_lower = sql.trim().to_lowercase();

        if sql_lower.starts_with("select") || sql_lower.starts_with("with") {
            let columns = vec![ColumnInfo::new("result", "STRING")];
            let rows = vec![vec![Value::String(format!("Mock result for: {sql}"))]];

            Ok(QueryResult::with_data(columns, rows)
                .with_execution_time(Duration::from_millis(1)))
        } else {
            Err(SqlwardError::warehouse(format!(
                "statement not supported by mock warehouse: {sql}"
            )))
        }
    }

    async fn list_tables(&self) -> Result<DatasetSchema> {
        Ok(self.schema.clone())
    }
}

/// A warehouse client that fails every call.
///
/// Used to exercise the execution probe's error-swallowing policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingWarehouseClient;

impl FailingWarehouseClient {
    /// Creates a new failing client.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WarehouseClient for FailingWarehouseClient {
    async fn execute_query(&self, _sql: &str) -> Result<QueryResult> {
        Err(SqlwardError::warehouse("simulated execution failure"))
    }

    async fn list_tables(&self) -> Result<DatasetSchema> {
        Err(SqlwardError::warehouse("simulated introspection failure"))
    }
}
