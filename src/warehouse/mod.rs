//! Warehouse abstraction layer for sqlward.
//!
//! Provides a trait-based interface for warehouse operations, allowing the
//! real BigQuery backend and in-memory test doubles to be used
//! interchangeably.

mod bigquery;
mod mock;
mod schema;
mod types;

pub use bigquery::BigQueryClient;
pub use mock::{FailingWarehouseClient, MockWarehouseClient};
pub use schema::{DatasetSchema, Field, TableSchema};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::WarehouseConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Supported warehouse backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseBackend {
    #[default]
    BigQuery,
    /// In-memory stub, for offline runs and tests.
    Mock,
}

impl WarehouseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::Mock => "mock",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bigquery" | "bq" => Some(Self::BigQuery),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Creates a warehouse client for the given backend and configuration.
///
/// This is the central factory function for warehouse connections.
pub fn connect(backend: WarehouseBackend, config: &WarehouseConfig) -> Result<Box<dyn WarehouseClient>> {
    match backend {
        WarehouseBackend::BigQuery => {
            let client = BigQueryClient::from_config(config)?;
            Ok(Box::new(client))
        }
        WarehouseBackend::Mock => Ok(Box::new(MockWarehouseClient::new())),
    }
}

/// Trait defining the interface for warehouse clients.
///
/// All warehouse operations are async and return Results with SqlwardError.
#[async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Executes a SQL query and returns the results.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult>;

    /// Lists the tables of the configured dataset with their fields.
    async fn list_tables(&self) -> Result<DatasetSchema>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!(
            WarehouseBackend::parse("bigquery"),
            Some(WarehouseBackend::BigQuery)
        );
        assert_eq!(
            WarehouseBackend::parse("BQ"),
            Some(WarehouseBackend::BigQuery)
        );
        assert_eq!(WarehouseBackend::parse("mock"), Some(WarehouseBackend::Mock));
        assert_eq!(WarehouseBackend::parse("oracle-db"), None);
    }

    #[test]
    fn test_backend_as_str() {
        assert_eq!(WarehouseBackend::BigQuery.as_str(), "bigquery");
        assert_eq!(WarehouseBackend::Mock.as_str(), "mock");
    }

    #[test]
    fn test_connect_mock() {
        let config = WarehouseConfig::default();
        let client = connect(WarehouseBackend::Mock, &config);
        assert!(client.is_ok());
    }
}
