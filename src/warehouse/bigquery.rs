//! BigQuery warehouse client implementation.
//!
//! Implements the WarehouseClient trait over the BigQuery REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::WarehouseConfig;
use crate::error::{Result, SqlwardError};
use crate::warehouse::{
    ColumnInfo, DatasetSchema, Field, QueryResult, Row, TableSchema, Value, WarehouseClient,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// BigQuery API base URL.
const BIGQUERY_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Environment variable holding the OAuth bearer token.
const ACCESS_TOKEN_ENV: &str = "SQLWARD_ACCESS_TOKEN";

/// BigQuery warehouse client.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    project: String,
    dataset: String,
    location: String,
    access_token: String,
    client: Client,
}

impl BigQueryClient {
    /// Creates a client from the warehouse configuration.
    ///
    /// Reads the bearer token from `SQLWARD_ACCESS_TOKEN`.
    pub fn from_config(config: &WarehouseConfig) -> Result<Self> {
        let project = config
            .project
            .clone()
            .ok_or_else(|| SqlwardError::config("warehouse project is required"))?;
        let dataset = config
            .dataset
            .clone()
            .ok_or_else(|| SqlwardError::config("warehouse dataset is required"))?;

        let access_token = std::env::var(ACCESS_TOKEN_ENV).map_err(|_| {
            SqlwardError::warehouse(format!("{ACCESS_TOKEN_ENV} environment variable not set"))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SqlwardError::warehouse(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            project,
            dataset,
            location: config.location.clone(),
            access_token,
            client,
        })
    }

    /// Maps an API error response to a SqlwardError.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> SqlwardError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return SqlwardError::warehouse(format!(
                "Authentication failed. Check your {ACCESS_TOKEN_ENV}."
            ));
        }

        if let Ok(error_response) = serde_json::from_str::<BqErrorResponse>(body) {
            return SqlwardError::warehouse(format!(
                "BigQuery API error: {}",
                error_response.error.message
            ));
        }

        SqlwardError::warehouse(format!("BigQuery API error ({status}): {body}"))
    }

    /// Issues an authenticated GET and returns the response body on success.
    async fn get(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| SqlwardError::warehouse(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlwardError::warehouse(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }
        Ok(body)
    }

    /// Converts a BigQuery row payload into typed values.
    fn decode_row(fields: &[BqField], row: &BqRow) -> Row {
        row.f
            .iter()
            .zip(fields.iter())
            .map(|(cell, field)| match &cell.v {
                None => Value::Null,
                Some(raw) => match field.field_type.as_str() {
                    "INTEGER" | "INT64" => raw
                        .parse::<i64>()
                        .map(Value::Int)
                        .unwrap_or_else(|_| Value::String(raw.clone())),
                    "FLOAT" | "FLOAT64" | "NUMERIC" => raw
                        .parse::<f64>()
                        .map(Value::Float)
                        .unwrap_or_else(|_| Value::String(raw.clone())),
                    "BOOLEAN" | "BOOL" => match raw.as_str() {
                        "true" => Value::Bool(true),
                        "false" => Value::Bool(false),
                        _ => Value::String(raw.clone()),
                    },
                    _ => Value::String(raw.clone()),
                },
            })
            .collect()
    }
}

#[async_trait]
impl WarehouseClient for BigQueryClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult> {
        let url = format!("{BIGQUERY_API_URL}/projects/{}/queries", self.project);
        let request = BqQueryRequest {
            query: sql.to_string(),
            use_legacy_sql: false,
            location: self.location.clone(),
        };

        debug!(project = %self.project, "Submitting query to BigQuery");
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| SqlwardError::warehouse(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlwardError::warehouse(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let parsed: BqQueryResponse = serde_json::from_str(&body)
            .map_err(|e| SqlwardError::warehouse(format!("Failed to parse response: {e}")))?;

        if !parsed.job_complete {
            return Err(SqlwardError::warehouse(
                "query did not complete within the request deadline",
            ));
        }

        let fields = parsed.schema.map(|s| s.fields).unwrap_or_default();
        let columns = fields
            .iter()
            .map(|f| ColumnInfo::new(&f.name, &f.field_type))
            .collect();
        let rows: Vec<Row> = parsed
            .rows
            .iter()
            .map(|row| Self::decode_row(&fields, row))
            .collect();

        Ok(QueryResult::with_data(columns, rows).with_execution_time(start.elapsed()))
    }

    async fn list_tables(&self) -> Result<DatasetSchema> {
        let url = format!(
            "{BIGQUERY_API_URL}/projects/{}/datasets/{}/tables",
            self.project, self.dataset
        );
        let body = self.get(&url).await?;
        let listing: BqTableList = serde_json::from_str(&body)
            .map_err(|e| SqlwardError::warehouse(format!("Failed to parse table list: {e}")))?;

        let mut tables = Vec::new();
        for entry in &listing.tables {
            let table_id = &entry.table_reference.table_id;
            let table_url = format!(
                "{BIGQUERY_API_URL}/projects/{}/datasets/{}/tables/{}",
                self.project, self.dataset, table_id
            );
            let table_body = self.get(&table_url).await?;
            let table: BqTable = serde_json::from_str(&table_body).map_err(|e| {
                SqlwardError::warehouse(format!("Failed to parse table {table_id}: {e}"))
            })?;

            let mut schema = TableSchema::new(format!(
                "{}.{}.{}",
                self.project, self.dataset, table_id
            ));
            schema.fields = table
                .schema
                .map(|s| {
                    s.fields
                        .into_iter()
                        .map(|f| Field {
                            name: f.name,
                            field_type: f.field_type,
                        })
                        .collect()
                })
                .unwrap_or_default();
            tables.push(schema);
        }

        Ok(DatasetSchema { tables })
    }
}

// === Wire types ===

#[derive(Debug, Serialize)]
struct BqQueryRequest {
    query: String,
    #[serde(rename = "useLegacySql")]
    use_legacy_sql: bool,
    location: String,
}

#[derive(Debug, Deserialize)]
struct BqQueryResponse {
    #[serde(rename = "jobComplete", default)]
    job_complete: bool,
    #[serde(default)]
    schema: Option<BqSchema>,
    #[serde(default)]
    rows: Vec<BqRow>,
}

#[derive(Debug, Deserialize)]
struct BqSchema {
    #[serde(default)]
    fields: Vec<BqField>,
}

#[derive(Debug, Deserialize)]
struct BqField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct BqRow {
    #[serde(default)]
    f: Vec<BqCell>,
}

#[derive(Debug, Deserialize)]
struct BqCell {
    #[serde(default)]
    v: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BqTableList {
    #[serde(default)]
    tables: Vec<BqTableListEntry>,
}

#[derive(Debug, Deserialize)]
struct BqTableListEntry {
    #[serde(rename = "tableReference")]
    table_reference: BqTableReference,
}

#[derive(Debug, Deserialize)]
struct BqTableReference {
    #[serde(rename = "tableId")]
    table_id: String,
}

#[derive(Debug, Deserialize)]
struct BqTable {
    #[serde(default)]
    schema: Option<BqSchema>,
}

#[derive(Debug, Deserialize)]
struct BqErrorResponse {
    error: BqErrorDetail,
}

#[derive(Debug, Deserialize)]
struct BqErrorDetail {
    message: String,
}
