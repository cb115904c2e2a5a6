//! Dataset schema types for sqlward.
//!
//! Represents the structure of the analytical dataset and formats it for
//! injection into the generation prompt.

use serde::{Deserialize, Serialize};

/// Represents the complete schema of the configured dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSchema {
    /// All tables in the dataset.
    pub tables: Vec<TableSchema>,
}

impl DatasetSchema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the schema for inclusion in the generation prompt.
    ///
    /// Each table is listed with its fully-qualified name followed by one
    /// indented `field (TYPE)` line per column.
    pub fn format_for_prompt(&self) -> String {
        self.tables
            .iter()
            .map(|table| {
                let fields = table
                    .fields
                    .iter()
                    .map(|f| format!("{} ({})", f.name, f.field_type))
                    .collect::<Vec<_>>()
                    .join("\n    ");
                format!("- {} :\n    {}", table.full_table_id, fields)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns true if the schema has no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Schema of a single warehouse table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSchema {
    /// Fully-qualified table ID (`project.dataset.table`).
    pub full_table_id: String,

    /// Fields of the table.
    pub fields: Vec<Field>,
}

impl TableSchema {
    /// Creates a new table schema.
    pub fn new(full_table_id: impl Into<String>) -> Self {
        Self {
            full_table_id: full_table_id.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field to the table.
    pub fn field(mut self, name: impl Into<String>, field_type: impl Into<String>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            field_type: field_type.into(),
        });
        self
    }
}

/// A single field of a table schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    /// Field name.
    pub name: String,

    /// Warehouse type (STRING, INTEGER, FLOAT, DATE, ...).
    pub field_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> DatasetSchema {
        DatasetSchema {
            tables: vec![
                TableSchema::new("acme-analytics.retail.tickets")
                    .field("TICKET_ID", "INTEGER")
                    .field("DATE_TICKET", "STRING")
                    .field("montant", "FLOAT"),
                TableSchema::new("acme-analytics.retail.clients")
                    .field("CLIENT_ID", "INTEGER")
                    .field("VILLE", "STRING"),
            ],
        }
    }

    #[test]
    fn test_format_for_prompt_lists_tables() {
        let formatted = sample_schema().format_for_prompt();

        assert!(formatted.contains("- acme-analytics.retail.tickets :"));
        assert!(formatted.contains("- acme-analytics.retail.clients :"));
        assert!(formatted.contains("DATE_TICKET (STRING)"));
        assert!(formatted.contains("montant (FLOAT)"));
    }

    #[test]
    fn test_format_for_prompt_indents_fields() {
        let formatted = sample_schema().format_for_prompt();
        assert!(formatted.contains("    TICKET_ID (INTEGER)"));
    }

    #[test]
    fn test_empty_schema() {
        let schema = DatasetSchema::new();
        assert!(schema.is_empty());
        assert_eq!(schema.format_for_prompt(), "");
    }
}
