use anyhow::{anyhow, Result};
use serde_json::Value as JsonValue;

/// One result row: column name -> raw cell, in column order.
pub type Row = serde_json::Map<String, JsonValue>;

/// A tabular query result as supplied by the data source.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Create a QueryResult from a JSON array of objects.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(array.len());

        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            rows.push(obj.clone());
        }

        Ok(Self { columns, rows })
    }

    /// Create a QueryResult from CSV text. All cells stay strings; the
    /// value normalizer decides what they mean downstream.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|e| anyhow!("Failed to read CSV headers: {}", e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| anyhow!("Failed to read CSV record: {}", e))?;
            let mut row = Row::new();
            for (header, field) in columns.iter().zip(record.iter()) {
                row.insert(header.clone(), JsonValue::String(field.to_string()));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
