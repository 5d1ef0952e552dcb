use crate::data::{QueryResult, Row};
use crate::options::{ChartType, ColumnMapping};
use crate::value::{normalize, Value};
use std::collections::HashMap;

/// Default series name when no series-role column is mapped.
pub const DEFAULT_SERIES_NAME: &str = "All";

/// One plotted point. Fields for unmapped roles stay `Missing`; the
/// originating row is retained for tooltips and label templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: Value,
    pub y: Value,
    pub y_error: Value,
    pub size: Value,
    pub z_value: Value,
    pub raw_row: Row,
}

/// A named, ordered collection of points sharing one visual encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub chart_type: ChartType,
    pub data: Vec<Point>,
}

/// Map rows into per-series point sequences using the column roles.
///
/// Rows are grouped by the series-role column value (first-seen group
/// order); without a series mapping everything lands in one default
/// series. Rows with missing x/y cells are kept, not dropped.
pub fn build(result: &QueryResult, mapping: &ColumnMapping, global_type: ChartType) -> Vec<Series> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Point>> = HashMap::new();

    for row in &result.rows {
        let key = match &mapping.series {
            Some(col) => normalize_cell(row, col).to_string(),
            None => DEFAULT_SERIES_NAME.to_string(),
        };

        if !grouped.contains_key(&key) {
            order.push(key.clone());
        }

        grouped.entry(key).or_default().push(Point {
            x: mapped_cell(row, mapping.x.as_deref()),
            y: mapped_cell(row, mapping.y.as_deref()),
            y_error: mapped_cell(row, mapping.y_error.as_deref()),
            size: mapped_cell(row, mapping.size.as_deref()),
            z_value: mapped_cell(row, mapping.z_value.as_deref()),
            raw_row: row.clone(),
        });
    }

    order
        .into_iter()
        .map(|name| {
            let data = grouped.remove(&name).unwrap_or_default();
            Series {
                name,
                chart_type: global_type,
                data,
            }
        })
        .collect()
}

fn mapped_cell(row: &Row, column: Option<&str>) -> Value {
    match column {
        Some(col) => normalize_cell(row, col),
        None => Value::Missing,
    }
}

fn normalize_cell(row: &Row, column: &str) -> Value {
    match row.get(column) {
        Some(raw) => normalize(raw),
        None => Value::Missing,
    }
}
