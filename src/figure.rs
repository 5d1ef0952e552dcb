// Backend-facing intermediate representation.
//
// PreparedSeries/Layout are what the rendering backend consumes; it
// executes them blindly and knows nothing about options or query results.

use crate::options::{AxisType, ChartType};
use crate::value::Value;
use serde::Serialize;

// =============================================================================
// Prepared data
// =============================================================================

/// Error-bar attachment for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBars {
    /// Symmetric spread when true; otherwise `minus` carries the lower side.
    pub symmetric: bool,
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub minus: Vec<Option<f64>>,
}

/// One backend-ready trace: coordinates plus style attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ChartType,
    pub visible: bool,
    /// Index into `Layout::y_axes`.
    pub y_axis: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    pub x: Vec<Value>,
    /// Shaped y values (post stacking/percent). None renders as a gap.
    pub y: Vec<Option<f64>>,
    /// Source y values the shaping passes re-derive from. Not exported.
    #[serde(skip)]
    pub y_raw: Vec<Option<f64>>,
    /// Cumulative stack offsets, aligned with `y`. Empty when unstacked.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub y_base: Vec<f64>,

    /// Pie slice labels.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Pie slice color overrides, aligned with `labels`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slice_colors: Vec<Option<String>>,
    /// Bubble marker sizes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<f64>,
    /// Heatmap z values.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub z: Vec<Option<f64>>,
    /// Per-point label text when data labels are enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_y: Option<ErrorBars>,
}

impl PreparedSeries {
    pub fn new(name: String, kind: ChartType) -> Self {
        Self {
            name,
            kind,
            visible: true,
            y_axis: 0,
            color: None,
            x: Vec::new(),
            y: Vec::new(),
            y_raw: Vec::new(),
            y_base: Vec::new(),
            labels: Vec::new(),
            slice_colors: Vec::new(),
            sizes: Vec::new(),
            z: Vec::new(),
            text: Vec::new(),
            error_y: None,
        }
    }
}

/// Backend-ready array of per-series objects. Derived, never persisted.
pub type PreparedData = Vec<PreparedSeries>;

// =============================================================================
// Layout
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

/// Derived configuration for a single axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AxisSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub show_labels: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
    pub side: AxisSide,
}

/// Derived axis/legend/global layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub x_axis: AxisSpec,
    pub y_axes: Vec<AxisSpec>,
    pub show_legend: bool,
    pub stacked: bool,
}

// =============================================================================
// Figure
// =============================================================================

/// What the render host hands to the backend each cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figure {
    pub data: PreparedData,
    pub layout: Layout,
    pub revision: u64,
}

impl Figure {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_skips_empty_fields() {
        let series = PreparedSeries::new("a".to_string(), ChartType::Line);
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.get("labels").is_none());
        assert!(json.get("error_y").is_none());
        assert_eq!(json["type"], "line");
    }

    #[test]
    fn test_y_raw_not_exported() {
        let mut series = PreparedSeries::new("a".to_string(), ChartType::Line);
        series.y_raw = vec![Some(1.0)];
        let json = serde_json::to_value(&series).unwrap();
        assert!(json.get("y_raw").is_none());
    }

    #[test]
    fn test_empty_figure() {
        let figure = Figure::empty();
        assert!(figure.data.is_empty());
        assert_eq!(figure.revision, 0);
    }
}
