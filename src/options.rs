// Declarative visualization options, deserialized from the editor's JSON.
//
// The whole object is replaced wholesale on every edit; no partial mutation
// is visible outside one update. Unknown keys and unrecognized tags degrade
// to defaults instead of failing deserialization.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Closed set of chart types the pipeline knows how to shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartType {
    Line,
    Area,
    #[default]
    Column,
    Scatter,
    Bubble,
    Pie,
    Histogram,
    Box,
    Heatmap,
    Custom,
}

impl ChartType {
    pub fn tag(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Column => "column",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Pie => "pie",
            ChartType::Histogram => "histogram",
            ChartType::Box => "box",
            ChartType::Heatmap => "heatmap",
            ChartType::Custom => "custom",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "line" => ChartType::Line,
            "area" => ChartType::Area,
            "column" | "bar" => ChartType::Column,
            "scatter" => ChartType::Scatter,
            "bubble" => ChartType::Bubble,
            "pie" => ChartType::Pie,
            "histogram" => ChartType::Histogram,
            "box" => ChartType::Box,
            "heatmap" => ChartType::Heatmap,
            "custom" => ChartType::Custom,
            _ => ChartType::default(),
        }
    }

    /// Types plotted against an x/y coordinate pair.
    pub fn is_cartesian(&self) -> bool {
        matches!(
            self,
            ChartType::Line
                | ChartType::Area
                | ChartType::Column
                | ChartType::Scatter
                | ChartType::Bubble
        )
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ChartType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ChartType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ChartType::from_tag(&tag))
    }
}

/// Axis scale type. Taken from options, never inferred from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisType {
    #[default]
    Auto,
    Linear,
    Category,
    Time,
}

impl AxisType {
    pub fn tag(&self) -> &'static str {
        match self {
            AxisType::Auto => "-",
            AxisType::Linear => "linear",
            AxisType::Category => "category",
            AxisType::Time => "time",
        }
    }
}

impl Serialize for AxisType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for AxisType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "linear" => AxisType::Linear,
            "category" => AxisType::Category,
            "time" | "datetime" => AxisType::Time,
            _ => AxisType::Auto,
        })
    }
}

/// Logical column roles driving the series builder.
///
/// The editor stores the mapping column-name -> role; internally we keep
/// the inverted role -> column-name view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    pub x: Option<String>,
    pub y: Option<String>,
    pub series: Option<String>,
    pub size: Option<String>,
    pub z_value: Option<String>,
    pub y_error: Option<String>,
}

impl From<HashMap<String, String>> for ColumnMapping {
    fn from(map: HashMap<String, String>) -> Self {
        let mut mapping = ColumnMapping::default();
        for (column, role) in map {
            match role.as_str() {
                "x" => mapping.x = Some(column),
                "y" => mapping.y = Some(column),
                "series" => mapping.series = Some(column),
                "size" => mapping.size = Some(column),
                "zValue" | "zVal" => mapping.z_value = Some(column),
                "yError" => mapping.y_error = Some(column),
                _ => {}
            }
        }
        mapping
    }
}

impl From<ColumnMapping> for HashMap<String, String> {
    fn from(mapping: ColumnMapping) -> Self {
        let mut map = HashMap::new();
        let mut put = |col: Option<String>, role: &str| {
            if let Some(c) = col {
                map.insert(c, role.to_string());
            }
        };
        put(mapping.x, "x");
        put(mapping.y, "y");
        put(mapping.series, "series");
        put(mapping.size, "size");
        put(mapping.z_value, "zValue");
        put(mapping.y_error, "yError");
        map
    }
}

impl Serialize for ColumnMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        HashMap::<String, String>::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColumnMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(ColumnMapping::from(map))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendOptions {
    pub enabled: bool,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabels {
    pub enabled: bool,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisTitle {
    pub text: String,
}

/// One axis definition from the options object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisOptions {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub title: Option<AxisTitle>,
    pub labels: AxisLabels,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
}

/// Error-bar sub-type: symmetric spread or explicit minus values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorBarKind {
    #[default]
    Data,
    DataMinMax,
}

impl Serialize for ErrorBarKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            ErrorBarKind::Data => "data",
            ErrorBarKind::DataMinMax => "data_min_max",
        })
    }
}

impl<'de> Deserialize<'de> for ErrorBarKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "data_min_max" => ErrorBarKind::DataMinMax,
            _ => ErrorBarKind::Data,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorYOptions {
    pub visible: bool,
    #[serde(rename = "type")]
    pub kind: ErrorBarKind,
}

/// Global shaping flags applied across all series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesBehavior {
    pub stacking: Option<String>,
    pub percent_values: bool,
    // The editor spells this one snake_case
    #[serde(rename = "error_y")]
    pub error_y: ErrorYOptions,
}

impl SeriesBehavior {
    /// Any non-empty stacking value enables stacking.
    pub fn is_stacked(&self) -> bool {
        self.stacking.as_deref().map_or(false, |s| !s.is_empty())
    }
}

/// Per-series overrides keyed by series name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerSeriesOptions {
    #[serde(rename = "type")]
    pub chart_type: Option<ChartType>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub y_axis: usize,
    pub z_index: i64,
}

/// Per-value overrides for pie slices, keyed by value label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueOptions {
    pub color: Option<String>,
}

/// The full declarative chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualizationOptions {
    pub global_series_type: ChartType,
    pub custom_code: Option<String>,
    pub column_mapping: ColumnMapping,
    pub enable_console_logs: bool,
    pub legend: LegendOptions,
    pub text_format: Option<String>,
    pub x_axis: AxisOptions,
    pub y_axis: Vec<AxisOptions>,
    pub sort_x: bool,
    pub series: SeriesBehavior,
    pub series_options: HashMap<String, PerSeriesOptions>,
    pub values_options: HashMap<String, ValueOptions>,
    pub number_format: String,
    pub percent_format: String,
    pub show_data_labels: bool,
}

impl Default for VisualizationOptions {
    fn default() -> Self {
        Self {
            global_series_type: ChartType::default(),
            custom_code: None,
            column_mapping: ColumnMapping::default(),
            enable_console_logs: false,
            legend: LegendOptions::default(),
            text_format: None,
            x_axis: AxisOptions::default(),
            y_axis: vec![AxisOptions::default()],
            sort_x: true,
            series: SeriesBehavior::default(),
            series_options: HashMap::new(),
            values_options: HashMap::new(),
            number_format: "0,0.00".to_string(),
            percent_format: "0.00%".to_string(),
            show_data_labels: false,
        }
    }
}

impl VisualizationOptions {
    pub fn from_json(value: &serde_json::Value) -> anyhow::Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Per-series overrides for a series name, defaults when absent.
    pub fn series_overrides(&self, name: &str) -> PerSeriesOptions {
        self.series_options.get(name).cloned().unwrap_or_default()
    }

    /// Resolved chart type for one series: override wins over global.
    pub fn resolved_type(&self, name: &str) -> ChartType {
        self.series_options
            .get(name)
            .and_then(|o| o.chart_type)
            .unwrap_or(self.global_series_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_json() {
        let options = VisualizationOptions::from_json(&json!({})).unwrap();
        assert_eq!(options.global_series_type, ChartType::Column);
        assert!(options.sort_x);
        assert!(options.legend.enabled);
        assert_eq!(options.y_axis.len(), 1);
    }

    #[test]
    fn test_column_mapping_inversion() {
        let options = VisualizationOptions::from_json(&json!({
            "columnMapping": {
                "created_at": "x",
                "count": "y",
                "country": "series",
                "pop": "size",
                "density": "zValue",
                "stddev": "yError"
            }
        }))
        .unwrap();
        let m = &options.column_mapping;
        assert_eq!(m.x.as_deref(), Some("created_at"));
        assert_eq!(m.y.as_deref(), Some("count"));
        assert_eq!(m.series.as_deref(), Some("country"));
        assert_eq!(m.size.as_deref(), Some("pop"));
        assert_eq!(m.z_value.as_deref(), Some("density"));
        assert_eq!(m.y_error.as_deref(), Some("stddev"));
    }

    #[test]
    fn test_unknown_role_ignored() {
        let options = VisualizationOptions::from_json(&json!({
            "columnMapping": {"foo": "unused"}
        }))
        .unwrap();
        assert_eq!(options.column_mapping, ColumnMapping::default());
    }

    #[test]
    fn test_chart_type_tags() {
        let options = VisualizationOptions::from_json(&json!({
            "globalSeriesType": "heatmap"
        }))
        .unwrap();
        assert_eq!(options.global_series_type, ChartType::Heatmap);
        // Unknown tags fall back to the default type
        let options = VisualizationOptions::from_json(&json!({
            "globalSeriesType": "sunburst"
        }))
        .unwrap();
        assert_eq!(options.global_series_type, ChartType::Column);
    }

    #[test]
    fn test_axis_type_aliases() {
        let options = VisualizationOptions::from_json(&json!({
            "xAxis": {"type": "datetime", "title": {"text": "Day"}}
        }))
        .unwrap();
        assert_eq!(options.x_axis.axis_type, AxisType::Time);
        assert_eq!(options.x_axis.title.as_ref().unwrap().text, "Day");
    }

    #[test]
    fn test_series_behavior() {
        let options = VisualizationOptions::from_json(&json!({
            "series": {
                "stacking": "stack",
                "percentValues": true,
                "error_y": {"visible": true, "type": "data_min_max"}
            }
        }))
        .unwrap();
        assert!(options.series.is_stacked());
        assert!(options.series.percent_values);
        assert!(options.series.error_y.visible);
        assert_eq!(options.series.error_y.kind, ErrorBarKind::DataMinMax);
    }

    #[test]
    fn test_stacking_empty_string_disabled() {
        let behavior = SeriesBehavior {
            stacking: Some(String::new()),
            ..Default::default()
        };
        assert!(!behavior.is_stacked());
    }

    #[test]
    fn test_resolved_type_override() {
        let options = VisualizationOptions::from_json(&json!({
            "globalSeriesType": "column",
            "seriesOptions": {
                "trend": {"type": "line", "yAxis": 1}
            }
        }))
        .unwrap();
        assert_eq!(options.resolved_type("trend"), ChartType::Line);
        assert_eq!(options.resolved_type("other"), ChartType::Column);
        assert_eq!(options.series_overrides("trend").y_axis, 1);
    }
}
