// Layout derivation: axis specs, legend visibility, global flags.
//
// Pure function of (series, options, prepared data). Tolerates absent
// prepared data by falling back to default ranges.

use crate::figure::{AxisSide, AxisSpec, Layout, PreparedData};
use crate::options::{AxisOptions, ChartType, VisualizationOptions};
use crate::series::Series;

/// Derive the backend layout for the current cycle.
pub fn derive_layout(
    series: &[Series],
    options: &VisualizationOptions,
    prepared: Option<&PreparedData>,
) -> Layout {
    let x_axis = AxisSpec {
        title: axis_title(&options.x_axis),
        axis_type: options.x_axis.axis_type,
        show_labels: options.x_axis.labels.enabled,
        range: None,
        side: AxisSide::Left,
    };

    let y_axes = derive_y_axes(series, options, prepared);

    Layout {
        title: None,
        x_axis,
        y_axes,
        show_legend: options.legend.enabled,
        stacked: options.series.is_stacked(),
    }
}

fn axis_title(axis: &AxisOptions) -> Option<String> {
    axis.title
        .as_ref()
        .map(|t| t.text.clone())
        .filter(|t| !t.is_empty())
}

fn derive_y_axes(
    series: &[Series],
    options: &VisualizationOptions,
    prepared: Option<&PreparedData>,
) -> Vec<AxisSpec> {
    let needs_second = match prepared {
        Some(data) => data.iter().any(|s| s.y_axis == 1),
        None => series
            .iter()
            .any(|s| options.series_overrides(&s.name).y_axis == 1),
    };
    let count = if needs_second { 2 } else { 1 };

    let default_axis = AxisOptions::default();
    (0..count)
        .map(|index| {
            let axis = options.y_axis.get(index).unwrap_or(&default_axis);
            AxisSpec {
                title: axis_title(axis),
                axis_type: axis.axis_type,
                show_labels: axis.labels.enabled,
                range: y_axis_range(axis, index, options, prepared),
                side: if index == 0 {
                    AxisSide::Left
                } else {
                    AxisSide::Right
                },
            }
        })
        .collect()
}

fn y_axis_range(
    axis: &AxisOptions,
    index: usize,
    options: &VisualizationOptions,
    prepared: Option<&PreparedData>,
) -> Option<(f64, f64)> {
    // Percent normalization pins the scale, configured range or not
    if options.series.percent_values {
        return Some((0.0, 100.0));
    }

    match (axis.range_min, axis.range_max) {
        (Some(min), Some(max)) => Some((min, max)),
        (None, None) => None,
        (partial_min, partial_max) => {
            // Fill the open side from data when we have it
            let (data_min, data_max) = data_extent(index, prepared)?;
            Some((
                partial_min.unwrap_or(data_min),
                partial_max.unwrap_or(data_max),
            ))
        }
    }
}

/// Min/max of shaped y values (stack tops included) on one y axis.
fn data_extent(index: usize, prepared: Option<&PreparedData>) -> Option<(f64, f64)> {
    let data = prepared?;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut bars = false;

    for series in data {
        if series.y_axis != index || !series.visible {
            continue;
        }
        if matches!(series.kind, ChartType::Column | ChartType::Area) {
            bars = true;
        }
        for (i, y) in series.y.iter().enumerate() {
            if let Some(v) = y {
                let base = series.y_base.get(i).copied().unwrap_or(0.0);
                min = min.min(base + v);
                max = max.max(base + v);
            }
        }
    }

    if bars {
        // Bars are anchored at zero
        min = min.min(0.0);
        max = max.max(0.0);
    }

    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::AxisType;
    use crate::transform::prepare;
    use serde_json::json;

    fn options_with(json: serde_json::Value) -> VisualizationOptions {
        VisualizationOptions::from_json(&json).unwrap()
    }

    #[test]
    fn test_legend_follows_options() {
        // legend.enabled=false wins regardless of series content
        let options = options_with(json!({"legend": {"enabled": false}}));
        let layout = derive_layout(&[], &options, None);
        assert!(!layout.show_legend);
        let options = options_with(json!({}));
        assert!(derive_layout(&[], &options, None).show_legend);
    }

    #[test]
    fn test_axis_titles_and_types() {
        let options = options_with(json!({
            "xAxis": {"type": "category", "title": {"text": "Country"}, "labels": {"enabled": false}},
            "yAxis": [{"type": "linear", "title": {"text": "Count"}}]
        }));
        let layout = derive_layout(&[], &options, None);
        assert_eq!(layout.x_axis.title.as_deref(), Some("Country"));
        assert_eq!(layout.x_axis.axis_type, AxisType::Category);
        assert!(!layout.x_axis.show_labels);
        assert_eq!(layout.y_axes.len(), 1);
        assert_eq!(layout.y_axes[0].title.as_deref(), Some("Count"));
    }

    #[test]
    fn test_empty_title_is_none() {
        let options = options_with(json!({"xAxis": {"title": {"text": ""}}}));
        let layout = derive_layout(&[], &options, None);
        assert_eq!(layout.x_axis.title, None);
    }

    #[test]
    fn test_explicit_range() {
        let options = options_with(json!({
            "yAxis": [{"rangeMin": -5.0, "rangeMax": 20.0}]
        }));
        let layout = derive_layout(&[], &options, None);
        assert_eq!(layout.y_axes[0].range, Some((-5.0, 20.0)));
    }

    #[test]
    fn test_percent_forces_range() {
        let options = options_with(json!({
            "series": {"percentValues": true},
            "yAxis": [{"rangeMin": -5.0, "rangeMax": 20.0}]
        }));
        let layout = derive_layout(&[], &options, None);
        assert_eq!(layout.y_axes[0].range, Some((0.0, 100.0)));
    }

    #[test]
    fn test_tolerates_absent_prepared_data() {
        let options = options_with(json!({
            "yAxis": [{"rangeMin": 3.0}]
        }));
        // Partial range with no data: no range rather than failure
        let layout = derive_layout(&[], &options, None);
        assert_eq!(layout.y_axes[0].range, None);
    }

    #[test]
    fn test_partial_range_filled_from_data() {
        let options = options_with(json!({
            "globalSeriesType": "line",
            "columnMapping": {"x": "x", "y": "y"},
            "yAxis": [{"rangeMin": 0.0}]
        }));
        let result = crate::data::QueryResult::from_json(&json!([
            {"x": 1, "y": 4}, {"x": 2, "y": 9}
        ]))
        .unwrap();
        let series = crate::series::build(
            &result,
            &options.column_mapping,
            options.global_series_type,
        );
        let prepared = prepare(&series, &options);
        let layout = derive_layout(&series, &options, Some(&prepared));
        assert_eq!(layout.y_axes[0].range, Some((0.0, 9.0)));
    }

    #[test]
    fn test_second_axis_from_series_options() {
        let options = options_with(json!({
            "globalSeriesType": "column",
            "columnMapping": {"x": "x", "y": "y", "g": "series"},
            "seriesOptions": {"b": {"yAxis": 1}},
            "yAxis": [{"title": {"text": "Left"}}, {"title": {"text": "Right"}}]
        }));
        let result = crate::data::QueryResult::from_json(&json!([
            {"x": 1, "y": 4, "g": "a"}, {"x": 1, "y": 9, "g": "b"}
        ]))
        .unwrap();
        let series = crate::series::build(
            &result,
            &options.column_mapping,
            options.global_series_type,
        );
        let layout = derive_layout(&series, &options, None);
        assert_eq!(layout.y_axes.len(), 2);
        assert_eq!(layout.y_axes[1].side, AxisSide::Right);
        assert_eq!(layout.y_axes[1].title.as_deref(), Some("Right"));
    }

    #[test]
    fn test_stacked_flag() {
        let options = options_with(json!({"series": {"stacking": "stack"}}));
        assert!(derive_layout(&[], &options, None).stacked);
    }
}
