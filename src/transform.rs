// Options-driven shaping of built series into backend-ready traces.
//
// `prepare` derives PreparedData from scratch; `update` re-runs only the
// stacking/percent pass over existing PreparedData; `restyle` is the pure
// reaction to backend visibility events. Derivation is stateless, so
// calling `prepare` twice with the same inputs yields equal output.

use crate::backend::RestyleEvent;
use crate::figure::{ErrorBars, PreparedData, PreparedSeries};
use crate::format::{default_label_template, format_label, LabelContext};
use crate::options::{ChartType, ErrorBarKind, VisualizationOptions};
use crate::series::{Point, Series};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Build backend-ready traces from series and options.
pub fn prepare(series: &[Series], options: &VisualizationOptions) -> PreparedData {
    let mut data: PreparedData = Vec::with_capacity(series.len());
    let mut shaped_points: Vec<Vec<Point>> = Vec::with_capacity(series.len());

    for s in series {
        let points = shape_points(s, options);
        data.push(prepare_series(s, &points, options));
        shaped_points.push(points);
    }

    apply_series_math(&mut data, options);

    if options.show_data_labels {
        for (prepared, points) in data.iter_mut().zip(&shaped_points) {
            attach_labels(prepared, points, options);
        }
    }

    data
}

/// Re-apply only the percent/stacking pass, in place. Used after an
/// external mutation of the prepared structure (e.g. a visibility toggle)
/// without re-deriving from raw series.
pub fn update(data: &mut PreparedData, options: &VisualizationOptions) {
    apply_series_math(data, options);
}

/// Pure reaction to a backend restyle event: a visibility change yields a
/// new PreparedData with shaping recomputed over the visible series; any
/// other event is a no-op (`None`).
pub fn restyle(
    data: &PreparedData,
    options: &VisualizationOptions,
    event: &RestyleEvent,
) -> Option<PreparedData> {
    if event.visibility.is_empty() {
        return None;
    }

    let mut next = data.clone();
    for &(index, visible) in &event.visibility {
        if let Some(series) = next.get_mut(index) {
            series.visible = visible;
        }
    }
    apply_series_math(&mut next, options);
    Some(next)
}

/// Project series into the shared x array and per-series y map handed to
/// the custom-script bridge. No shaping is applied.
pub fn flatten_for_script(series: &[Series]) -> (Vec<Value>, BTreeMap<String, Vec<Value>>) {
    let mut x = Vec::new();
    let mut ys = BTreeMap::new();

    for s in series {
        let entry: &mut Vec<Value> = ys.entry(s.name.clone()).or_default();
        for point in &s.data {
            x.push(point.x.clone());
            entry.push(point.y.clone());
        }
    }

    (x, ys)
}

// =============================================================================
// Per-series shaping
// =============================================================================

/// Point sequence for one series after the sortX pass.
fn shape_points(series: &Series, options: &VisualizationOptions) -> Vec<Point> {
    let mut points = series.data.clone();
    if options.sort_x {
        // Stable: equal-x points keep their input order
        points.sort_by(|a, b| a.x.cmp_axis(&b.x));
    }
    points
}

fn prepare_series(
    series: &Series,
    points: &[Point],
    options: &VisualizationOptions,
) -> PreparedSeries {
    let overrides = options.series_overrides(&series.name);
    let kind = options.resolved_type(&series.name);
    let display_name = overrides.name.clone().unwrap_or_else(|| series.name.clone());

    let mut prepared = PreparedSeries::new(display_name, kind);
    prepared.y_axis = overrides.y_axis.min(1);
    prepared.color = overrides.color;

    match kind {
        ChartType::Pie => {
            for point in points {
                let label = point.x.to_string();
                let slice_color = options
                    .values_options
                    .get(&label)
                    .and_then(|v| v.color.clone());
                prepared.slice_colors.push(slice_color);
                prepared.labels.push(label);
                let y = point.y.as_f64();
                prepared.y_raw.push(y);
                prepared.y.push(y);
            }
        }
        ChartType::Histogram => {
            // Backend bins; only the x projection is needed
            for point in points {
                prepared.x.push(point.x.clone());
            }
        }
        ChartType::Heatmap => {
            for point in points {
                prepared.x.push(point.x.clone());
                prepared.labels.push(point.y.to_string());
                prepared.z.push(point.z_value.as_f64());
            }
        }
        ChartType::Box => {
            for point in points {
                prepared.x.push(point.x.clone());
                let y = point.y.as_f64();
                prepared.y_raw.push(y);
                prepared.y.push(y);
            }
        }
        _ => {
            for point in points {
                prepared.x.push(point.x.clone());
                let y = point.y.as_f64();
                prepared.y_raw.push(y);
                prepared.y.push(y);
                if kind == ChartType::Bubble {
                    prepared.sizes.push(point.size.as_f64().unwrap_or(0.0));
                }
            }
            if options.series.error_y.visible {
                prepared.error_y = Some(build_error_bars(points, options.series.error_y.kind));
            }
        }
    }

    prepared
}

fn build_error_bars(points: &[Point], kind: ErrorBarKind) -> ErrorBars {
    let values: Vec<Option<f64>> = points.iter().map(|p| p.y_error.as_f64()).collect();
    match kind {
        ErrorBarKind::Data => ErrorBars {
            symmetric: true,
            values,
            minus: Vec::new(),
        },
        ErrorBarKind::DataMinMax => {
            let minus = vec![Some(0.0); values.len()];
            ErrorBars {
                symmetric: false,
                values,
                minus,
            }
        }
    }
}

// =============================================================================
// Stacking / percent pass
// =============================================================================

/// Recompute shaped y values and stack offsets from the retained raw
/// values. Only visible cartesian traces participate in group sums, so
/// percentages always reflect what is actually on screen.
fn apply_series_math(data: &mut PreparedData, options: &VisualizationOptions) {
    for series in data.iter_mut() {
        if series.kind.is_cartesian() {
            series.y = series.y_raw.clone();
            series.y_base.clear();
        }
    }

    let stacked = options.series.is_stacked();
    let percent = options.series.percent_values;
    if !stacked && !percent {
        return;
    }

    if percent {
        let mut sums: HashMap<String, f64> = HashMap::new();
        for series in data.iter() {
            if !series.visible || !series.kind.is_cartesian() {
                continue;
            }
            for (x, y) in series.x.iter().zip(&series.y) {
                if let Some(v) = y {
                    *sums.entry(x.to_string()).or_insert(0.0) += v;
                }
            }
        }

        for series in data.iter_mut() {
            if !series.visible || !series.kind.is_cartesian() {
                continue;
            }
            for (x, y) in series.x.iter().zip(series.y.iter_mut()) {
                if let Some(v) = *y {
                    let sum = sums.get(&x.to_string()).copied().unwrap_or(0.0);
                    // All-zero stacks map to zero, not an error
                    *y = Some(if sum == 0.0 { 0.0 } else { v / sum * 100.0 });
                }
            }
        }
    }

    if stacked {
        let mut offsets: HashMap<String, f64> = HashMap::new();
        for series in data.iter_mut() {
            if !series.visible || !series.kind.is_cartesian() {
                continue;
            }
            for (x, y) in series.x.iter().zip(&series.y) {
                let key = x.to_string();
                let base = offsets.get(&key).copied().unwrap_or(0.0);
                series.y_base.push(base);
                if let Some(v) = y {
                    offsets.insert(key, base + v);
                }
            }
        }
    }
}

// =============================================================================
// Data labels
// =============================================================================

fn attach_labels(prepared: &mut PreparedSeries, points: &[Point], options: &VisualizationOptions) {
    let percent = options.series.percent_values;
    if !(prepared.kind.is_cartesian() || prepared.kind == ChartType::Pie) {
        return;
    }

    let template = options
        .text_format
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_label_template(percent));

    let pie_total: f64 = if prepared.kind == ChartType::Pie {
        prepared.y_raw.iter().flatten().sum()
    } else {
        0.0
    };

    let mut text = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let shaped = prepared.y.get(i).copied().flatten();
        let raw = prepared.y_raw.get(i).copied().flatten();
        let (y, y_percent) = if prepared.kind == ChartType::Pie {
            let pct = raw.map(|v| if pie_total == 0.0 { 0.0 } else { v / pie_total * 100.0 });
            (raw, pct)
        } else if percent {
            (raw, shaped)
        } else {
            (shaped, None)
        };

        let ctx = LabelContext {
            point,
            y,
            y_percent,
            number_format: &options.number_format,
            percent_format: &options.percent_format,
        };
        text.push(format_label(template, &ctx));
    }
    prepared.text = text;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QueryResult;
    use crate::series::build;
    use serde_json::json;

    fn options_with(json: serde_json::Value) -> VisualizationOptions {
        VisualizationOptions::from_json(&json).unwrap()
    }

    fn make_series(rows: serde_json::Value, options: &VisualizationOptions) -> Vec<Series> {
        let result = QueryResult::from_json(&rows).unwrap();
        build(
            &result,
            &options.column_mapping,
            options.global_series_type,
        )
    }

    fn xy_options(extra: serde_json::Value) -> VisualizationOptions {
        let mut base = json!({
            "globalSeriesType": "line",
            "columnMapping": {"x": "x", "y": "y", "g": "series"},
        });
        base.as_object_mut()
            .unwrap()
            .extend(extra.as_object().unwrap().clone());
        options_with(base)
    }

    #[test]
    fn test_sort_x_reorders_points() {
        // rows [{x:1,y:2},{x:0,y:5}] with sortX reorder ascending
        let options = xy_options(json!({"sortX": true}));
        let series = make_series(json!([{"x": 1, "y": 2}, {"x": 0, "y": 5}]), &options);
        let data = prepare(&series, &options);
        assert_eq!(data[0].x, vec![Value::Number(0.0), Value::Number(1.0)]);
        assert_eq!(data[0].y, vec![Some(5.0), Some(2.0)]);
    }

    #[test]
    fn test_sort_x_disabled_keeps_order() {
        let options = xy_options(json!({"sortX": false}));
        let series = make_series(json!([{"x": 1, "y": 2}, {"x": 0, "y": 5}]), &options);
        let data = prepare(&series, &options);
        assert_eq!(data[0].x, vec![Value::Number(1.0), Value::Number(0.0)]);
    }

    #[test]
    fn test_sort_x_stability() {
        let options = xy_options(json!({"sortX": true}));
        let series = make_series(
            json!([{"x": 1, "y": 3}, {"x": 1, "y": 1}, {"x": 0, "y": 2}]),
            &options,
        );
        let data = prepare(&series, &options);
        // Equal-x points keep relative input order
        assert_eq!(data[0].y, vec![Some(2.0), Some(3.0), Some(1.0)]);
    }

    #[test]
    fn test_percent_normalization() {
        // Two series; at x=1 values 10/30, at x=2 values 10/10
        let options = xy_options(json!({
            "series": {"stacking": "stack", "percentValues": true}
        }));
        let series = make_series(
            json!([
                {"x": 1, "y": 10, "g": "a"},
                {"x": 2, "y": 10, "g": "a"},
                {"x": 1, "y": 30, "g": "b"},
                {"x": 2, "y": 10, "g": "b"},
            ]),
            &options,
        );
        let data = prepare(&series, &options);
        assert_eq!(data[0].y, vec![Some(25.0), Some(50.0)]);
        assert_eq!(data[1].y, vec![Some(75.0), Some(50.0)]);
        // Stacked groups sum to 100 at every x
        for i in 0..2 {
            let total: f64 = data.iter().map(|s| s.y[i].unwrap()).sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_percent_all_zero_group() {
        let options = xy_options(json!({
            "series": {"percentValues": true}
        }));
        let series = make_series(
            json!([{"x": 1, "y": 0, "g": "a"}, {"x": 1, "y": 0, "g": "b"}]),
            &options,
        );
        let data = prepare(&series, &options);
        assert_eq!(data[0].y, vec![Some(0.0)]);
        assert_eq!(data[1].y, vec![Some(0.0)]);
    }

    #[test]
    fn test_stacking_offsets() {
        let options = xy_options(json!({
            "globalSeriesType": "column",
            "series": {"stacking": "stack"}
        }));
        let series = make_series(
            json!([
                {"x": "mon", "y": 5, "g": "a"},
                {"x": "tue", "y": 7, "g": "a"},
                {"x": "mon", "y": 3, "g": "b"},
                {"x": "tue", "y": 2, "g": "b"},
            ]),
            &options,
        );
        let data = prepare(&series, &options);
        assert_eq!(data[0].y_base, vec![0.0, 0.0]);
        assert_eq!(data[1].y_base, vec![5.0, 7.0]);
    }

    #[test]
    fn test_prepare_idempotent() {
        let options = xy_options(json!({
            "series": {"stacking": "stack", "percentValues": true}
        }));
        let series = make_series(
            json!([
                {"x": 1, "y": 10, "g": "a"},
                {"x": 1, "y": 30, "g": "b"},
            ]),
            &options,
        );
        let first = prepare(&series, &options);
        let second = prepare(&series, &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_update_reapplies_math_only() {
        let options = xy_options(json!({
            "series": {"percentValues": true}
        }));
        let series = make_series(
            json!([
                {"x": 1, "y": 10, "g": "a"},
                {"x": 1, "y": 30, "g": "b"},
            ]),
            &options,
        );
        let mut data = prepare(&series, &options);
        assert_eq!(data[0].y, vec![Some(25.0)]);
        // Percent pass re-derives from raw, so update is idempotent
        update(&mut data, &options);
        update(&mut data, &options);
        assert_eq!(data[0].y, vec![Some(25.0)]);
    }

    #[test]
    fn test_restyle_recomputes_for_visible_series() {
        let options = xy_options(json!({
            "series": {"percentValues": true}
        }));
        let series = make_series(
            json!([
                {"x": 1, "y": 10, "g": "a"},
                {"x": 1, "y": 30, "g": "b"},
            ]),
            &options,
        );
        let data = prepare(&series, &options);
        let event = RestyleEvent::visibility(vec![(1, false)]);
        let next = restyle(&data, &options, &event).unwrap();
        // Hidden series excluded from the sum: remaining series is 100%
        assert_eq!(next[0].y, vec![Some(100.0)]);
        assert!(!next[1].visible);
        // Original data untouched
        assert_eq!(data[0].y, vec![Some(25.0)]);
    }

    #[test]
    fn test_restyle_noop_for_other_events() {
        let options = xy_options(json!({}));
        let series = make_series(json!([{"x": 1, "y": 2}]), &options);
        let data = prepare(&series, &options);
        let event = RestyleEvent::default();
        assert!(restyle(&data, &options, &event).is_none());
    }

    #[test]
    fn test_flatten_for_script() {
        // series [{name:"a", data:[{x:1,y:2}]}] -> x=[1], ys={a:[2]}
        let options = options_with(json!({
            "globalSeriesType": "custom",
            "columnMapping": {"x": "x", "y": "y"}
        }));
        let mut series = make_series(json!([{"x": 1, "y": 2}]), &options);
        series[0].name = "a".to_string();
        let (x, ys) = flatten_for_script(&series);
        assert_eq!(x, vec![Value::Number(1.0)]);
        assert_eq!(ys["a"], vec![Value::Number(2.0)]);
    }

    #[test]
    fn test_missing_y_renders_gap() {
        let options = xy_options(json!({"sortX": false}));
        let series = make_series(json!([{"x": 1}, {"x": 2, "y": 5}]), &options);
        let data = prepare(&series, &options);
        assert_eq!(data[0].y, vec![None, Some(5.0)]);
        assert_eq!(data[0].x.len(), 2);
    }

    #[test]
    fn test_pie_labels_and_values() {
        let options = options_with(json!({
            "globalSeriesType": "pie",
            "columnMapping": {"country": "x", "amount": "y"},
            "valuesOptions": {"fi": {"color": "#123456"}}
        }));
        let series = make_series(
            json!([{"country": "fi", "amount": 4}, {"country": "se", "amount": 6}]),
            &options,
        );
        let data = prepare(&series, &options);
        assert_eq!(data[0].labels, vec!["fi", "se"]);
        assert_eq!(data[0].y, vec![Some(4.0), Some(6.0)]);
        assert_eq!(data[0].slice_colors[0].as_deref(), Some("#123456"));
        assert_eq!(data[0].slice_colors[1], None);
    }

    #[test]
    fn test_error_bars_symmetric() {
        let options = options_with(json!({
            "globalSeriesType": "line",
            "columnMapping": {"x": "x", "y": "y", "err": "yError"},
            "series": {"error_y": {"visible": true, "type": "data"}}
        }));
        let series = make_series(json!([{"x": 1, "y": 10, "err": 2}]), &options);
        let data = prepare(&series, &options);
        let bars = data[0].error_y.as_ref().unwrap();
        assert!(bars.symmetric);
        assert_eq!(bars.values, vec![Some(2.0)]);
    }

    #[test]
    fn test_bubble_sizes() {
        let options = options_with(json!({
            "globalSeriesType": "bubble",
            "columnMapping": {"x": "x", "y": "y", "pop": "size"}
        }));
        let series = make_series(json!([{"x": 1, "y": 2, "pop": 30}]), &options);
        let data = prepare(&series, &options);
        assert_eq!(data[0].sizes, vec![30.0]);
    }

    #[test]
    fn test_series_type_override_and_axis() {
        let options = options_with(json!({
            "globalSeriesType": "column",
            "columnMapping": {"x": "x", "y": "y", "g": "series"},
            "seriesOptions": {"b": {"type": "line", "yAxis": 1, "name": "Trend"}}
        }));
        let series = make_series(
            json!([{"x": 1, "y": 2, "g": "a"}, {"x": 1, "y": 3, "g": "b"}]),
            &options,
        );
        let data = prepare(&series, &options);
        assert_eq!(data[0].kind, ChartType::Column);
        assert_eq!(data[1].kind, ChartType::Line);
        assert_eq!(data[1].y_axis, 1);
        assert_eq!(data[1].name, "Trend");
    }

    #[test]
    fn test_data_labels() {
        let options = options_with(json!({
            "globalSeriesType": "column",
            "columnMapping": {"x": "x", "y": "y"},
            "showDataLabels": true,
            "numberFormat": "0.0"
        }));
        let series = make_series(json!([{"x": 1, "y": 12.34}]), &options);
        let data = prepare(&series, &options);
        assert_eq!(data[0].text, vec!["12.3"]);
    }
}
