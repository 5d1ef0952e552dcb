// Library exports for plotprep

pub mod backend;
pub mod data;
pub mod figure;
pub mod format;
pub mod host;
pub mod layout;
pub mod options;
pub mod registry;
pub mod render;
pub mod script;
pub mod series;
pub mod transform;
pub mod value;

pub use backend::{Backend, PlotConfig, PlotElement, RestyleEvent};
pub use data::QueryResult;
pub use figure::{Figure, Layout, PreparedData, PreparedSeries};
pub use host::RenderHost;
pub use options::{ChartType, ColumnMapping, VisualizationOptions};
pub use series::{Point, Series};
pub use value::{normalize, Value};

/// One-shot derivation: build series from a result and shape them into a
/// backend-ready figure. Revision handling is the render host's job; the
/// returned figure carries revision 0.
pub fn prepare_figure(result: &QueryResult, options: &VisualizationOptions) -> Figure {
    let series = series::build(result, &options.column_mapping, options.global_series_type);
    let data = transform::prepare(&series, options);
    let layout = layout::derive_layout(&series, options, Some(&data));
    Figure {
        data,
        layout,
        revision: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prepare_figure() {
        let result = QueryResult::from_json(&json!([
            {"x": 1, "y": 10},
            {"x": 2, "y": 20},
        ]))
        .unwrap();
        let options = VisualizationOptions::from_json(&json!({
            "globalSeriesType": "line",
            "columnMapping": {"x": "x", "y": "y"}
        }))
        .unwrap();
        let figure = prepare_figure(&result, &options);
        assert_eq!(figure.data.len(), 1);
        assert_eq!(figure.data[0].y, vec![Some(10.0), Some(20.0)]);
        assert_eq!(figure.revision, 0);
    }
}
