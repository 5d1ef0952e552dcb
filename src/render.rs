// Plotters-based preview backend: draws a prepared figure to PNG bytes.
//
// This is a demo/CLI surface, not the production rendering engine; pie,
// histogram, box and heatmap traces are skipped rather than approximated.

use crate::backend::{Backend, PlotConfig, PlotElement};
use crate::figure::{Figure, PreparedSeries};
use crate::options::ChartType;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

const PALETTE: &[RGBColor] = &[
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Render the cartesian traces of a figure to PNG bytes.
pub fn render_png(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>> {
    let traces: Vec<&PreparedSeries> = figure
        .data
        .iter()
        .filter(|s| s.visible && s.kind.is_cartesian())
        .collect();

    let (positions, categories) = resolve_x_positions(&traces);

    // Global ranges across all traces (stack tops included)
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    let mut has_bars = false;

    for (trace, xs) in traces.iter().zip(&positions) {
        if trace.kind == ChartType::Column || trace.kind == ChartType::Area {
            has_bars = true;
        }
        for (i, &x) in xs.iter().enumerate() {
            let Some(Some(y)) = trace.y.get(i) else {
                continue;
            };
            let base = trace.y_base.get(i).copied().unwrap_or(0.0);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(base + y);
            y_max = y_max.max(base + y);
        }
    }

    if !x_min.is_finite() {
        anyhow::bail!("Cannot render a figure with no drawable points");
    }
    if has_bars {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }
    if let Some(axis) = figure.layout.y_axes.first() {
        if let Some((min, max)) = axis.range {
            y_min = min;
            y_max = max;
        }
    }

    let x_range = pad_range(x_min, x_max);
    let y_range = pad_range(y_min, y_max);

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).context("Failed to fill background")?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                figure.layout.title.as_deref().unwrap_or(""),
                ("sans-serif", 20),
            )
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
            .context("Failed to build chart")?;

        let cats = categories.clone().unwrap_or_default();
        let category_formatter = move |v: &f64| -> String {
            let idx = v.round() as i64;
            if idx >= 0 && (idx as usize) < cats.len() && (v - idx as f64).abs() < 0.3 {
                cats[idx as usize].clone()
            } else {
                String::new()
            }
        };
        if categories.is_some() {
            chart
                .configure_mesh()
                .x_label_formatter(&category_formatter)
                .draw()
                .context("Failed to draw mesh")?;
        } else {
            chart
                .configure_mesh()
                .draw()
                .context("Failed to draw mesh")?;
        }

        for (idx, (trace, xs)) in traces.iter().zip(&positions).enumerate() {
            let color = trace_color(trace, idx);
            draw_trace(&mut chart, trace, xs, color)?;
        }

        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

type PreviewChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_trace(
    chart: &mut PreviewChart<'_, '_>,
    trace: &PreparedSeries,
    xs: &[f64],
    color: RGBColor,
) -> Result<()> {
    match trace.kind {
        ChartType::Column => {
            let bar_width = 0.8;
            for (i, &x) in xs.iter().enumerate() {
                let Some(Some(y)) = trace.y.get(i) else {
                    continue;
                };
                let base = trace.y_base.get(i).copied().unwrap_or(0.0);
                chart
                    .draw_series(std::iter::once(Rectangle::new(
                        [
                            (x - bar_width / 2.0, base),
                            (x + bar_width / 2.0, base + y),
                        ],
                        color.mix(0.8).filled(),
                    )))
                    .context("Failed to draw bar")?;
            }
        }
        ChartType::Scatter | ChartType::Bubble => {
            let points = drawable_points(trace, xs);
            chart
                .draw_series(points.iter().enumerate().map(|(i, &(x, y))| {
                    let size = trace.sizes.get(i).copied().unwrap_or(3.0).max(1.0) as i32;
                    Circle::new((x, y), size, color.filled())
                }))
                .context("Failed to draw point series")?;
        }
        _ => {
            // Line and area both preview as lines
            let points = drawable_points(trace, xs);
            chart
                .draw_series(LineSeries::new(points, color.stroke_width(2)))
                .context("Failed to draw line series")?;
        }
    }
    Ok(())
}

fn drawable_points(trace: &PreparedSeries, xs: &[f64]) -> Vec<(f64, f64)> {
    xs.iter()
        .enumerate()
        .filter_map(|(i, &x)| {
            let y = trace.y.get(i).copied().flatten()?;
            let base = trace.y_base.get(i).copied().unwrap_or(0.0);
            Some((x, base + y))
        })
        .collect()
}

/// Continuous positions for every trace's x values. When any value has no
/// continuous position, all traces fall back to a shared category scale.
fn resolve_x_positions(traces: &[&PreparedSeries]) -> (Vec<Vec<f64>>, Option<Vec<String>>) {
    let all_continuous = traces
        .iter()
        .flat_map(|t| t.x.iter())
        .all(|v| v.axis_position().is_some());

    if all_continuous {
        let positions = traces
            .iter()
            .map(|t| {
                t.x.iter()
                    .map(|v| v.axis_position().unwrap_or(0.0))
                    .collect()
            })
            .collect();
        return (positions, None);
    }

    // Category order: first seen across traces
    let mut categories: Vec<String> = Vec::new();
    for trace in traces {
        for value in &trace.x {
            let label = value.to_string();
            if !categories.iter().any(|c| c == &label) {
                categories.push(label);
            }
        }
    }

    let positions = traces
        .iter()
        .map(|t| {
            t.x.iter()
                .map(|v| {
                    let label = v.to_string();
                    categories.iter().position(|c| c == &label).unwrap_or(0) as f64
                })
                .collect()
        })
        .collect();

    (positions, Some(categories))
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if min == max {
        (min - 1.0, max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding, max + padding)
    }
}

fn trace_color(trace: &PreparedSeries, index: usize) -> RGBColor {
    if let Some(hex) = trace.color.as_deref() {
        if let Some(color) = parse_hex_color(hex) {
            return color;
        }
    }
    PALETTE[index % PALETTE.len()]
}

fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

/// Backend that renders every applied figure to an in-memory PNG.
#[derive(Debug)]
pub struct PreviewBackend {
    pub width: u32,
    pub height: u32,
    pub last_png: Option<Vec<u8>>,
}

impl PreviewBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            last_png: None,
        }
    }
}

impl Backend for PreviewBackend {
    fn react(
        &mut self,
        element: &mut PlotElement,
        figure: &Figure,
        _config: &PlotConfig,
    ) -> Result<()> {
        element.figure = figure.clone();
        self.last_png = Some(render_png(figure, self.width, self.height)?);
        Ok(())
    }
}
