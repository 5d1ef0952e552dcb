use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use plotprep::data::QueryResult;
use plotprep::options::{ChartType, VisualizationOptions};
use plotprep::{render, transform};
use std::io::{self, Read, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum InputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "plotprep")]
#[command(about = "Prepare chart data/layout from tabular rows and a visualization options JSON", long_about = None)]
struct Args {
    /// Visualization options as a JSON string
    #[arg(long)]
    options: String,

    /// Format of the rows read from stdin
    #[arg(long, value_enum, default_value = "csv")]
    input_format: InputFormat,

    /// Render a PNG preview to this path instead of printing figure JSON
    #[arg(long)]
    png: Option<std::path::PathBuf>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let options: VisualizationOptions = serde_json::from_str(&args.options)
        .context("Failed to parse visualization options JSON")?;

    let result = match args.input_format {
        InputFormat::Csv => QueryResult::from_csv_reader(io::stdin().lock())
            .context("Failed to read CSV from stdin")?,
        InputFormat::Json => {
            let mut text = String::new();
            io::stdin()
                .lock()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            let value: serde_json::Value =
                serde_json::from_str(&text).context("Failed to parse JSON rows")?;
            QueryResult::from_json(&value).context("Failed to read rows")?
        }
    };

    // The custom type has no prepared figure; emit the script projections
    if options.global_series_type == ChartType::Custom {
        let series = plotprep::series::build(
            &result,
            &options.column_mapping,
            options.global_series_type,
        );
        let (x, ys) = transform::flatten_for_script(&series);
        let output = serde_json::json!({ "x": x, "ys": ys });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let figure = plotprep::prepare_figure(&result, &options);

    match args.png {
        Some(path) => {
            let png_bytes = render::render_png(&figure, args.width, args.height)
                .context("Failed to render preview")?;
            std::fs::write(&path, png_bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &figure)
                .context("Failed to write figure JSON")?;
            writeln!(handle).context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
