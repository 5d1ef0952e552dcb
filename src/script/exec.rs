// Executes parsed script commands against the live plot element.

use super::ast::ScriptCommand;
use super::command::parse_script;
use crate::backend::{Backend, PlotElement};
use crate::figure::PreparedSeries;
use crate::options::ChartType;
use crate::value::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Captured failure of a user script. Reported to the diagnostic sink,
/// never propagated.
#[derive(Debug, Error, PartialEq)]
pub enum ScriptError {
    #[error("failed to parse custom script: {0}")]
    Parse(String),
    #[error("unknown series '{0}' in trace command")]
    UnknownSeries(String),
}

/// Result of one script run. A failure leaves whatever partial state the
/// executed prefix produced on the element.
#[derive(Debug, PartialEq)]
pub enum ScriptOutcome {
    Applied { commands: usize },
    Failed(ScriptError),
}

impl ScriptOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ScriptOutcome::Failed(_))
    }
}

/// Run a user script with its enumerated inputs: the shared x array, the
/// series-name -> y-array map, the live element, and the backend.
///
/// The element is reset to an empty plot first. Total: parse and execution
/// failures are captured in the outcome.
pub fn run<B: Backend>(
    code: &str,
    x: &[Value],
    ys: &BTreeMap<String, Vec<Value>>,
    element: &mut PlotElement,
    backend: &mut B,
) -> ScriptOutcome {
    backend.new_plot(element);

    let commands = match parse_script(code) {
        Ok((_, commands)) => commands,
        Err(err) => return ScriptOutcome::Failed(ScriptError::Parse(err.to_string())),
    };

    let mut applied = 0;
    for command in commands {
        match exec_command(command, x, ys, element) {
            Ok(()) => applied += 1,
            Err(err) => return ScriptOutcome::Failed(err),
        }
    }

    ScriptOutcome::Applied { commands: applied }
}

fn exec_command(
    command: ScriptCommand,
    x: &[Value],
    ys: &BTreeMap<String, Vec<Value>>,
    element: &mut PlotElement,
) -> Result<(), ScriptError> {
    match command {
        ScriptCommand::Trace {
            source,
            kind,
            name,
            color,
        } => {
            let y_values = ys
                .get(&source)
                .ok_or_else(|| ScriptError::UnknownSeries(source.clone()))?;

            let kind = kind
                .as_deref()
                .map(ChartType::from_tag)
                .unwrap_or(ChartType::Line);
            let mut series = PreparedSeries::new(name.unwrap_or(source), kind);
            series.color = color;
            series.x = x.iter().take(y_values.len()).cloned().collect();
            series.y = y_values.iter().map(Value::as_f64).collect();
            series.y_raw = series.y.clone();

            element.figure.data.push(series);
            Ok(())
        }
        ScriptCommand::Layout {
            title,
            x_title,
            y_title,
        } => {
            let layout = &mut element.figure.layout;
            if title.is_some() {
                layout.title = title;
            }
            if x_title.is_some() {
                layout.x_axis.title = x_title;
            }
            if let Some(y_title) = y_title {
                if layout.y_axes.is_empty() {
                    layout.y_axes.push(Default::default());
                }
                layout.y_axes[0].title = Some(y_title);
            }
            Ok(())
        }
        ScriptCommand::Clear => {
            element.clear();
            Ok(())
        }
    }
}
