// Render host: owns the backend element, the derived figure state, and the
// monotonic revision counter; relays backend restyle events back into the
// transformer.

use crate::backend::{Backend, PlotConfig, PlotElement, RestyleEvent};
use crate::figure::{Figure, Layout, PreparedData};
use crate::layout::derive_layout;
use crate::options::{ChartType, VisualizationOptions};
use crate::script;
use crate::series::Series;
use crate::transform;
use crate::value::Value;
use anyhow::Result;
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub struct RenderHost<B: Backend> {
    backend: B,
    element: PlotElement,
    config: PlotConfig,
    data: PreparedData,
    layout: Layout,
    revision: u64,
    mounted: bool,
    element_exposed: bool,
    options: Option<VisualizationOptions>,
    // Script projections retained so restyle events can re-run the bridge
    script_x: Vec<Value>,
    script_ys: BTreeMap<String, Vec<Value>>,
}

impl<B: Backend> RenderHost<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            element: PlotElement::default(),
            config: PlotConfig::default(),
            data: Vec::new(),
            layout: Layout::default(),
            revision: 0,
            mounted: false,
            element_exposed: false,
            options: None,
            script_x: Vec::new(),
            script_ys: BTreeMap::new(),
        }
    }

    /// Process an inbound (series, options) change: recompute the figure
    /// and push it to the backend. Absent options render nothing.
    pub fn update(&mut self, series: &[Series], options: Option<&VisualizationOptions>) -> Result<()> {
        let Some(options) = options else {
            self.options = None;
            self.backend.new_plot(&mut self.element);
            return Ok(());
        };
        self.options = Some(options.clone());

        if options.global_series_type == ChartType::Custom {
            let (x, ys) = transform::flatten_for_script(series);
            self.script_x = x;
            self.script_ys = ys;
            self.revision += 1;
            self.run_script();
        } else {
            self.data = transform::prepare(series, options);
            self.layout = derive_layout(series, options, Some(&self.data));
            self.revision += 1;
            debug!(
                revision = self.revision,
                traces = self.data.len(),
                "derived figure"
            );
            let figure = self.figure();
            self.backend
                .react(&mut self.element, &figure, &self.config)?;
        }

        self.mounted = true;
        Ok(())
    }

    /// Handle a backend-originated restyle event. Visibility changes re-run
    /// the shaping pass (or the custom script); everything else is a no-op
    /// and leaves the revision untouched.
    pub fn on_restyle(&mut self, event: &RestyleEvent) -> Result<()> {
        let Some(options) = self.options.clone() else {
            return Ok(());
        };

        if options.global_series_type == ChartType::Custom {
            self.revision += 1;
            self.run_script();
            return Ok(());
        }

        match transform::restyle(&self.data, &options, event) {
            Some(next) => {
                self.data = next;
                self.layout = derive_layout(&[], &options, Some(&self.data));
                self.revision += 1;
                let figure = self.figure();
                self.backend
                    .react(&mut self.element, &figure, &self.config)?;
            }
            None => {
                debug!("restyle ignored: no visibility change");
            }
        }
        Ok(())
    }

    fn run_script(&mut self) {
        let Some(options) = self.options.as_ref() else {
            return;
        };
        let code = options.custom_code.clone().unwrap_or_default();
        let outcome = script::run(
            &code,
            &self.script_x,
            &self.script_ys,
            &mut self.element,
            &mut self.backend,
        );
        if let script::ScriptOutcome::Failed(err) = outcome {
            if options.enable_console_logs {
                warn!("error while executing custom graph: {}", err);
            }
        }
        self.element.figure.revision = self.revision;
    }

    /// The element reference for external collaborators (resize
    /// coordination). Yields a value exactly once, at first successful
    /// mount.
    pub fn container_ref(&mut self) -> Option<&PlotElement> {
        if self.mounted && !self.element_exposed {
            self.element_exposed = true;
            Some(&self.element)
        } else {
            None
        }
    }

    pub fn figure(&self) -> Figure {
        Figure {
            data: self.data.clone(),
            layout: self.layout.clone(),
            revision: self.revision,
        }
    }

    pub fn element(&self) -> &PlotElement {
        &self.element
    }

    pub fn data(&self) -> &PreparedData {
        &self.data
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
