// Contract with the opaque rendering backend.
//
// The pipeline prepares a Figure; a Backend consumes it and reports
// user-driven restyle events back. Nothing here knows about options or
// query results.

use crate::figure::Figure;
use anyhow::Result;

/// Fixed base configuration handed to the backend with every render.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    /// Cloud-export action stays disabled.
    pub show_export_link: bool,
    pub display_logo: bool,
    pub responsive: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            show_export_link: false,
            display_logo: false,
            responsive: true,
        }
    }
}

/// The live plot element the backend draws into. Owned exclusively by the
/// render host; the custom-script bridge mutates its figure directly.
#[derive(Debug, Clone, Default)]
pub struct PlotElement {
    pub figure: Figure,
}

impl PlotElement {
    /// Reset to an empty plot.
    pub fn clear(&mut self) {
        self.figure = Figure::empty();
    }
}

/// A backend-originated notification that a visual property changed due to
/// user interaction, without new data being supplied.
#[derive(Debug, Clone, Default)]
pub struct RestyleEvent {
    /// Per-trace visibility toggles: (trace index, now visible).
    pub visibility: Vec<(usize, bool)>,
    /// Other restyled attributes. The pipeline ignores these.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl RestyleEvent {
    pub fn visibility(changes: Vec<(usize, bool)>) -> Self {
        Self {
            visibility: changes,
            attributes: serde_json::Map::new(),
        }
    }
}

/// The rendering backend. Implementations execute figures blindly and do
/// not interpret them.
pub trait Backend {
    /// Reset the element to an empty plot.
    fn new_plot(&mut self, element: &mut PlotElement) {
        element.clear();
    }

    /// Apply a figure to the element.
    fn react(&mut self, element: &mut PlotElement, figure: &Figure, config: &PlotConfig)
        -> Result<()>;
}

/// Backend that stores every applied figure. Useful for headless hosts
/// and for asserting on render output.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub reacts: Vec<Figure>,
    pub resets: usize,
}

impl Backend for RecordingBackend {
    fn new_plot(&mut self, element: &mut PlotElement) {
        element.clear();
        self.resets += 1;
    }

    fn react(
        &mut self,
        element: &mut PlotElement,
        figure: &Figure,
        _config: &PlotConfig,
    ) -> Result<()> {
        element.figure = figure.clone();
        self.reacts.push(figure.clone());
        Ok(())
    }
}
