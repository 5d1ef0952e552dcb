// Commands of the custom-script language

/// One executable command from a user script.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Add a trace built from one of the projected series.
    /// Format: trace("series name", kind: "line", name: "Display", color: "#f00")
    Trace {
        source: String,
        kind: Option<String>,
        name: Option<String>,
        color: Option<String>,
    },
    /// Adjust layout text.
    /// Format: layout(title: "...", x_title: "...", y_title: "...")
    Layout {
        title: Option<String>,
        x_title: Option<String>,
        y_title: Option<String>,
    },
    /// Reset the element to an empty plot.
    /// Format: clear()
    Clear,
}
