// Visualization-type registry: tag -> display name + editor capability.
//
// External collaborators use this to populate the type picker and choose
// which option controls to render. The pipeline itself dispatches on
// ChartType directly.

use crate::options::ChartType;

/// Which set of option controls a type's editor renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCapability {
    /// Axis/series/stacking controls.
    Cartesian,
    /// Label/value color controls.
    Pie,
    /// z-value controls.
    Heatmap,
    /// Distribution controls (no y mapping required).
    Distribution,
    /// Custom-code text entry.
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub tag: ChartType,
    pub name: &'static str,
    pub editor: EditorCapability,
}

const REGISTRY: &[TypeDescriptor] = &[
    TypeDescriptor {
        tag: ChartType::Line,
        name: "Line",
        editor: EditorCapability::Cartesian,
    },
    TypeDescriptor {
        tag: ChartType::Area,
        name: "Area",
        editor: EditorCapability::Cartesian,
    },
    TypeDescriptor {
        tag: ChartType::Column,
        name: "Bar",
        editor: EditorCapability::Cartesian,
    },
    TypeDescriptor {
        tag: ChartType::Scatter,
        name: "Scatter",
        editor: EditorCapability::Cartesian,
    },
    TypeDescriptor {
        tag: ChartType::Bubble,
        name: "Bubble",
        editor: EditorCapability::Cartesian,
    },
    TypeDescriptor {
        tag: ChartType::Pie,
        name: "Pie",
        editor: EditorCapability::Pie,
    },
    TypeDescriptor {
        tag: ChartType::Histogram,
        name: "Histogram",
        editor: EditorCapability::Distribution,
    },
    TypeDescriptor {
        tag: ChartType::Box,
        name: "Box",
        editor: EditorCapability::Distribution,
    },
    TypeDescriptor {
        tag: ChartType::Heatmap,
        name: "Heatmap",
        editor: EditorCapability::Heatmap,
    },
    TypeDescriptor {
        tag: ChartType::Custom,
        name: "Custom",
        editor: EditorCapability::Script,
    },
];

/// All registered visualization types, in picker order.
pub fn registry() -> &'static [TypeDescriptor] {
    REGISTRY
}

/// Descriptor for one type tag.
pub fn descriptor(tag: ChartType) -> &'static TypeDescriptor {
    REGISTRY
        .iter()
        .find(|d| d.tag == tag)
        .unwrap_or(&REGISTRY[0])
}
