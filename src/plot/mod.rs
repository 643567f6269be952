//! Plot composition: the layer stack, the cached compositor with its affine
//! preview path, grid and label scenes, and the user-facing message log.

pub mod compositor;
pub mod grid;
pub mod layer;
pub mod message;

pub use compositor::{
    CacheState, CompositorDiagnostics, CompositorOptions, PaintOutcome, PlotCompositor,
};
pub use grid::{AxisLabel, AxisLabelScene, GridLayer, TickMark, axis_label_scene};
pub use layer::{LayerContext, LegendEntry, PlotLayer, ScatterLayer};
pub use message::{MessageLog, PlotMessage, Severity};
