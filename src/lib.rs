//! plotcore-rs: scientific plotting core.
//!
//! This crate provides the pure computational heart of a plotting widget
//! toolkit: unit-aware data values and ranges, axis coordinate transforms,
//! adaptive tick selection (linear, logarithmic, and calendar time), and a
//! histogram-based density rasterizer for very large point sets.
//!
//! There is no GUI toolkit dependency. A host rendering surface consumes the
//! outputs (RGBA rasters and pixel-space primitive lists) and supplies label
//! measurement through the [`ticks::LabelMeasurer`] trait.

pub mod core;
pub mod data;
pub mod error;
pub mod plot;
pub mod raster;
pub mod telemetry;
pub mod ticks;

pub use core::{Axis, AxisMemento, Datum, DatumRange, ScaleKind, SharedRange, Unit, UnitFamily};
pub use error::{PlotError, PlotResult};
