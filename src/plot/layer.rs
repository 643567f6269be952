use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::axis::Axis;
use crate::data::waveform::ScatterData;
use crate::error::PlotResult;
use crate::plot::message::{MessageLog, Severity};
use crate::raster::scatter::ScatterRasterizer;
use crate::raster::surface::{RgbaRaster, argb};

/// One legend line contributed by a layer during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub color_argb: u32,
}

/// Drawing context handed to each layer during a compositor rebuild.
///
/// The raster's origin is the axes' `(device_min, device_min)` corner; the
/// axes already include any overscan extension.
pub struct LayerContext<'a> {
    pub raster: &'a mut RgbaRaster,
    pub x_axis: &'a Axis,
    pub y_axis: &'a Axis,
    pub messages: &'a mut MessageLog,
    pub legend: &'a mut Vec<LegendEntry>,
}

/// A renderer participating in a plot's layer stack. Layers draw in stack
/// order, index 0 first (bottom-most).
pub trait PlotLayer {
    fn name(&self) -> &str;

    fn draw(&self, context: &mut LayerContext<'_>) -> PlotResult<()>;
}

/// The huge-scatter renderer as a plot layer.
///
/// Downgrades the failure classes the rasterizer reports: missing data posts
/// an informational message, unit mismatches post an advisory, both without
/// failing the paint pass. Anything else propagates for the compositor's
/// per-layer isolation to handle.
pub struct ScatterLayer {
    name: String,
    data: ScatterData,
    rasterizer: ScatterRasterizer,
}

impl ScatterLayer {
    #[must_use]
    pub fn new(name: impl Into<String>, data: ScatterData, rasterizer: ScatterRasterizer) -> Self {
        Self {
            name: name.into(),
            data,
            rasterizer,
        }
    }

    pub fn set_data(&mut self, data: ScatterData) {
        self.data = data;
    }
}

impl PlotLayer for ScatterLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn draw(&self, context: &mut LayerContext<'_>) -> PlotResult<()> {
        if self.data.is_empty() {
            context
                .messages
                .post(Severity::Info, format!("{}: no data in interval", self.name));
            return Ok(());
        }

        match self
            .rasterizer
            .rasterize(&self.data, context.x_axis, context.y_axis)
        {
            Ok(raster) => {
                context.raster.blit(&raster, 0, 0);
                context.legend.push(LegendEntry {
                    label: self.name.clone(),
                    color_argb: argb(255, self.rasterizer.options().base_color_rgb),
                });
                Ok(())
            }
            Err(err) if err.is_unit_mismatch() => {
                warn!(layer = %self.name, error = %err, "scatter layer unit mismatch");
                context
                    .messages
                    .post(Severity::Warning, format!("{}: {err}", self.name));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
