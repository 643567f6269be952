use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::axis::{Axis, AxisMemento};
use crate::core::shared_range::SharedRange;
use crate::error::{PlotError, PlotResult};
use crate::plot::layer::{LayerContext, LegendEntry, PlotLayer};
use crate::plot::message::{MessageLog, Severity};
use crate::raster::surface::{AffineMap, RgbaRaster};

/// Reusability of the cached plot image against the current axis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheState {
    /// Mementos match: the cache can be blitted directly.
    Valid,
    /// Mementos differ by a composable affine transform: the stale cache can
    /// be rescaled for an interactive preview while a rebuild is pending.
    StalePreviewable,
    /// No cache, or the axis change is not affine-expressible.
    Invalid,
}

/// What one paint call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaintOutcome {
    /// Cache blitted as-is.
    FromCache,
    /// Stale cache drawn through an affine preview; an authoritative
    /// rebuild is still required.
    AffinePreview,
    /// Full recompute through every layer.
    Rebuilt,
}

/// Tuning controls for plot compositing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositorOptions {
    /// Extra pixels rendered on each side of the offscreen buffer so small
    /// pans can reuse already-rendered margin.
    pub overscan_px: i32,
    pub background_argb: u32,
    /// Tint blended over affine previews to mark them as stale.
    pub stale_tint_argb: u32,
}

impl Default for CompositorOptions {
    fn default() -> Self {
        Self {
            overscan_px: 0,
            background_argb: 0xFF_FFFFFF,
            stale_tint_argb: 0x30_B0B0B0,
        }
    }
}

impl CompositorOptions {
    fn validate(self) -> PlotResult<Self> {
        if self.overscan_px < 0 {
            return Err(PlotError::InvalidData(
                "overscan must be >= 0 pixels".to_owned(),
            ));
        }
        Ok(self)
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| {
            PlotError::InvalidData(format!("compositor options serialization: {err}"))
        })
    }

    pub fn from_json_str(json: &str) -> PlotResult<Self> {
        let options: Self = serde_json::from_str(json).map_err(|err| {
            PlotError::InvalidData(format!("compositor options deserialization: {err}"))
        })?;
        options.validate()
    }
}

/// A committed plot image plus the axis snapshots it was computed against.
struct CacheImage {
    raster: RgbaRaster,
    memento_x: AxisMemento,
    memento_y: AxisMemento,
    extended_x: AxisMemento,
    extended_y: AxisMemento,
    overscan_px: i32,
}

/// Serializable snapshot of compositor state for debugging hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositorDiagnostics {
    pub cache_state: CacheState,
    pub layer_count: usize,
    pub message_count: usize,
    pub last_outcome: Option<PaintOutcome>,
}

impl CompositorDiagnostics {
    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PlotError::InvalidData(format!("diagnostics serialization: {err}")))
    }
}

/// Orchestrates per-layer draws into a cached raster and decides, per paint
/// request, between a direct blit, an affine preview of stale content, and
/// a full recompute.
///
/// A failing layer is converted into a plot message; the remaining layers
/// still execute, so one bad renderer never blanks the whole plot.
pub struct PlotCompositor {
    options: CompositorOptions,
    layers: Vec<Box<dyn PlotLayer>>,
    bottom_decorator: Option<Box<dyn PlotLayer>>,
    top_decorator: Option<Box<dyn PlotLayer>>,
    cache: Option<CacheImage>,
    messages: MessageLog,
    legend: Vec<LegendEntry>,
    last_outcome: Option<PaintOutcome>,
}

impl PlotCompositor {
    pub fn new(options: CompositorOptions) -> PlotResult<Self> {
        Ok(Self {
            options: options.validate()?,
            layers: Vec::new(),
            bottom_decorator: None,
            top_decorator: None,
            cache: None,
            messages: MessageLog::new(),
            legend: Vec::new(),
            last_outcome: None,
        })
    }

    /// Appends a layer at the top of the stack.
    pub fn push_layer(&mut self, layer: Box<dyn PlotLayer>) {
        self.layers.push(layer);
        self.invalidate();
    }

    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.invalidate();
    }

    pub fn set_bottom_decorator(&mut self, decorator: Option<Box<dyn PlotLayer>>) {
        self.bottom_decorator = decorator;
        self.invalidate();
    }

    pub fn set_top_decorator(&mut self, decorator: Option<Box<dyn PlotLayer>>) {
        self.top_decorator = decorator;
        self.invalidate();
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    #[must_use]
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Drops the cache so the next paint is a full rebuild.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    #[must_use]
    pub fn cache_state(&self, memento_x: &AxisMemento, memento_y: &AxisMemento) -> CacheState {
        match &self.cache {
            None => CacheState::Invalid,
            Some(cache) if cache.memento_x == *memento_x && cache.memento_y == *memento_y => {
                CacheState::Valid
            }
            Some(cache)
                if cache.memento_x.affine_composable_with(memento_x)
                    && cache.memento_y.affine_composable_with(memento_y) =>
            {
                CacheState::StalePreviewable
            }
            Some(_) => CacheState::Invalid,
        }
    }

    #[must_use]
    pub fn diagnostics(&self, x_axis: &Axis, y_axis: &Axis) -> CompositorDiagnostics {
        CompositorDiagnostics {
            cache_state: self.cache_state(&x_axis.memento(), &y_axis.memento()),
            layer_count: self.layers.len(),
            message_count: self.messages.len(),
            last_outcome: self.last_outcome,
        }
    }

    /// Paints the plot into `target`, which must be sized to the axes'
    /// device spans with origin at `(device_min, device_min)`.
    ///
    /// Printing mode never reads or writes the cache: printed output is
    /// always an authoritative recompute.
    pub fn paint(
        &mut self,
        x_axis: &Axis,
        y_axis: &Axis,
        target: &mut RgbaRaster,
        printing: bool,
    ) -> PlotResult<PaintOutcome> {
        let memento_x = x_axis.memento();
        let memento_y = y_axis.memento();

        if !printing {
            match self.cache_state(&memento_x, &memento_y) {
                CacheState::Valid => {
                    let cache = self.cache.as_ref().expect("valid state implies cache");
                    target.fill(self.options.background_argb);
                    target.blit(&cache.raster, -cache.overscan_px, -cache.overscan_px);
                    self.last_outcome = Some(PaintOutcome::FromCache);
                    return Ok(PaintOutcome::FromCache);
                }
                CacheState::StalePreviewable => {
                    let cache = self.cache.as_ref().expect("previewable state implies cache");
                    let x_map = affine_between(&cache.extended_x, x_axis)?;
                    let y_map = affine_between(&cache.extended_y, y_axis)?;
                    let preview = cache.raster.affine_resample(
                        x_map,
                        y_map,
                        target.width(),
                        target.height(),
                    )?;
                    debug!(?x_map, ?y_map, "drawing stale cache through affine preview");
                    target.fill(self.options.background_argb);
                    target.blit(&preview, 0, 0);
                    target.tint(self.options.stale_tint_argb);
                    self.last_outcome = Some(PaintOutcome::AffinePreview);
                    return Ok(PaintOutcome::AffinePreview);
                }
                CacheState::Invalid => {}
            }
        }

        // Full recompute.
        self.messages.clear();
        self.legend.clear();
        let extended_x = x_axis.with_device_extension(self.options.overscan_px)?;
        let extended_y = y_axis.with_device_extension(self.options.overscan_px)?;
        let mut buffer = RgbaRaster::new(
            extended_x.device_span() as u32,
            extended_y.device_span() as u32,
        )?;
        buffer.fill(self.options.background_argb);

        if let Some(decorator) = &self.bottom_decorator {
            draw_layer(
                decorator.as_ref(),
                &mut buffer,
                &extended_x,
                &extended_y,
                &mut self.messages,
                &mut self.legend,
            );
        }
        for layer in &self.layers {
            draw_layer(
                layer.as_ref(),
                &mut buffer,
                &extended_x,
                &extended_y,
                &mut self.messages,
                &mut self.legend,
            );
        }
        if let Some(decorator) = &self.top_decorator {
            draw_layer(
                decorator.as_ref(),
                &mut buffer,
                &extended_x,
                &extended_y,
                &mut self.messages,
                &mut self.legend,
            );
        }

        target.fill(self.options.background_argb);
        target.blit(&buffer, -self.options.overscan_px, -self.options.overscan_px);

        if !printing {
            self.cache = Some(CacheImage {
                raster: buffer,
                memento_x,
                memento_y,
                extended_x: extended_x.memento(),
                extended_y: extended_y.memento(),
                overscan_px: self.options.overscan_px,
            });
        }
        self.last_outcome = Some(PaintOutcome::Rebuilt);
        Ok(PaintOutcome::Rebuilt)
    }
}

fn draw_layer(
    layer: &dyn PlotLayer,
    buffer: &mut RgbaRaster,
    x_axis: &Axis,
    y_axis: &Axis,
    messages: &mut MessageLog,
    legend: &mut Vec<LegendEntry>,
) {
    let mut context = LayerContext {
        raster: buffer,
        x_axis,
        y_axis,
        messages,
        legend,
    };
    if let Err(err) = layer.draw(&mut context) {
        let severity = match &err {
            PlotError::IncompatibleUnits { .. } => Severity::Warning,
            PlotError::InvalidData(_) => Severity::Info,
            _ => Severity::Severe,
        };
        warn!(layer = %layer.name(), error = %err, "layer draw failed; continuing paint pass");
        messages.post(severity, format!("{}: {err}", layer.name()));
    }
}

/// Pixel map from a cached raster's coordinates to the current target's:
/// invert two cache pixels through the cache-time axis, forward them through
/// the current axis, and fit the line.
fn affine_between(cached: &AxisMemento, current: &Axis) -> PlotResult<AffineMap> {
    let cache_axis = axis_from_memento(cached)?;
    let span = cache_axis.device_span();

    let origin = f64::from(cache_axis.device_min());
    let target_origin = f64::from(current.device_min());
    let at_zero =
        current.transform_datum(cache_axis.inv_transform(origin)?)? - target_origin;
    let at_span =
        current.transform_datum(cache_axis.inv_transform(origin + span)?)? - target_origin;

    let scale = (at_span - at_zero) / span;
    if !scale.is_finite() || scale == 0.0 {
        return Err(PlotError::InvalidData(
            "affine preview transform is degenerate".to_owned(),
        ));
    }
    Ok(AffineMap {
        scale,
        offset: at_zero,
    })
}

fn axis_from_memento(memento: &AxisMemento) -> PlotResult<Axis> {
    let mut axis = Axis::with_shared_range(
        SharedRange::new(memento.range),
        memento.scale,
        memento.device_min,
        memento.device_max,
    )?;
    axis.set_flipped(memento.flipped);
    Ok(axis)
}
