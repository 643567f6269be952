use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::datum_range::DatumRange;
use crate::core::shared_range::{RangeId, SharedRange};
use crate::error::{PlotError, PlotResult};

/// Mapping mode between data values and device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScaleKind {
    /// Uniform spacing in raw data units.
    #[default]
    Linear,
    /// Uniform spacing in log10 data units (range min must be > 0).
    Log,
}

/// One axis of a plot: a displayed range plus a device-pixel interval.
///
/// The range lives in a [`SharedRange`] cell so several axes can display the
/// same interval; `attach_to` aliases another axis's cell, `detach_range`
/// deep-copies into a private one. All range operations go through explicit
/// replacement; the only silent correction is the documented log fallback in
/// [`Axis::set_scale`].
#[derive(Debug, Clone)]
pub struct Axis {
    range: SharedRange,
    scale: ScaleKind,
    device_min: i32,
    device_max: i32,
    flipped: bool,
}

/// Immutable snapshot of an axis used to detect staleness of cached renders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisMemento {
    pub range: DatumRange,
    pub range_id: RangeId,
    pub generation: u64,
    pub scale: ScaleKind,
    pub device_min: i32,
    pub device_max: i32,
    pub flipped: bool,
}

impl AxisMemento {
    /// True when a cache built against `self` can still be shown through an
    /// affine rescale of the old pixels: same scale kind, same orientation,
    /// convertible units.
    #[must_use]
    pub fn affine_composable_with(&self, current: &AxisMemento) -> bool {
        self.scale == current.scale
            && self.flipped == current.flipped
            && self.range.unit().is_convertible_to(current.range.unit())
    }
}

impl Axis {
    /// Creates an axis owning a fresh range cell.
    pub fn new(
        range: DatumRange,
        scale: ScaleKind,
        device_min: i32,
        device_max: i32,
    ) -> PlotResult<Self> {
        Self::with_shared_range(SharedRange::new(range), scale, device_min, device_max)
    }

    /// Creates an axis over an existing shared range cell.
    pub fn with_shared_range(
        range: SharedRange,
        scale: ScaleKind,
        device_min: i32,
        device_max: i32,
    ) -> PlotResult<Self> {
        if device_max <= device_min {
            return Err(PlotError::InvalidDeviceInterval {
                min: device_min,
                max: device_max,
            });
        }
        validate_range_for_scale(range.get(), scale)?;
        Ok(Self {
            range,
            scale,
            device_min,
            device_max,
            flipped: false,
        })
    }

    #[must_use]
    pub fn range(&self) -> DatumRange {
        self.range.get()
    }

    #[must_use]
    pub fn shared_range(&self) -> &SharedRange {
        &self.range
    }

    #[must_use]
    pub fn scale(&self) -> ScaleKind {
        self.scale
    }

    #[must_use]
    pub fn device_min(&self) -> i32 {
        self.device_min
    }

    #[must_use]
    pub fn device_max(&self) -> i32 {
        self.device_max
    }

    #[must_use]
    pub fn device_span(&self) -> f64 {
        f64::from(self.device_max - self.device_min)
    }

    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        self.flipped = flipped;
    }

    /// Replaces the displayed range. Log axes reject ranges with min <= 0;
    /// nothing is ever substituted silently here.
    pub fn set_range(&self, range: DatumRange) -> PlotResult<()> {
        validate_range_for_scale(range, self.scale)?;
        self.range.set(range)
    }

    /// Aliases this axis onto `other`'s range cell so both display (and
    /// mutate) the same interval.
    pub fn attach_to(&mut self, other: &Axis) -> PlotResult<()> {
        validate_range_for_scale(other.range.get(), self.scale)?;
        self.range = other.range.attach();
        Ok(())
    }

    /// Replaces the shared cell with a private copy of the current range.
    pub fn detach_range(&mut self) {
        self.range = self.range.detach();
    }

    /// Shifts the range by `fraction` of its width (log axes shift in decade
    /// space). Positive fractions move toward larger values.
    pub fn pan(&self, fraction: f64) -> PlotResult<()> {
        if !fraction.is_finite() {
            return Err(PlotError::InvalidData(
                "pan fraction must be finite".to_owned(),
            ));
        }
        let range = self.range.get();
        let next = match self.scale {
            ScaleKind::Linear => range.rescale(fraction, 1.0 + fraction)?,
            ScaleKind::Log => rescale_log(range, fraction, 1.0 + fraction)?,
        };
        self.range.set(next)
    }

    /// Scales the range width by `factor` about `anchor` (0 = min end,
    /// 1 = max end, 0.5 = center), in decade space for log axes.
    /// Factors below 1 zoom in.
    pub fn zoom(&self, factor: f64, anchor: f64) -> PlotResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PlotError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor.is_finite() {
            return Err(PlotError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }
        let min_t = anchor - anchor * factor;
        let max_t = anchor + (1.0 - anchor) * factor;
        let range = self.range.get();
        let next = match self.scale {
            ScaleKind::Linear => range.rescale(min_t, max_t)?,
            ScaleKind::Log => rescale_log(range, min_t, max_t)?,
        };
        self.range.set(next)
    }

    /// Switches the mapping mode.
    ///
    /// Switching to log while the current range has min <= 0 forces a
    /// fallback range (three decades below the current max, or `[0.1, 100]`
    /// when the max is itself non-positive). The replaced range is returned
    /// so callers can surface the substitution; this is the one documented
    /// auto-correction on the axis.
    pub fn set_scale(&mut self, scale: ScaleKind) -> PlotResult<Option<DatumRange>> {
        let range = self.range.get();
        if scale == ScaleKind::Log && range.min().value() <= 0.0 {
            let fallback = log_fallback_range(range)?;
            warn!(
                old = %range,
                new = %fallback,
                "log scale requested with non-positive min; applying fallback range"
            );
            self.scale = scale;
            self.range.set(fallback)?;
            return Ok(Some(range));
        }
        self.scale = scale;
        Ok(None)
    }

    pub fn set_device_interval(&mut self, device_min: i32, device_max: i32) -> PlotResult<()> {
        if device_max <= device_min {
            return Err(PlotError::InvalidDeviceInterval {
                min: device_min,
                max: device_max,
            });
        }
        self.device_min = device_min;
        self.device_max = device_max;
        Ok(())
    }

    #[must_use]
    pub fn memento(&self) -> AxisMemento {
        AxisMemento {
            range: self.range.get(),
            range_id: self.range.id(),
            generation: self.range.generation(),
            scale: self.scale,
            device_min: self.device_min,
            device_max: self.device_max,
            flipped: self.flipped,
        }
    }

    /// Detached copy widened by `overscan_px` on each side, with the range
    /// grown proportionally (in decade space for log axes). Used to size
    /// offscreen buffers so small pans can reuse already-rendered margin.
    pub fn with_device_extension(&self, overscan_px: i32) -> PlotResult<Axis> {
        if overscan_px < 0 {
            return Err(PlotError::InvalidData(
                "overscan must be >= 0 pixels".to_owned(),
            ));
        }
        if overscan_px == 0 {
            let mut copy = self.clone();
            copy.detach_range();
            return Ok(copy);
        }

        let span = self.device_span();
        let fraction = f64::from(overscan_px) / span;
        let range = self.range.get();
        let extended = match self.scale {
            ScaleKind::Linear => range.rescale(-fraction, 1.0 + fraction)?,
            ScaleKind::Log => rescale_log(range, -fraction, 1.0 + fraction)?,
        };
        debug!(overscan_px, extended = %extended, "extended axis for offscreen buffer");

        let mut copy = self.clone();
        copy.range = SharedRange::new(extended);
        copy.device_min = self.device_min - overscan_px;
        copy.device_max = self.device_max + overscan_px;
        Ok(copy)
    }
}

fn validate_range_for_scale(range: DatumRange, scale: ScaleKind) -> PlotResult<()> {
    if scale == ScaleKind::Log && range.min().value() <= 0.0 {
        return Err(PlotError::DegenerateRange {
            min: range.min().value(),
            max: range.max().value(),
        });
    }
    Ok(())
}

/// `rescale` in log10 space: normalized positions interpolate decades.
fn rescale_log(range: DatumRange, min_t: f64, max_t: f64) -> PlotResult<DatumRange> {
    use crate::core::datum::Datum;

    let log_min = range.min().value().log10();
    let log_max = range.max().value().log10();
    let width = log_max - log_min;
    DatumRange::new(
        Datum::new(10f64.powf(log_min + min_t * width), range.unit()),
        Datum::new(10f64.powf(log_min + max_t * width), range.unit()),
    )
}

fn log_fallback_range(range: DatumRange) -> PlotResult<DatumRange> {
    use crate::core::datum::Datum;

    let max = range.max().value();
    if max > 0.0 {
        DatumRange::new(
            Datum::new(max * 1e-3, range.unit()),
            Datum::new(max, range.unit()),
        )
    } else {
        DatumRange::new(Datum::new(0.1, range.unit()), Datum::new(100.0, range.unit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_axis_rejects_non_positive_range() {
        let range = DatumRange::scalar(-1.0, 10.0).expect("range");
        let result = Axis::new(range, ScaleKind::Log, 0, 100);
        assert!(matches!(result, Err(PlotError::DegenerateRange { .. })));
    }

    #[test]
    fn set_scale_to_log_applies_fallback_and_reports_it() {
        let range = DatumRange::scalar(-5.0, 1000.0).expect("range");
        let mut axis = Axis::new(range, ScaleKind::Linear, 0, 100).expect("axis");

        let replaced = axis.set_scale(ScaleKind::Log).expect("switch to log");
        assert_eq!(replaced, Some(range));
        assert_eq!(axis.range().min().value(), 1.0);
        assert_eq!(axis.range().max().value(), 1000.0);
    }

    #[test]
    fn pan_moves_linear_range_by_fraction() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 10.0).expect("range"),
            ScaleKind::Linear,
            0,
            100,
        )
        .expect("axis");
        axis.pan(0.5).expect("pan");
        assert_eq!(axis.range().min().value(), 5.0);
        assert_eq!(axis.range().max().value(), 15.0);
    }

    #[test]
    fn zoom_about_center_keeps_center() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 10.0).expect("range"),
            ScaleKind::Linear,
            0,
            100,
        )
        .expect("axis");
        axis.zoom(0.5, 0.5).expect("zoom");
        assert_eq!(axis.range().min().value(), 2.5);
        assert_eq!(axis.range().max().value(), 7.5);
    }

    #[test]
    fn log_pan_moves_in_decades() {
        let axis = Axis::new(
            DatumRange::scalar(1.0, 100.0).expect("range"),
            ScaleKind::Log,
            0,
            100,
        )
        .expect("axis");
        axis.pan(0.5).expect("pan");
        let range = axis.range();
        assert!((range.min().value() - 10.0).abs() < 1e-9);
        assert!((range.max().value() - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn device_extension_widens_interval_and_range() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 10.0).expect("range"),
            ScaleKind::Linear,
            0,
            100,
        )
        .expect("axis");
        let extended = axis.with_device_extension(10).expect("extend");
        assert_eq!(extended.device_min(), -10);
        assert_eq!(extended.device_max(), 110);
        assert_eq!(extended.range().min().value(), -1.0);
        assert_eq!(extended.range().max().value(), 11.0);
        // The extension is detached: panning it must not move the original.
        extended.pan(1.0).expect("pan");
        assert_eq!(axis.range().min().value(), 0.0);
    }
}
