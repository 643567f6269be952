use crate::core::axis::{Axis, ScaleKind};
use crate::core::units::Unit;
use crate::error::{PlotError, PlotResult};

/// One-dimensional rebinning descriptor: maps values in axis units onto
/// device-pixel bin indices covering the axis's visible extent.
///
/// Built once per render pass so the per-sample hot loop is a couple of
/// multiplies instead of a full transform call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebinDescriptor {
    t_min: f64,
    t_max: f64,
    bins: usize,
    log: bool,
    flipped: bool,
    unit: Unit,
}

impl RebinDescriptor {
    pub fn for_axis(axis: &Axis) -> PlotResult<Self> {
        let range = axis.range();
        let (t_min, t_max) = match axis.scale() {
            ScaleKind::Linear => (range.min().value(), range.max().value()),
            ScaleKind::Log => (range.min().value().log10(), range.max().value().log10()),
        };
        let bins = axis.device_span() as usize;
        if bins == 0 || t_max <= t_min {
            return Err(PlotError::DegenerateRange {
                min: range.min().value(),
                max: range.max().value(),
            });
        }
        Ok(Self {
            t_min,
            t_max,
            bins,
            log: axis.scale() == ScaleKind::Log,
            flipped: axis.is_flipped(),
            unit: range.unit(),
        })
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Bin index for a value already expressed in axis units, or `None` when
    /// the value falls outside the visible extent (or is non-positive on a
    /// log axis).
    #[must_use]
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let transformed = if self.log {
            if value <= 0.0 {
                return None;
            }
            value.log10()
        } else {
            value
        };
        let ratio = (transformed - self.t_min) / (self.t_max - self.t_min);
        if !(0.0..=1.0).contains(&ratio) {
            return None;
        }
        // The max endpoint belongs to the last bin.
        let index = ((ratio * self.bins as f64) as usize).min(self.bins - 1);
        Some(if self.flipped {
            self.bins - 1 - index
        } else {
            index
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::datum_range::DatumRange;

    fn descriptor(scale: ScaleKind, min: f64, max: f64, px: i32) -> RebinDescriptor {
        let axis = Axis::new(DatumRange::scalar(min, max).expect("range"), scale, 0, px)
            .expect("axis");
        RebinDescriptor::for_axis(&axis).expect("descriptor")
    }

    #[test]
    fn linear_bins_cover_extent() {
        let rebin = descriptor(ScaleKind::Linear, 0.0, 10.0, 100);
        assert_eq!(rebin.bin_of(0.0), Some(0));
        assert_eq!(rebin.bin_of(10.0), Some(99));
        assert_eq!(rebin.bin_of(5.0), Some(50));
        assert_eq!(rebin.bin_of(10.1), None);
        assert_eq!(rebin.bin_of(-0.1), None);
    }

    #[test]
    fn log_bins_space_decades_evenly() {
        let rebin = descriptor(ScaleKind::Log, 1.0, 100.0, 200);
        assert_eq!(rebin.bin_of(1.0), Some(0));
        assert_eq!(rebin.bin_of(10.0), Some(100));
        assert_eq!(rebin.bin_of(0.0), None);
        assert_eq!(rebin.bin_of(-3.0), None);
    }

    #[test]
    fn flipped_axis_reverses_bins() {
        let mut axis = Axis::new(
            DatumRange::scalar(0.0, 10.0).expect("range"),
            ScaleKind::Linear,
            0,
            100,
        )
        .expect("axis");
        axis.flip();
        let rebin = RebinDescriptor::for_axis(&axis).expect("descriptor");
        assert_eq!(rebin.bin_of(0.0), Some(99));
        assert_eq!(rebin.bin_of(10.0), Some(0));
    }
}
