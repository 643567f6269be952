use crate::core::units::Unit;
use crate::error::{PlotError, PlotResult};

/// A flat (x, y) sample set with per-axis units and validity metadata.
///
/// Monotonicity of the x sequence is probed once at construction; the
/// rasterizer uses it for binary-search index pruning and for envelope
/// tracing.
#[derive(Debug, Clone)]
pub struct PointSet {
    xs: Vec<f64>,
    ys: Vec<f64>,
    x_unit: Unit,
    y_unit: Unit,
    fill: Option<f64>,
    valid_min: Option<f64>,
    valid_max: Option<f64>,
    x_monotonic: bool,
}

impl PointSet {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, x_unit: Unit, y_unit: Unit) -> PlotResult<Self> {
        if xs.len() != ys.len() {
            return Err(PlotError::InvalidData(format!(
                "point set length mismatch: {} x values, {} y values",
                xs.len(),
                ys.len()
            )));
        }
        let x_monotonic = xs.windows(2).all(|pair| pair[0] <= pair[1]);
        Ok(Self {
            xs,
            ys,
            x_unit,
            y_unit,
            fill: None,
            valid_min: None,
            valid_max: None,
            x_monotonic,
        })
    }

    /// Marks a sentinel y value as "no data here".
    #[must_use]
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Restricts y validity to `[valid_min, valid_max]`.
    pub fn with_valid_range(mut self, valid_min: f64, valid_max: f64) -> PlotResult<Self> {
        if !valid_min.is_finite() || !valid_max.is_finite() || valid_min >= valid_max {
            return Err(PlotError::InvalidData(
                "valid range must be finite with min < max".to_owned(),
            ));
        }
        self.valid_min = Some(valid_min);
        self.valid_max = Some(valid_max);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    #[must_use]
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    #[must_use]
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    #[must_use]
    pub fn x_unit(&self) -> Unit {
        self.x_unit
    }

    #[must_use]
    pub fn y_unit(&self) -> Unit {
        self.y_unit
    }

    #[must_use]
    pub fn x_is_monotonic(&self) -> bool {
        self.x_monotonic
    }

    /// True when the sample participates in binning: finite, not the fill
    /// sentinel, inside the valid range.
    #[must_use]
    pub fn is_valid_sample(&self, y: f64) -> bool {
        if !y.is_finite() {
            return false;
        }
        if self.fill.is_some_and(|fill| y == fill) {
            return false;
        }
        if self.valid_min.is_some_and(|min| y < min) {
            return false;
        }
        if self.valid_max.is_some_and(|max| y > max) {
            return false;
        }
        true
    }

    /// Index range of samples with `x_lo <= x <= x_hi`.
    ///
    /// Binary search over the sorted x sequence when monotonic, otherwise
    /// the full index range (callers must still test each x).
    #[must_use]
    pub fn visible_indices(&self, x_lo: f64, x_hi: f64) -> std::ops::Range<usize> {
        if !self.x_monotonic {
            return 0..self.xs.len();
        }
        let start = self.xs.partition_point(|&x| x < x_lo);
        let end = self.xs.partition_point(|&x| x <= x_hi);
        start..end.max(start)
    }

    /// Median positive x step, the nominal sampling cadence.
    ///
    /// `None` for unsorted data or fewer than two samples.
    #[must_use]
    pub fn cadence(&self) -> Option<f64> {
        if !self.x_monotonic || self.xs.len() < 2 {
            return None;
        }
        let mut steps: Vec<f64> = self
            .xs
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|step| step.is_finite() && *step > 0.0)
            .collect();
        if steps.is_empty() {
            return None;
        }
        steps.sort_by(f64::total_cmp);
        Some(steps[steps.len() / 2])
    }
}
