use crate::core::axis::{Axis, ScaleKind};
use crate::core::datum::Datum;
use crate::core::units::Unit;
use crate::error::{PlotError, PlotResult};

/// Device-coordinate safety bound. Transform outputs are clamped into
/// `[-DEVICE_LIMIT_PX, DEVICE_LIMIT_PX]` so downstream drawing primitives
/// never see coordinates that overflow their integer rasterization paths.
pub const DEVICE_LIMIT_PX: f64 = 10_000.0;

impl Axis {
    /// Value in axis units after the scale pre-transform (log10 for log
    /// axes). Non-positive values on a log axis have no finite transform and
    /// return `None`.
    fn pre_transform(&self, value: f64) -> Option<f64> {
        match self.scale() {
            ScaleKind::Linear => Some(value),
            ScaleKind::Log => (value > 0.0).then(|| value.log10()),
        }
    }

    fn transformed_bounds(&self) -> (f64, f64) {
        let range = self.range();
        match self.scale() {
            ScaleKind::Linear => (range.min().value(), range.max().value()),
            // Log axes guarantee min > 0 by construction.
            ScaleKind::Log => (range.min().value().log10(), range.max().value().log10()),
        }
    }

    /// Maps a datum to a device pixel coordinate.
    ///
    /// The value is converted into the axis unit first; incompatible units
    /// propagate [`PlotError::IncompatibleUnits`] to the caller.
    pub fn transform_datum(&self, datum: Datum) -> PlotResult<f64> {
        self.transform(datum.value(), datum.unit())
    }

    /// Maps a raw value tagged with `unit` to a device pixel coordinate.
    ///
    /// On a log axis a non-positive value maps to the clamped far-negative
    /// sentinel pixel rather than failing: such points are simply off-scale.
    pub fn transform(&self, value: f64, unit: Unit) -> PlotResult<f64> {
        let value = Datum::new(value, unit).value_in(self.range().unit())?;
        if !value.is_finite() {
            return Err(PlotError::InvalidData(
                "transform input must be finite".to_owned(),
            ));
        }

        let Some(transformed) = self.pre_transform(value) else {
            return Ok(-DEVICE_LIMIT_PX);
        };

        let (t_min, t_max) = self.transformed_bounds();
        let ratio = (transformed - t_min) / (t_max - t_min);
        let offset = ratio * self.device_span();
        let pixel = if self.is_flipped() {
            f64::from(self.device_max()) - offset
        } else {
            f64::from(self.device_min()) + offset
        };
        Ok(pixel.clamp(-DEVICE_LIMIT_PX, DEVICE_LIMIT_PX))
    }

    /// Maps a device pixel coordinate back to a datum in axis units.
    pub fn inv_transform(&self, pixel: f64) -> PlotResult<Datum> {
        if !pixel.is_finite() {
            return Err(PlotError::InvalidData(
                "inverse transform input must be finite".to_owned(),
            ));
        }

        let offset = if self.is_flipped() {
            f64::from(self.device_max()) - pixel
        } else {
            pixel - f64::from(self.device_min())
        };
        let ratio = offset / self.device_span();
        let (t_min, t_max) = self.transformed_bounds();
        let transformed = t_min + ratio * (t_max - t_min);
        let value = match self.scale() {
            ScaleKind::Linear => transformed,
            ScaleKind::Log => 10f64.powf(transformed),
        };
        Ok(Datum::new(value, self.range().unit()))
    }

    /// Data width of one pixel at `pixel`, as a datum in axis units.
    ///
    /// Constant along a linear axis, position-dependent on a log axis. This
    /// is the resolution bound for inverse transforms and the tolerance used
    /// by tooltip / nearest-tick consumers.
    pub fn pixel_resolution(&self, pixel: f64) -> PlotResult<Datum> {
        let lo = self.inv_transform(pixel - 0.5)?;
        let hi = self.inv_transform(pixel + 0.5)?;
        Ok(Datum::new(
            (hi.value() - lo.value()).abs(),
            self.range().unit(),
        ))
    }
}
