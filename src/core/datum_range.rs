use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::datum::Datum;
use crate::core::units::Unit;
use crate::error::{PlotError, PlotResult};

/// An ordered pair of datums in the same unit family, `min < max` strictly.
///
/// Immutable value semantics: range changes are always replacement by a new
/// instance, never in-place mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatumRange {
    min: Datum,
    max: Datum,
}

impl DatumRange {
    /// Builds a range, converting `max` into `min`'s unit.
    ///
    /// Zero-width and reversed ranges are rejected with
    /// [`PlotError::DegenerateRange`]; non-finite endpoints are invalid data.
    pub fn new(min: Datum, max: Datum) -> PlotResult<Self> {
        let max = max.convert_to(min.unit())?;
        if !min.value().is_finite() || !max.value().is_finite() {
            return Err(PlotError::InvalidData(
                "range endpoints must be finite".to_owned(),
            ));
        }
        if min.value() >= max.value() {
            return Err(PlotError::DegenerateRange {
                min: min.value(),
                max: max.value(),
            });
        }
        Ok(Self { min, max })
    }

    /// Dimensionless shorthand used heavily in tests.
    pub fn scalar(min: f64, max: f64) -> PlotResult<Self> {
        Self::new(Datum::scalar(min), Datum::scalar(max))
    }

    #[must_use]
    pub fn min(self) -> Datum {
        self.min
    }

    #[must_use]
    pub fn max(self) -> Datum {
        self.max
    }

    #[must_use]
    pub fn unit(self) -> Unit {
        self.min.unit()
    }

    #[must_use]
    pub fn width(self) -> Datum {
        Datum::new(self.max.value() - self.min.value(), self.unit())
    }

    pub fn convert_to(self, target: Unit) -> PlotResult<Self> {
        Self::new(self.min.convert_to(target)?, self.max.convert_to(target)?)
    }

    pub fn contains(self, datum: Datum) -> PlotResult<bool> {
        let value = datum.value_in(self.unit())?;
        Ok(value >= self.min.value() && value <= self.max.value())
    }

    pub fn intersects(self, other: DatumRange) -> PlotResult<bool> {
        let other = other.convert_to(self.unit())?;
        Ok(self.min.value() < other.max.value() && other.min.value() < self.max.value())
    }

    pub fn union(self, other: DatumRange) -> PlotResult<Self> {
        let other = other.convert_to(self.unit())?;
        Self::new(
            Datum::new(self.min.value().min(other.min.value()), self.unit()),
            Datum::new(self.max.value().max(other.max.value()), self.unit()),
        )
    }

    /// Linear interpolation helper: maps normalized positions onto this range.
    ///
    /// `rescale(0.0, 1.0)` is the identity; `rescale(-0.5, 0.5)` shifts left
    /// by half a width. Pan and zoom are expressed through this.
    pub fn rescale(self, min_t: f64, max_t: f64) -> PlotResult<Self> {
        let width = self.width().value();
        Self::new(
            Datum::new(self.min.value() + min_t * width, self.unit()),
            Datum::new(self.min.value() + max_t * width, self.unit()),
        )
    }
}

impl fmt::Display for DatumRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_range_is_degenerate() {
        let result = DatumRange::scalar(2.0, 2.0);
        assert!(matches!(result, Err(PlotError::DegenerateRange { .. })));
    }

    #[test]
    fn reversed_range_is_degenerate() {
        let result = DatumRange::scalar(3.0, 1.0);
        assert!(matches!(result, Err(PlotError::DegenerateRange { .. })));
    }

    #[test]
    fn max_is_converted_into_min_unit() {
        let range = DatumRange::new(
            Datum::new(100.0, Unit::Milliseconds),
            Datum::new(1.0, Unit::Seconds),
        )
        .expect("mixed duration range");
        assert_eq!(range.unit(), Unit::Milliseconds);
        assert_eq!(range.max().value(), 1000.0);
    }

    #[test]
    fn rescale_shifts_and_scales() {
        let range = DatumRange::scalar(10.0, 20.0).expect("range");
        let panned = range.rescale(0.5, 1.5).expect("pan");
        assert_eq!(panned.min().value(), 15.0);
        assert_eq!(panned.max().value(), 25.0);
    }
}
