use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::units::Unit;
use crate::error::{PlotError, PlotResult};

/// A scalar value tagged with its unit of measure.
///
/// Arithmetic and comparison between two datums require convertible units;
/// conversion is explicit and exact within a unit family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    value: f64,
    unit: Unit,
}

impl Datum {
    #[must_use]
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Dimensionless scalar shorthand.
    #[must_use]
    pub fn scalar(value: f64) -> Self {
        Self::new(value, Unit::Dimensionless)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn unit(self) -> Unit {
        self.unit
    }

    pub fn convert_to(self, target: Unit) -> PlotResult<Datum> {
        let (scale, offset) =
            self.unit
                .conversion_to(target)
                .ok_or(PlotError::IncompatibleUnits {
                    from: self.unit,
                    to: target,
                })?;
        Ok(Datum::new(self.value * scale + offset, target))
    }

    /// Value expressed in `target` units without re-tagging.
    pub fn value_in(self, target: Unit) -> PlotResult<f64> {
        Ok(self.convert_to(target)?.value)
    }

    pub fn add(self, other: Datum) -> PlotResult<Datum> {
        let other = other.convert_to(self.unit)?;
        Ok(Datum::new(self.value + other.value, self.unit))
    }

    pub fn sub(self, other: Datum) -> PlotResult<Datum> {
        let other = other.convert_to(self.unit)?;
        Ok(Datum::new(self.value - other.value, self.unit))
    }

    /// Total-order comparison after unit conversion.
    pub fn compare(self, other: Datum) -> PlotResult<Ordering> {
        let other = other.convert_to(self.unit)?;
        Ok(OrderedFloat(self.value).cmp(&OrderedFloat(other.value)))
    }

    pub fn min(self, other: Datum) -> PlotResult<Datum> {
        Ok(if self.compare(other)? == Ordering::Greater {
            other.convert_to(self.unit)?
        } else {
            self
        })
    }

    pub fn max(self, other: Datum) -> PlotResult<Datum> {
        Ok(if self.compare(other)? == Ordering::Less {
            other.convert_to(self.unit)?
        } else {
            self
        })
    }

    /// Builds an epoch-seconds datum from a UTC timestamp.
    #[must_use]
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let seconds = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
        Self::new(seconds, Unit::TimeSeconds)
    }

    /// Interprets a time-location datum as a UTC timestamp.
    pub fn to_datetime(self) -> PlotResult<DateTime<Utc>> {
        let seconds = self.value_in(Unit::TimeSeconds)?;
        if !seconds.is_finite() {
            return Err(PlotError::InvalidData(
                "time value must be finite".to_owned(),
            ));
        }
        let whole = seconds.floor();
        let nanos = ((seconds - whole) * 1e9).round() as u32;
        Utc.timestamp_opt(whole as i64, nanos.min(999_999_999))
            .single()
            .ok_or_else(|| PlotError::InvalidData(format!("time value out of range: {seconds}")))
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.unit.label();
        if label.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {label}", self.value)
        }
    }
}
