use std::fmt;

use serde::{Deserialize, Serialize};

/// Dimension family a unit belongs to.
///
/// Conversion is only defined between units of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    /// Dimensionless scalar values.
    Scalar,
    /// Elapsed-time quantities.
    Duration,
    /// Cycle-rate quantities.
    Frequency,
    /// Thermodynamic temperature (affine conversions).
    Temperature,
    /// Absolute time locations on the Unix epoch timeline.
    TimeLocation,
}

/// Concrete unit of measure carried by a [`crate::core::Datum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    #[default]
    Dimensionless,
    Microseconds,
    Milliseconds,
    Seconds,
    Hertz,
    Kilohertz,
    Megahertz,
    Kelvin,
    Celsius,
    /// Seconds since the Unix epoch.
    TimeSeconds,
    /// Milliseconds since the Unix epoch.
    TimeMilliseconds,
}

impl Unit {
    #[must_use]
    pub fn family(self) -> UnitFamily {
        match self {
            Self::Dimensionless => UnitFamily::Scalar,
            Self::Microseconds | Self::Milliseconds | Self::Seconds => UnitFamily::Duration,
            Self::Hertz | Self::Kilohertz | Self::Megahertz => UnitFamily::Frequency,
            Self::Kelvin | Self::Celsius => UnitFamily::Temperature,
            Self::TimeSeconds | Self::TimeMilliseconds => UnitFamily::TimeLocation,
        }
    }

    /// Scale factor and offset to the family's base unit.
    ///
    /// `base = value * scale + offset`. Base units are: dimensionless,
    /// seconds, hertz, kelvin, and epoch seconds.
    fn to_base(self) -> (f64, f64) {
        match self {
            Self::Dimensionless | Self::Seconds | Self::Hertz | Self::Kelvin | Self::TimeSeconds => {
                (1.0, 0.0)
            }
            Self::Microseconds => (1e-6, 0.0),
            Self::Milliseconds | Self::TimeMilliseconds => (1e-3, 0.0),
            Self::Kilohertz => (1e3, 0.0),
            Self::Megahertz => (1e6, 0.0),
            Self::Celsius => (1.0, 273.15),
        }
    }

    /// Affine conversion `(scale, offset)` such that
    /// `target_value = value * scale + offset`.
    ///
    /// Returns `None` when the units belong to different families.
    /// Within a family the conversion is exact and lossless.
    #[must_use]
    pub fn conversion_to(self, target: Unit) -> Option<(f64, f64)> {
        if self.family() != target.family() {
            return None;
        }
        if self == target {
            return Some((1.0, 0.0));
        }

        let (scale_a, offset_a) = self.to_base();
        let (scale_b, offset_b) = target.to_base();
        // value_base = v * scale_a + offset_a; target = (value_base - offset_b) / scale_b
        Some((scale_a / scale_b, (offset_a - offset_b) / scale_b))
    }

    #[must_use]
    pub fn is_convertible_to(self, target: Unit) -> bool {
        self.family() == target.family()
    }

    /// Scale factor for interpreting a delta in `self` units as a delta in
    /// `target` units. Deltas ignore affine offsets; duration deltas may be
    /// applied to time-location coordinates.
    #[must_use]
    pub fn delta_scale_to(self, target: Unit) -> Option<f64> {
        let compatible = self.family() == target.family()
            || (self.family() == UnitFamily::Duration
                && target.family() == UnitFamily::TimeLocation);
        if !compatible {
            return None;
        }
        let (scale_a, _) = self.to_base();
        let (scale_b, _) = target.to_base();
        Some(scale_a / scale_b)
    }

    /// Short axis-label suffix for the unit, empty for dimensionless values.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dimensionless => "",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Hertz => "Hz",
            Self::Kilohertz => "kHz",
            Self::Megahertz => "MHz",
            Self::Kelvin => "K",
            Self::Celsius => "degC",
            Self::TimeSeconds => "UTC",
            Self::TimeMilliseconds => "UTC(ms)",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dimensionless => "dimensionless",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Hertz => "hertz",
            Self::Kilohertz => "kilohertz",
            Self::Megahertz => "megahertz",
            Self::Kelvin => "kelvin",
            Self::Celsius => "celsius",
            Self::TimeSeconds => "epoch-seconds",
            Self::TimeMilliseconds => "epoch-milliseconds",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_family_conversion_is_exact_affine() {
        let (scale, offset) = Unit::Milliseconds
            .conversion_to(Unit::Seconds)
            .expect("duration conversion");
        assert_eq!(scale, 1e-3);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn celsius_to_kelvin_applies_offset() {
        let (scale, offset) = Unit::Celsius
            .conversion_to(Unit::Kelvin)
            .expect("temperature conversion");
        assert_eq!(scale, 1.0);
        assert_eq!(offset, 273.15);
        assert_eq!(0.0 * scale + offset, 273.15);
    }

    #[test]
    fn cross_family_conversion_is_rejected() {
        assert!(Unit::Seconds.conversion_to(Unit::Hertz).is_none());
        assert!(Unit::Dimensionless.conversion_to(Unit::Kelvin).is_none());
    }
}
