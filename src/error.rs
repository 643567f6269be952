use thiserror::Error;

use crate::core::Unit;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("incompatible units: cannot convert `{from}` to `{to}`")]
    IncompatibleUnits { from: Unit, to: Unit },

    #[error("degenerate range: min={min}, max={max} (strictly min < max required)")]
    DegenerateRange { min: f64, max: f64 },

    #[error("invalid device interval: min={min}, max={max}")]
    InvalidDeviceInterval { min: i32, max: i32 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl PlotError {
    /// True when the error reports a unit-family mismatch.
    ///
    /// Renderer layers downgrade this class to an advisory plot message
    /// instead of failing the whole paint pass.
    #[must_use]
    pub fn is_unit_mismatch(&self) -> bool {
        matches!(self, Self::IncompatibleUnits { .. })
    }
}
