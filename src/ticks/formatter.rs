use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::core::datum::Datum;
use crate::error::PlotResult;

/// Calendar granularity of a time axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeLabelFormat {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl TimeLabelFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::Milliseconds => "%H:%M:%S%.3f",
            Self::Seconds => "%H:%M:%S",
            Self::Minutes | Self::Hours => "%H:%M",
            Self::Days => "%Y-%m-%d",
            Self::Months => "%Y-%m",
            Self::Years => "%Y",
        }
    }
}

/// Value-to-label function attached to a tick set.
///
/// Decimal rounding goes through `rust_decimal` so label precision is the
/// step-derived number of places without binary float noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickFormatter {
    Decimal { decimals: u32 },
    Scientific { significant: u32 },
    Time { format: TimeLabelFormat },
}

impl TickFormatter {
    /// Chooses a formatter suited to a tick step: plain decimals in the
    /// human-readable magnitude band, scientific notation outside it.
    #[must_use]
    pub fn for_step(step: f64) -> Self {
        let magnitude = step.abs();
        if !(1e-4..1e7).contains(&magnitude) || !magnitude.is_finite() {
            return Self::Scientific { significant: 2 };
        }
        let exponent = magnitude.log10().floor() as i32;
        Self::Decimal {
            decimals: (-exponent).max(0) as u32,
        }
    }

    pub fn format(&self, datum: Datum) -> PlotResult<String> {
        let value = datum.value();
        Ok(match self {
            Self::Decimal { decimals } => format_decimal(value, *decimals),
            Self::Scientific { significant } => {
                format!("{value:.*e}", significant.saturating_sub(1) as usize)
            }
            Self::Time { format } => datum.to_datetime()?.format(format.pattern()).to_string(),
        })
    }
}

fn format_decimal(value: f64, decimals: u32) -> String {
    match Decimal::from_f64(value) {
        Some(decimal) => decimal.round_dp(decimals).normalize().to_string(),
        // Out of Decimal's 96-bit range; the float formatter is close enough.
        None => format!("{value:.*}", decimals as usize),
    }
}
