use ordered_float::OrderedFloat;

use crate::core::datum::Datum;
use crate::ticks::formatter::TickFormatter;
use crate::error::PlotResult;

/// The output of one tick-selection pass: labeled majors, unlabeled minors,
/// and the label function both were chosen against.
///
/// A tick set is derived state, always subordinate to one axis snapshot; it
/// is recomputed whenever the axis range, scale, or device length changes.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSet {
    major: Vec<Datum>,
    minor: Vec<Datum>,
    formatter: TickFormatter,
}

impl TickSet {
    #[must_use]
    pub fn new(major: Vec<Datum>, minor: Vec<Datum>, formatter: TickFormatter) -> Self {
        Self {
            major,
            minor,
            formatter,
        }
    }

    #[must_use]
    pub fn major(&self) -> &[Datum] {
        &self.major
    }

    #[must_use]
    pub fn minor(&self) -> &[Datum] {
        &self.minor
    }

    #[must_use]
    pub fn formatter(&self) -> &TickFormatter {
        &self.formatter
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty()
    }

    /// Major tick labels in axis order.
    pub fn labels(&self) -> PlotResult<Vec<String>> {
        self.major
            .iter()
            .map(|tick| self.formatter.format(*tick))
            .collect()
    }

    /// Major tick closest to `target`, for tooltip snapping.
    pub fn nearest_major(&self, target: Datum) -> PlotResult<Option<Datum>> {
        let mut best: Option<(OrderedFloat<f64>, Datum)> = None;
        for tick in &self.major {
            let distance = OrderedFloat(tick.sub(target)?.value().abs());
            if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                best = Some((distance, *tick));
            }
        }
        Ok(best.map(|(_, tick)| tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::Unit;

    #[test]
    fn nearest_major_converts_units() {
        let ticks = TickSet::new(
            vec![
                Datum::new(0.0, Unit::Seconds),
                Datum::new(1.0, Unit::Seconds),
                Datum::new(2.0, Unit::Seconds),
            ],
            Vec::new(),
            TickFormatter::Decimal { decimals: 0 },
        );
        let nearest = ticks
            .nearest_major(Datum::new(1400.0, Unit::Milliseconds))
            .expect("compatible units")
            .expect("non-empty");
        assert_eq!(nearest.value(), 1.0);
    }
}
