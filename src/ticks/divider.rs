use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::axis::Axis;
use crate::core::datum::Datum;
use crate::error::PlotResult;
use crate::ticks::formatter::TickFormatter;
use crate::ticks::measure::{LabelMeasurer, any_adjacent_collision};
use crate::ticks::tick_set::TickSet;
use crate::ticks::{TickTuning, ensure_selectable, label_boxes_for};

/// A `{1, 2, 5} x 10^n` step on the coarseness ladder.
///
/// `finer` and `coarser` walk the ladder one rung at a time; boundaries are
/// the multiples of the step inside a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDivider {
    significand: u8,
    exponent: i32,
}

impl DomainDivider {
    #[must_use]
    pub fn new(significand: u8, exponent: i32) -> Option<Self> {
        matches!(significand, 1 | 2 | 5).then_some(Self {
            significand,
            exponent,
        })
    }

    /// Rung whose step is closest to dividing `width` into
    /// `target_boundaries` intervals.
    #[must_use]
    pub fn for_width(width: f64, target_boundaries: usize) -> Self {
        let intervals = target_boundaries.saturating_sub(1).max(1);
        let raw = (width / intervals as f64).abs().max(f64::MIN_POSITIVE);
        let exponent = raw.log10().floor() as i32;
        let significand_raw = raw / 10f64.powi(exponent);
        let significand = if significand_raw < 1.5 {
            1
        } else if significand_raw < 3.5 {
            2
        } else if significand_raw < 7.5 {
            5
        } else {
            return Self {
                significand: 1,
                exponent: exponent + 1,
            };
        };
        Self {
            significand,
            exponent,
        }
    }

    #[must_use]
    pub fn step(self) -> f64 {
        f64::from(self.significand) * 10f64.powi(self.exponent)
    }

    #[must_use]
    pub fn finer(self) -> Self {
        match self.significand {
            1 => Self {
                significand: 5,
                exponent: self.exponent - 1,
            },
            2 => Self {
                significand: 1,
                exponent: self.exponent,
            },
            _ => Self {
                significand: 2,
                exponent: self.exponent,
            },
        }
    }

    #[must_use]
    pub fn coarser(self) -> Self {
        match self.significand {
            1 => Self {
                significand: 2,
                exponent: self.exponent,
            },
            2 => Self {
                significand: 5,
                exponent: self.exponent,
            },
            _ => Self {
                significand: 1,
                exponent: self.exponent + 1,
            },
        }
    }

    #[must_use]
    pub fn boundary_count(self, min: f64, max: f64) -> usize {
        self.boundaries(min, max).len()
    }

    #[must_use]
    pub fn boundaries(self, min: f64, max: f64) -> Vec<f64> {
        crate::ticks::spacing::collect_multiples(min, max, self.step())
    }
}

/// True when `run` or more consecutive ticks sit within `limit_px` of their
/// neighbors. Positions must be sorted along the axis.
#[must_use]
pub fn has_close_run(positions_px: &[f64], run: usize, limit_px: f64) -> bool {
    if run < 2 {
        return !positions_px.is_empty();
    }
    let mut consecutive = 1usize;
    for pair in positions_px.windows(2) {
        if (pair[1] - pair[0]).abs() <= limit_px {
            consecutive += 1;
            if consecutive >= run {
                return true;
            }
        } else {
            consecutive = 1;
        }
    }
    false
}

const MAX_WALK: usize = 60;

/// Adaptive divider-walk tick selection.
///
/// Starts from a coarseness appropriate to the range, walks finer while
/// adjacent rendered labels stay disjoint, walks coarser while they
/// intersect, and never drops below two boundaries. Minor dividers refine
/// until the next rung would put `minor_close_run` consecutive minors within
/// `minor_close_px` of each other; that rung is rejected and the previous
/// density kept.
pub fn select_divider_ticks(
    axis: &Axis,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<TickSet> {
    let tuning = tuning.validate()?;
    ensure_selectable(axis)?;

    let range = axis.range();
    let unit = range.unit();
    let (min, max) = (range.min().value(), range.max().value());
    let width = range.width().value();

    let mut divider = DomainDivider::for_width(width, 3);

    // Walk finer while the finer rung's labels still stay disjoint.
    for _ in 0..MAX_WALK {
        let finer = divider.finer();
        if divider_collides(axis, finer, min, max, measurer, &tuning)? {
            break;
        }
        divider = finer;
    }
    // Walk coarser while this rung's labels intersect, keeping two boundaries.
    for _ in 0..MAX_WALK {
        if !divider_collides(axis, divider, min, max, measurer, &tuning)? {
            break;
        }
        let coarser = divider.coarser();
        if coarser.boundary_count(min, max) < 2 {
            break;
        }
        divider = coarser;
    }
    // At least two boundaries must remain.
    for _ in 0..MAX_WALK {
        if divider.boundary_count(min, max) >= 2 {
            break;
        }
        divider = divider.finer();
    }
    trace!(step = divider.step(), "domain divider settled");

    let formatter = TickFormatter::for_step(divider.step());
    let major: Vec<Datum> = divider
        .boundaries(min, max)
        .into_iter()
        .map(|value| Datum::new(value, unit))
        .collect();

    // Minor refinement against the pixel-distance backoff condition.
    let mut minor_divider: Option<DomainDivider> = None;
    let mut candidate = divider.finer();
    for _ in 0..MAX_WALK {
        let positions = boundary_pixels(axis, candidate, min, max, unit)?;
        if has_close_run(&positions, tuning.minor_close_run, tuning.minor_close_px) {
            break;
        }
        minor_divider = Some(candidate);
        candidate = candidate.finer();
    }

    let minor = match minor_divider {
        Some(minor_divider) => {
            let major_step = divider.step();
            minor_divider
                .boundaries(min, max)
                .into_iter()
                .filter(|value| {
                    let ratio = value / major_step;
                    (ratio - ratio.round()).abs() > 1e-6
                })
                .map(|value| Datum::new(value, unit))
                .collect()
        }
        None => Vec::new(),
    };

    Ok(TickSet::new(major, minor, formatter))
}

fn divider_collides(
    axis: &Axis,
    divider: DomainDivider,
    min: f64,
    max: f64,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<bool> {
    let values = divider.boundaries(min, max);
    if values.len() < 2 {
        return Ok(false);
    }
    let formatter = TickFormatter::for_step(divider.step());
    let unit = axis.range().unit();
    let ticks: Vec<Datum> = values.into_iter().map(|value| Datum::new(value, unit)).collect();
    let boxes = label_boxes_for(axis, &ticks, &formatter, measurer, tuning)?;
    Ok(any_adjacent_collision(&boxes))
}

fn boundary_pixels(
    axis: &Axis,
    divider: DomainDivider,
    min: f64,
    max: f64,
    unit: crate::core::units::Unit,
) -> PlotResult<Vec<f64>> {
    let mut pixels = divider
        .boundaries(min, max)
        .into_iter()
        .map(|value| axis.transform(value, unit))
        .collect::<PlotResult<Vec<f64>>>()?;
    pixels.sort_by(f64::total_cmp);
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::ScaleKind;
    use crate::core::datum_range::DatumRange;
    use crate::ticks::measure::CharCellMeasurer;

    #[test]
    fn ladder_walks_are_inverses() {
        let divider = DomainDivider::new(2, 0).expect("divider");
        assert_eq!(divider.finer().coarser(), divider);
        assert_eq!(divider.coarser().finer(), divider);
        assert_eq!(DomainDivider::new(1, 0).expect("d").finer().step(), 0.5);
    }

    #[test]
    fn close_run_requires_consecutive_ticks() {
        // Seven gaps of 5 px: ticks 0..=7 within 6 px of each other.
        let tight: Vec<f64> = (0..8).map(|i| f64::from(i) * 5.0).collect();
        assert!(has_close_run(&tight, 8, 6.0));

        // A wide gap in the middle breaks the run.
        let mut broken = tight.clone();
        broken[4] += 100.0;
        let mut broken_sorted = broken;
        broken_sorted.sort_by(f64::total_cmp);
        assert!(!has_close_run(&broken_sorted, 8, 6.0));

        let sparse: Vec<f64> = (0..8).map(|i| f64::from(i) * 10.0).collect();
        assert!(!has_close_run(&sparse, 8, 6.0));
    }

    #[test]
    fn divider_selection_keeps_two_boundaries_minimum() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 1.0).expect("range"),
            ScaleKind::Linear,
            0,
            40,
        )
        .expect("axis");
        let ticks =
            select_divider_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
                .expect("ticks");
        assert!(ticks.major().len() >= 2);
    }

    #[test]
    fn minors_never_settle_on_backoff_condition() {
        let tuning = TickTuning::default();
        let axis = Axis::new(
            DatumRange::scalar(0.0, 100.0).expect("range"),
            ScaleKind::Linear,
            0,
            800,
        )
        .expect("axis");
        let ticks = select_divider_ticks(&axis, &CharCellMeasurer::default(), &tuning)
            .expect("ticks");

        let mut pixels: Vec<f64> = ticks
            .minor()
            .iter()
            .map(|tick| axis.transform_datum(*tick).expect("pixel"))
            .collect();
        pixels.sort_by(f64::total_cmp);
        assert!(!has_close_run(&pixels, tuning.minor_close_run, tuning.minor_close_px));
    }
}
