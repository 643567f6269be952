use tracing::trace;

use crate::core::axis::Axis;
use crate::core::datum::Datum;
use crate::error::PlotResult;
use crate::ticks::formatter::TickFormatter;
use crate::ticks::measure::{LabelExtent, LabelMeasurer};
use crate::ticks::spacing::{collect_multiples, minor_subdivisions, nice_step, step_parts};
use crate::ticks::tick_set::TickSet;
use crate::ticks::{TickTuning, collapse_boundary_duplicates, ensure_selectable};

/// How many ticks fit on `span_px` at one label per `label_px`.
pub(crate) fn tick_budget(span_px: f64, label_px: f64) -> usize {
    if !span_px.is_finite() || span_px <= 0.0 || !label_px.is_finite() || label_px <= 0.0 {
        return 2;
    }
    (((span_px / label_px).floor() as usize) + 1).clamp(2, 100)
}

/// Two-pass linear tick selection.
///
/// Pass one estimates the tick budget from a coarse label-width guess and
/// picks a `{1, 2, 5} x 10^n` step. Pass two formats those candidates with
/// the real formatter, measures them, and coarsens the budget when the
/// widest rendered label needs more room than the guess allowed. The
/// measurement never densifies: the coarse guess is the floor on spacing.
pub fn select_linear_ticks(
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
    let span_px = axis.device_span();

    let coarse_budget = tick_budget(span_px, tuning.coarse_label_width_px);
    let coarse_step = nice_step(width, coarse_budget);
    let coarse_formatter = TickFormatter::for_step(coarse_step);
    let candidates = collect_multiples(min, max, coarse_step);

    let mut widest_px = 0f64;
    for value in &candidates {
        let label = coarse_formatter.format(Datum::new(*value, unit))?;
        let extent: LabelExtent = measurer.measure(&label);
        widest_px = widest_px.max(extent.along(tuning.orientation));
    }
    if widest_px == 0.0 {
        widest_px = tuning.coarse_label_width_px;
    }

    let measured_budget =
        tick_budget(span_px, widest_px + tuning.label_padding_px).min(coarse_budget);
    let step = nice_step(width, measured_budget);
    let formatter = TickFormatter::for_step(step);
    trace!(
        coarse_budget,
        measured_budget,
        step,
        "linear tick selection refined budget"
    );

    let major_values = collect_multiples(min, max, step);
    let major = collapse_boundary_duplicates(
        axis,
        major_values
            .iter()
            .map(|value| Datum::new(*value, unit))
            .collect(),
    )?;

    let (significand, _) = step_parts(step);
    let sub_step = step / minor_subdivisions(significand) as f64;
    let minor = collect_multiples(min, max, sub_step)
        .into_iter()
        .filter(|value| {
            let ratio = value / step;
            (ratio - ratio.round()).abs() > 1e-6
        })
        .map(|value| Datum::new(value, unit))
        .collect();

    Ok(TickSet::new(major, minor, formatter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::ScaleKind;
    use crate::core::datum_range::DatumRange;
    use crate::ticks::measure::CharCellMeasurer;

    #[test]
    fn unit_range_400px_gives_fifths() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 1.0).expect("range"),
            ScaleKind::Linear,
            0,
            400,
        )
        .expect("axis");
        let ticks = select_linear_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");

        let values: Vec<f64> = ticks.major().iter().map(|tick| tick.value()).collect();
        assert_eq!(values.len(), 6);
        for (index, value) in values.iter().enumerate() {
            assert!((value - index as f64 * 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn majors_are_strictly_increasing() {
        let axis = Axis::new(
            DatumRange::scalar(-3.7, 12.9).expect("range"),
            ScaleKind::Linear,
            0,
            640,
        )
        .expect("axis");
        let ticks = select_linear_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        assert!(ticks.major().len() >= 2);
        for pair in ticks.major().windows(2) {
            assert!(pair[0].value() < pair[1].value());
        }
    }

    #[test]
    fn minors_subdivide_without_touching_majors() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 10.0).expect("range"),
            ScaleKind::Linear,
            0,
            500,
        )
        .expect("axis");
        let ticks = select_linear_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        for minor in ticks.minor() {
            for major in ticks.major() {
                assert!((minor.value() - major.value()).abs() > 1e-9);
            }
        }
    }
}
