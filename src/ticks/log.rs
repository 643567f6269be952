use tracing::trace;

use crate::core::axis::Axis;
use crate::core::datum::Datum;
use crate::error::PlotResult;
use crate::ticks::formatter::TickFormatter;
use crate::ticks::linear::select_linear_ticks;
use crate::ticks::measure::{LabelMeasurer, any_adjacent_collision};
use crate::ticks::tick_set::TickSet;
use crate::ticks::{TickTuning, ensure_selectable, label_boxes_for};

#[derive(Debug, Clone, Copy, PartialEq)]
enum LogLevel {
    /// All significands 1..=9 per decade, labeled.
    Fine,
    /// Significands {1, 2, 5} per decade, labeled.
    Nice,
    /// Every decade.
    Decade,
    /// Every `stride`-th decade.
    Stride(i32),
}

/// Log-axis tick selection: decade majors with `2..=9 x 10^k` subdivisions.
///
/// Candidate densities run from significand subdivisions (offered only when
/// few enough decades are visible that their labels can matter) down to
/// multi-decade strides; the finest density whose measured labels stay
/// disjoint wins. Ranges narrower than one decade fall back to linear
/// selection over the raw values.
pub fn select_log_ticks(
    axis: &Axis,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<TickSet> {
    let tuning = tuning.validate()?;
    ensure_selectable(axis)?;

    let range = axis.range();
    let unit = range.unit();
    let (min, max) = (range.min().value(), range.max().value());
    let decades = max.log10() - min.log10();
    if decades < 1.0 {
        return select_linear_ticks(axis, measurer, &tuning);
    }

    let mut levels: Vec<LogLevel> = Vec::new();
    if decades <= tuning.log_promote_decades {
        levels.push(LogLevel::Fine);
        levels.push(LogLevel::Nice);
    }
    levels.push(LogLevel::Decade);
    let mut stride = 2;
    while decade_values(min, max, stride).len() >= 2 {
        levels.push(LogLevel::Stride(stride));
        stride = match stride {
            2 => 5,
            other => other * 2,
        };
        if stride > 1_000_000 {
            break;
        }
    }

    let mut chosen: Option<(LogLevel, Vec<f64>)> = None;
    for level in &levels {
        let values = level_values(min, max, *level);
        if values.len() < 2 {
            continue;
        }
        let formatter = formatter_for(&values);
        let ticks: Vec<Datum> = values.iter().map(|value| Datum::new(*value, unit)).collect();
        let boxes = label_boxes_for(axis, &ticks, &formatter, measurer, &tuning)?;
        if !any_adjacent_collision(&boxes) {
            chosen = Some((*level, values));
            break;
        }
        // Remember the coarsest viable level in case every level collides.
        chosen = Some((*level, values));
    }

    let (level, major_values) = match chosen {
        Some(chosen) => chosen,
        // Degenerate device spans: fall back to the bare decade list.
        None => (LogLevel::Decade, decade_values(min, max, 1)),
    };
    trace!(?level, majors = major_values.len(), "log tick level chosen");

    let formatter = formatter_for(&major_values);
    let major: Vec<Datum> = major_values
        .iter()
        .map(|value| Datum::new(*value, unit))
        .collect();

    let minor_values: Vec<f64> = match level {
        LogLevel::Fine => Vec::new(),
        LogLevel::Nice => subdivided_values(min, max, &[3.0, 4.0, 6.0, 7.0, 8.0, 9.0]),
        LogLevel::Decade => {
            subdivided_values(min, max, &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0])
        }
        LogLevel::Stride(_) => decade_values(min, max, 1)
            .into_iter()
            .filter(|value| !major_values.iter().any(|major| major == value))
            .collect(),
    };
    let minor = minor_values
        .into_iter()
        .map(|value| Datum::new(value, unit))
        .collect();

    Ok(TickSet::new(major, minor, formatter))
}

fn level_values(min: f64, max: f64, level: LogLevel) -> Vec<f64> {
    match level {
        LogLevel::Fine => subdivided_values(
            min,
            max,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        ),
        LogLevel::Nice => subdivided_values(min, max, &[1.0, 2.0, 5.0]),
        LogLevel::Decade => decade_values(min, max, 1),
        LogLevel::Stride(stride) => decade_values(min, max, stride),
    }
}

/// `j x 10^k` values inside `[min, max]` for the given significands.
fn subdivided_values(min: f64, max: f64, significands: &[f64]) -> Vec<f64> {
    let k_low = min.log10().floor() as i32 - 1;
    let k_high = max.log10().ceil() as i32;
    let mut values = Vec::new();
    for k in k_low..=k_high {
        let base = 10f64.powi(k);
        for significand in significands {
            let value = significand * base;
            if value >= min * (1.0 - 1e-12) && value <= max * (1.0 + 1e-12) {
                values.push(value);
            }
        }
    }
    values.sort_by(f64::total_cmp);
    values
}

/// Powers of ten inside `[min, max]` on exponents aligned to `stride`.
fn decade_values(min: f64, max: f64, stride: i32) -> Vec<f64> {
    let k_first = min.log10().ceil() as i32;
    let k_last = max.log10().floor() as i32;
    let mut values = Vec::new();
    let mut k = k_first.div_euclid(stride) * stride;
    if k < k_first {
        k += stride;
    }
    while k <= k_last {
        values.push(10f64.powi(k));
        k += stride;
    }
    values
}

/// Formatter precision follows the smallest gap between adjacent majors.
fn formatter_for(values: &[f64]) -> TickFormatter {
    let min_gap = values
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(f64::INFINITY, f64::min);
    if min_gap.is_finite() {
        TickFormatter::for_step(min_gap)
    } else {
        TickFormatter::Scientific { significant: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::ScaleKind;
    use crate::core::datum_range::DatumRange;
    use crate::ticks::measure::CharCellMeasurer;

    fn log_axis(min: f64, max: f64, span_px: i32) -> Axis {
        Axis::new(
            DatumRange::scalar(min, max).expect("range"),
            ScaleKind::Log,
            0,
            span_px,
        )
        .expect("axis")
    }

    #[test]
    fn wide_range_uses_decades() {
        let axis = log_axis(1.0, 1e6, 600);
        let ticks = select_log_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        let values: Vec<f64> = ticks.major().iter().map(|tick| tick.value()).collect();
        assert_eq!(values, vec![1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0]);
        assert!(!ticks.minor().is_empty());
    }

    #[test]
    fn close_zoom_promotes_subdivisions() {
        let axis = log_axis(1.0, 100.0, 800);
        let ticks = select_log_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        // Two decades on a wide axis: more than just the decade labels fit.
        assert!(ticks.major().len() > 3);
    }

    #[test]
    fn narrow_device_span_falls_back_to_strides() {
        let axis = log_axis(1.0, 1e9, 90);
        let ticks = select_log_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        assert!(ticks.major().len() < 10);
        assert!(ticks.major().len() >= 2);
    }

    #[test]
    fn sub_decade_range_uses_linear_selection() {
        let axis = log_axis(2.0, 8.0, 400);
        let ticks = select_log_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        assert!(ticks.major().len() >= 2);
        for pair in ticks.major().windows(2) {
            let gap = pair[1].value() - pair[0].value();
            assert!(gap > 0.0);
        }
    }
}
