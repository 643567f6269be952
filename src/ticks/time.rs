use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use tracing::trace;

use crate::core::axis::Axis;
use crate::core::datum::Datum;
use crate::core::units::{Unit, UnitFamily};
use crate::error::{PlotError, PlotResult};
use crate::ticks::formatter::{TickFormatter, TimeLabelFormat};
use crate::ticks::linear::tick_budget;
use crate::ticks::measure::{LabelMeasurer, any_adjacent_collision};
use crate::ticks::tick_set::TickSet;
use crate::ticks::{TickTuning, ensure_selectable, label_boxes_for};

/// Calendar unit a time tick interval is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeTickUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

/// One rung of the time tick hierarchy: `multiple` calendar units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTickInterval {
    pub unit: TimeTickUnit,
    pub multiple: u32,
}

impl TimeTickInterval {
    #[must_use]
    pub fn approx_seconds(self) -> f64 {
        let unit_seconds = match self.unit {
            TimeTickUnit::Milliseconds => 1e-3,
            TimeTickUnit::Seconds => 1.0,
            TimeTickUnit::Minutes => 60.0,
            TimeTickUnit::Hours => 3_600.0,
            TimeTickUnit::Days => 86_400.0,
            TimeTickUnit::Months => 2_629_800.0,
            TimeTickUnit::Years => 31_557_600.0,
        };
        unit_seconds * f64::from(self.multiple)
    }

    fn label_format(self) -> TimeLabelFormat {
        match self.unit {
            TimeTickUnit::Milliseconds => TimeLabelFormat::Milliseconds,
            TimeTickUnit::Seconds => TimeLabelFormat::Seconds,
            TimeTickUnit::Minutes => TimeLabelFormat::Minutes,
            TimeTickUnit::Hours => TimeLabelFormat::Hours,
            TimeTickUnit::Days => TimeLabelFormat::Days,
            TimeTickUnit::Months => TimeLabelFormat::Months,
            TimeTickUnit::Years => TimeLabelFormat::Years,
        }
    }
}

/// Fixed hierarchy of calendar-aware tick intervals, finest first.
const HIERARCHY: &[TimeTickInterval] = &{
    use TimeTickUnit::*;
    [
        TimeTickInterval { unit: Milliseconds, multiple: 1 },
        TimeTickInterval { unit: Milliseconds, multiple: 2 },
        TimeTickInterval { unit: Milliseconds, multiple: 5 },
        TimeTickInterval { unit: Milliseconds, multiple: 10 },
        TimeTickInterval { unit: Milliseconds, multiple: 20 },
        TimeTickInterval { unit: Milliseconds, multiple: 50 },
        TimeTickInterval { unit: Milliseconds, multiple: 100 },
        TimeTickInterval { unit: Milliseconds, multiple: 200 },
        TimeTickInterval { unit: Milliseconds, multiple: 500 },
        TimeTickInterval { unit: Seconds, multiple: 1 },
        TimeTickInterval { unit: Seconds, multiple: 2 },
        TimeTickInterval { unit: Seconds, multiple: 5 },
        TimeTickInterval { unit: Seconds, multiple: 10 },
        TimeTickInterval { unit: Seconds, multiple: 15 },
        TimeTickInterval { unit: Seconds, multiple: 30 },
        TimeTickInterval { unit: Minutes, multiple: 1 },
        TimeTickInterval { unit: Minutes, multiple: 2 },
        TimeTickInterval { unit: Minutes, multiple: 5 },
        TimeTickInterval { unit: Minutes, multiple: 10 },
        TimeTickInterval { unit: Minutes, multiple: 15 },
        TimeTickInterval { unit: Minutes, multiple: 30 },
        TimeTickInterval { unit: Hours, multiple: 1 },
        TimeTickInterval { unit: Hours, multiple: 2 },
        TimeTickInterval { unit: Hours, multiple: 3 },
        TimeTickInterval { unit: Hours, multiple: 6 },
        TimeTickInterval { unit: Hours, multiple: 12 },
        TimeTickInterval { unit: Days, multiple: 1 },
        TimeTickInterval { unit: Days, multiple: 2 },
        TimeTickInterval { unit: Days, multiple: 5 },
        TimeTickInterval { unit: Days, multiple: 10 },
        TimeTickInterval { unit: Months, multiple: 1 },
        TimeTickInterval { unit: Months, multiple: 2 },
        TimeTickInterval { unit: Months, multiple: 3 },
        TimeTickInterval { unit: Months, multiple: 6 },
        TimeTickInterval { unit: Years, multiple: 1 },
        TimeTickInterval { unit: Years, multiple: 2 },
        TimeTickInterval { unit: Years, multiple: 5 },
        TimeTickInterval { unit: Years, multiple: 10 },
        TimeTickInterval { unit: Years, multiple: 20 },
        TimeTickInterval { unit: Years, multiple: 50 },
        TimeTickInterval { unit: Years, multiple: 100 },
        TimeTickInterval { unit: Years, multiple: 200 },
        TimeTickInterval { unit: Years, multiple: 500 },
        TimeTickInterval { unit: Years, multiple: 1000 },
    ]
};

const MAX_TIME_TICKS: usize = 1_000;

/// Calendar-aware tick selection for time-location axes.
///
/// Intervals come from a fixed hierarchy rather than arithmetic multiples,
/// aligned to calendar boundaries. An iterative overlap check measures
/// adjacent major labels and reduces the tick budget by one on each
/// collision, terminating at no-overlap or at the two-tick minimum.
pub fn select_time_ticks(
    axis: &Axis,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<TickSet> {
    let tuning = tuning.validate()?;
    ensure_selectable(axis)?;

    let range = axis.range();
    let unit = range.unit();
    if unit.family() != UnitFamily::TimeLocation {
        return Err(PlotError::IncompatibleUnits {
            from: unit,
            to: Unit::TimeSeconds,
        });
    }
    let start = range.min().to_datetime()?;
    let end = range.max().to_datetime()?;
    // TimeLocation widths are deltas; express them in seconds directly.
    let span_sec = range.width().value() * unit.delta_scale_to(Unit::TimeSeconds).unwrap_or(1.0);

    let mut budget = tick_budget(axis.device_span(), tuning.time_label_width_guess_px);
    let (major, interval) = loop {
        let mut interval = interval_for_budget(span_sec, budget);
        let mut boundaries = boundaries_between(start, end, interval);
        // Alignment can drop below two ticks near calendar edges; refine
        // until at least two boundaries land inside the range.
        while boundaries.len() < 2 {
            let Some(finer) = finer_interval(interval) else {
                break;
            };
            interval = finer;
            boundaries = boundaries_between(start, end, interval);
        }
        let formatter = TickFormatter::Time {
            format: interval.label_format(),
        };
        let ticks = to_axis_datums(&boundaries, unit)?;
        let boxes = label_boxes_for(axis, &ticks, &formatter, measurer, &tuning)?;
        if any_adjacent_collision(&boxes) && budget > 2 {
            budget -= 1;
            trace!(budget, "time tick labels overlap; reducing budget");
            continue;
        }
        break (ticks, interval);
    };

    let formatter = TickFormatter::Time {
        format: interval.label_format(),
    };

    let minor = match finer_interval(interval) {
        Some(finer) => {
            let boundaries = boundaries_between(start, end, finer);
            let candidates = to_axis_datums(&boundaries, unit)?;
            candidates
                .into_iter()
                .filter(|candidate| {
                    !major
                        .iter()
                        .any(|tick| (tick.value() - candidate.value()).abs() < 1e-9)
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(TickSet::new(major, minor, formatter))
}

/// Finest hierarchy interval that produces at most `budget` ticks.
fn interval_for_budget(span_sec: f64, budget: usize) -> TimeTickInterval {
    let intervals = budget.saturating_sub(1).max(1) as f64;
    for interval in HIERARCHY {
        if span_sec / interval.approx_seconds() <= intervals {
            return *interval;
        }
    }
    HIERARCHY[HIERARCHY.len() - 1]
}

fn finer_interval(interval: TimeTickInterval) -> Option<TimeTickInterval> {
    let index = HIERARCHY.iter().position(|entry| *entry == interval)?;
    index.checked_sub(1).map(|finer| HIERARCHY[finer])
}

fn to_axis_datums(times: &[DateTime<Utc>], unit: Unit) -> PlotResult<Vec<Datum>> {
    times
        .iter()
        .map(|time| Datum::from_datetime(*time).convert_to(unit))
        .collect()
}

/// Calendar boundaries of `interval` inside `[start, end]`, aligned so the
/// first tick sits on a multiple of the interval unit.
fn boundaries_between(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: TimeTickInterval,
) -> Vec<DateTime<Utc>> {
    let mut tick = align_floor(start, interval);
    let mut boundaries = Vec::new();
    while tick <= end && boundaries.len() < MAX_TIME_TICKS {
        if tick >= start {
            boundaries.push(tick);
        }
        tick = step(tick, interval);
    }
    boundaries
}

fn align_floor(time: DateTime<Utc>, interval: TimeTickInterval) -> DateTime<Utc> {
    let multiple = interval.multiple;
    match interval.unit {
        TimeTickUnit::Milliseconds => {
            let ms = time.timestamp_subsec_millis() / multiple * multiple;
            truncate_to_second(time) + Duration::milliseconds(i64::from(ms))
        }
        TimeTickUnit::Seconds => {
            let second = time.second() / multiple * multiple;
            truncate_to_second(time)
                .with_second(second)
                .unwrap_or_else(|| truncate_to_second(time))
        }
        TimeTickUnit::Minutes => {
            let minute = time.minute() / multiple * multiple;
            truncate_to_minute(time)
                .with_minute(minute)
                .unwrap_or_else(|| truncate_to_minute(time))
        }
        TimeTickUnit::Hours => {
            let hour = time.hour() / multiple * multiple;
            truncate_to_hour(time)
                .with_hour(hour)
                .unwrap_or_else(|| truncate_to_hour(time))
        }
        TimeTickUnit::Days => {
            let day = (time.day() - 1) / multiple * multiple + 1;
            date(time.year(), time.month(), day.min(28))
        }
        TimeTickUnit::Months => {
            let month = (time.month() - 1) / multiple * multiple + 1;
            date(time.year(), month, 1)
        }
        TimeTickUnit::Years => {
            let multiple = multiple as i32;
            let year = time.year().div_euclid(multiple) * multiple;
            date(year, 1, 1)
        }
    }
}

fn step(time: DateTime<Utc>, interval: TimeTickInterval) -> DateTime<Utc> {
    let multiple = i64::from(interval.multiple);
    match interval.unit {
        TimeTickUnit::Milliseconds => time + Duration::milliseconds(multiple),
        TimeTickUnit::Seconds => time + Duration::seconds(multiple),
        TimeTickUnit::Minutes => time + Duration::minutes(multiple),
        TimeTickUnit::Hours => time + Duration::hours(multiple),
        TimeTickUnit::Days => time + Duration::days(multiple),
        TimeTickUnit::Months => {
            let months = time.year() * 12 + time.month() as i32 - 1 + interval.multiple as i32;
            date(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
        }
        TimeTickUnit::Years => date(time.year() + interval.multiple as i32, 1, 1),
    }
}

fn truncate_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(time.timestamp(), 0).single().unwrap_or(time)
}

fn truncate_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_second(time)
        .with_second(0)
        .unwrap_or_else(|| truncate_to_second(time))
}

fn truncate_to_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_minute(time)
        .with_minute(0)
        .unwrap_or_else(|| truncate_to_minute(time))
}

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::ScaleKind;
    use crate::core::datum_range::DatumRange;
    use crate::ticks::measure::CharCellMeasurer;

    fn time_axis(start: DateTime<Utc>, end: DateTime<Utc>, span_px: i32) -> Axis {
        let range = DatumRange::new(Datum::from_datetime(start), Datum::from_datetime(end))
            .expect("range");
        Axis::new(range, ScaleKind::Linear, 0, span_px).expect("axis")
    }

    #[test]
    fn hour_span_picks_minute_family_ticks() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let axis = time_axis(start, end, 800);
        let ticks = select_time_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");

        assert!(ticks.major().len() >= 2);
        for tick in ticks.major() {
            let time = tick.to_datetime().expect("datetime");
            assert_eq!(time.second(), 0);
        }
    }

    #[test]
    fn day_ticks_align_to_midnight() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 7, 13, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 9, 2, 0, 0).unwrap();
        let axis = time_axis(start, end, 700);
        let ticks = select_time_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        for tick in ticks.major() {
            let time = tick.to_datetime().expect("datetime");
            assert_eq!((time.hour(), time.minute()), (0, 0));
        }
    }

    #[test]
    fn overlap_backoff_terminates_at_two_ticks() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        // 40 px axis: nothing fits, budget must bottom out at 2, not loop.
        let axis = time_axis(start, end, 40);
        let ticks = select_time_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default())
            .expect("ticks");
        assert!(ticks.major().len() <= 3);
    }

    #[test]
    fn non_time_axis_is_rejected() {
        let axis = Axis::new(
            DatumRange::scalar(0.0, 1.0).expect("range"),
            ScaleKind::Linear,
            0,
            100,
        )
        .expect("axis");
        let result = select_time_ticks(&axis, &CharCellMeasurer::default(), &TickTuning::default());
        assert!(matches!(result, Err(PlotError::IncompatibleUnits { .. })));
    }
}
