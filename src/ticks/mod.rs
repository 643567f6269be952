pub mod divider;
pub mod formatter;
pub mod linear;
pub mod log;
pub mod measure;
pub mod registry;
pub mod spacing;
pub mod tick_set;
pub mod time;

pub use divider::{DomainDivider, has_close_run, select_divider_ticks};
pub use formatter::{TickFormatter, TimeLabelFormat};
pub use linear::select_linear_ticks;
pub use log::select_log_ticks;
pub use measure::{
    AxisOrientation, CharCellMeasurer, LabelBox, LabelExtent, LabelMeasurer,
    any_adjacent_collision,
};
pub use registry::{TickKey, TickRegistry, TickSubscription};
pub use tick_set::TickSet;
pub use time::select_time_ticks;

use serde::{Deserialize, Serialize};

use crate::core::axis::Axis;
use crate::core::datum::Datum;
use crate::core::units::UnitFamily;
use crate::error::{PlotError, PlotResult};

/// Tuning controls for tick selection.
///
/// `minor_close_run` / `minor_close_px` are the empirically tuned
/// minor-density backoff constants: a candidate density is rejected once
/// that many consecutive minor ticks sit within that pixel distance of each
/// other. They are configuration, not derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickTuning {
    pub orientation: AxisOrientation,
    pub coarse_label_width_px: f64,
    pub label_padding_px: f64,
    pub minor_close_run: usize,
    pub minor_close_px: f64,
    pub log_promote_decades: f64,
    pub time_label_width_guess_px: f64,
}

impl Default for TickTuning {
    fn default() -> Self {
        Self {
            orientation: AxisOrientation::Horizontal,
            coarse_label_width_px: 60.0,
            label_padding_px: 8.0,
            minor_close_run: 8,
            minor_close_px: 6.0,
            log_promote_decades: 3.0,
            time_label_width_guess_px: 90.0,
        }
    }
}

impl TickTuning {
    pub(crate) fn validate(self) -> PlotResult<Self> {
        if !self.coarse_label_width_px.is_finite()
            || self.coarse_label_width_px <= 0.0
            || !self.time_label_width_guess_px.is_finite()
            || self.time_label_width_guess_px <= 0.0
        {
            return Err(PlotError::InvalidData(
                "label width guesses must be finite and > 0".to_owned(),
            ));
        }
        if !self.label_padding_px.is_finite() || self.label_padding_px < 0.0 {
            return Err(PlotError::InvalidData(
                "label padding must be finite and >= 0".to_owned(),
            ));
        }
        if self.minor_close_run < 2 {
            return Err(PlotError::InvalidData(
                "minor close run must be >= 2 ticks".to_owned(),
            ));
        }
        if !self.minor_close_px.is_finite() || self.minor_close_px <= 0.0 {
            return Err(PlotError::InvalidData(
                "minor close distance must be finite and > 0".to_owned(),
            ));
        }
        if !self.log_promote_decades.is_finite() || self.log_promote_decades <= 0.0 {
            return Err(PlotError::InvalidData(
                "log promote decades must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PlotError::InvalidData(format!("tick tuning serialization: {err}")))
    }

    pub fn from_json_str(json: &str) -> PlotResult<Self> {
        let tuning: Self = serde_json::from_str(json)
            .map_err(|err| PlotError::InvalidData(format!("tick tuning deserialization: {err}")))?;
        tuning.validate()
    }
}

/// Selects ticks for an axis by its scale mode, routing time-location axes
/// through the calendar-aware selector.
pub fn select_ticks(
    axis: &Axis,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<TickSet> {
    if axis.range().unit().family() == UnitFamily::TimeLocation {
        return select_time_ticks(axis, measurer, tuning);
    }
    match axis.scale() {
        crate::core::axis::ScaleKind::Linear => select_linear_ticks(axis, measurer, tuning),
        crate::core::axis::ScaleKind::Log => select_log_ticks(axis, measurer, tuning),
    }
}

/// Tick algorithms assume a non-degenerate transformed width; enforce it
/// before any pass starts.
pub(crate) fn ensure_selectable(axis: &Axis) -> PlotResult<()> {
    let range = axis.range();
    if range.width().value() > 0.0 {
        Ok(())
    } else {
        Err(PlotError::DegenerateRange {
            min: range.min().value(),
            max: range.max().value(),
        })
    }
}

/// Rendered label intervals for ticks, in axis order.
pub(crate) fn label_boxes_for(
    axis: &Axis,
    ticks: &[Datum],
    formatter: &TickFormatter,
    measurer: &dyn LabelMeasurer,
    tuning: &TickTuning,
) -> PlotResult<Vec<LabelBox>> {
    ticks
        .iter()
        .map(|tick| {
            let center = axis.transform_datum(*tick)?;
            let label = formatter.format(*tick)?;
            let extent =
                measurer.measure(&label).along(tuning.orientation) + tuning.label_padding_px;
            Ok(LabelBox::centered(center, extent))
        })
        .collect()
}

/// Drops ticks that land within half a pixel of their predecessor. Range
/// boundaries often produce such duplicates when an endpoint sits exactly on
/// a step multiple.
pub(crate) fn collapse_boundary_duplicates(axis: &Axis, ticks: Vec<Datum>) -> PlotResult<Vec<Datum>> {
    let mut kept: Vec<Datum> = Vec::with_capacity(ticks.len());
    let mut previous_px: Option<f64> = None;
    for tick in ticks {
        let pixel = axis.transform_datum(tick)?;
        if previous_px.is_none_or(|prev| (pixel - prev).abs() >= 0.5) {
            kept.push(tick);
            previous_px = Some(pixel);
        }
    }
    Ok(kept)
}
