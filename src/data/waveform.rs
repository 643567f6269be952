use crate::core::units::Unit;
use crate::data::point_set::PointSet;
use crate::error::{PlotError, PlotResult};

/// A rank-2 waveform dataset: each outer record carries `offsets.len()`
/// co-located sub-samples at small deltas from the record's x coordinate.
///
/// Samples are stored row-major, record by record. Offsets are shared by
/// every record and must be sorted ascending so the rasterizer can test
/// column membership from the first and last offset alone.
#[derive(Debug, Clone)]
pub struct WaveformSet {
    record_xs: Vec<f64>,
    offsets: Vec<f64>,
    samples: Vec<f64>,
    x_unit: Unit,
    offset_unit: Unit,
    y_unit: Unit,
    fill: Option<f64>,
}

impl WaveformSet {
    pub fn new(
        record_xs: Vec<f64>,
        offsets: Vec<f64>,
        samples: Vec<f64>,
        x_unit: Unit,
        offset_unit: Unit,
        y_unit: Unit,
    ) -> PlotResult<Self> {
        if offsets.is_empty() {
            return Err(PlotError::InvalidData(
                "waveform offsets must be non-empty".to_owned(),
            ));
        }
        if !offsets.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(PlotError::InvalidData(
                "waveform offsets must be strictly ascending".to_owned(),
            ));
        }
        if samples.len() != record_xs.len() * offsets.len() {
            return Err(PlotError::InvalidData(format!(
                "waveform shape mismatch: {} records x {} offsets != {} samples",
                record_xs.len(),
                offsets.len(),
                samples.len()
            )));
        }
        if offset_unit.delta_scale_to(x_unit).is_none() {
            return Err(PlotError::IncompatibleUnits {
                from: offset_unit,
                to: x_unit,
            });
        }
        Ok(Self {
            record_xs,
            offsets,
            samples,
            x_unit,
            offset_unit,
            y_unit,
            fill: None,
        })
    }

    #[must_use]
    pub fn with_fill(mut self, fill: f64) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.record_xs.len()
    }

    #[must_use]
    pub fn samples_per_record(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn record_xs(&self) -> &[f64] {
        &self.record_xs
    }

    #[must_use]
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Sub-samples of one record.
    #[must_use]
    pub fn record_samples(&self, record: usize) -> &[f64] {
        let width = self.offsets.len();
        &self.samples[record * width..(record + 1) * width]
    }

    #[must_use]
    pub fn x_unit(&self) -> Unit {
        self.x_unit
    }

    #[must_use]
    pub fn offset_unit(&self) -> Unit {
        self.offset_unit
    }

    #[must_use]
    pub fn y_unit(&self) -> Unit {
        self.y_unit
    }

    /// Offset-to-x-delta scale, exact within the unit families accepted at
    /// construction.
    #[must_use]
    pub fn offset_scale(&self) -> f64 {
        self.offset_unit
            .delta_scale_to(self.x_unit)
            .unwrap_or(1.0)
    }

    #[must_use]
    pub fn is_valid_sample(&self, y: f64) -> bool {
        y.is_finite() && !self.fill.is_some_and(|fill| y == fill)
    }

    /// Total sub-sample count across all records.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Dataset accepted by the scatter rasterizer.
#[derive(Debug, Clone)]
pub enum ScatterData {
    Points(PointSet),
    Waveform(WaveformSet),
}

impl ScatterData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Points(points) => points.is_empty(),
            Self::Waveform(waveform) => waveform.record_count() == 0,
        }
    }

    #[must_use]
    pub fn x_unit(&self) -> Unit {
        match self {
            Self::Points(points) => points.x_unit(),
            Self::Waveform(waveform) => waveform.x_unit(),
        }
    }

    #[must_use]
    pub fn y_unit(&self) -> Unit {
        match self {
            Self::Points(points) => points.y_unit(),
            Self::Waveform(waveform) => waveform.y_unit(),
        }
    }

    /// Number of drawable samples (sub-samples for waveforms).
    #[must_use]
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Points(points) => points.len(),
            Self::Waveform(waveform) => waveform.sample_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_is_rejected() {
        let result = WaveformSet::new(
            vec![0.0, 10.0],
            vec![0.0, 1.0, 2.0],
            vec![0.0; 5],
            Unit::TimeSeconds,
            Unit::Seconds,
            Unit::Dimensionless,
        );
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn duration_offsets_apply_to_time_coordinates() {
        let waveform = WaveformSet::new(
            vec![0.0],
            vec![0.0, 0.5],
            vec![1.0, 2.0],
            Unit::TimeSeconds,
            Unit::Milliseconds,
            Unit::Dimensionless,
        )
        .expect("waveform");
        assert_eq!(waveform.offset_scale(), 1e-3);
    }

    #[test]
    fn frequency_offsets_on_time_axis_are_incompatible() {
        let result = WaveformSet::new(
            vec![0.0],
            vec![0.0, 0.5],
            vec![1.0, 2.0],
            Unit::TimeSeconds,
            Unit::Hertz,
            Unit::Dimensionless,
        );
        assert!(matches!(
            result,
            Err(PlotError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn record_samples_slices_row_major() {
        let waveform = WaveformSet::new(
            vec![0.0, 10.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0],
            Unit::Dimensionless,
            Unit::Dimensionless,
            Unit::Dimensionless,
        )
        .expect("waveform");
        assert_eq!(waveform.record_samples(0), &[1.0, 2.0]);
        assert_eq!(waveform.record_samples(1), &[3.0, 4.0]);
    }
}
