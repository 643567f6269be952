use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::axis::Axis;
use crate::data::point_set::PointSet;
use crate::data::waveform::{ScatterData, WaveformSet};
use crate::error::{PlotError, PlotResult};
use crate::raster::histogram::PixelHistogram;
use crate::raster::rebin::RebinDescriptor;
use crate::raster::surface::{RgbaRaster, argb};

/// How the per-column envelope participates in the rendered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EnvelopeMode {
    /// Plain density shading only.
    #[default]
    Off,
    /// Faint full-column envelope beneath the density shading.
    Faint,
    /// Envelope outline only: min/max hit row per column, solid color, no
    /// interior density.
    OutlineOnly,
}

/// Tuning controls for the huge-scatter rasterizer.
///
/// `saturation_hit_count` is the density-to-opacity calibration knob: the
/// per-bin hit count at which shading reaches full opacity. It is applied
/// clamped to `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterOptions {
    pub base_color_rgb: u32,
    pub saturation_hit_count: u32,
    pub envelope: EnvelopeMode,
    /// Sparse fallback threshold: datasets with at most this many points per
    /// pixel of axis width skip the histogram and draw a connected polyline.
    pub sparse_points_per_px: f64,
}

impl Default for ScatterOptions {
    fn default() -> Self {
        Self {
            base_color_rgb: 0x1F77B4,
            saturation_hit_count: 5,
            envelope: EnvelopeMode::Off,
            sparse_points_per_px: 20.0,
        }
    }
}

impl ScatterOptions {
    fn validate(self) -> PlotResult<Self> {
        if self.base_color_rgb > 0x00FF_FFFF {
            return Err(PlotError::InvalidData(
                "base color must be a 24-bit RGB value".to_owned(),
            ));
        }
        if self.saturation_hit_count == 0 {
            return Err(PlotError::InvalidData(
                "saturation hit count must be >= 1".to_owned(),
            ));
        }
        if !self.sparse_points_per_px.is_finite() || self.sparse_points_per_px < 0.0 {
            return Err(PlotError::InvalidData(
                "sparse threshold must be finite and >= 0".to_owned(),
            ));
        }
        Ok(self)
    }

    /// Saturation knob as applied: capped at 10 hits.
    #[must_use]
    pub fn effective_saturation(self) -> u32 {
        self.saturation_hit_count.clamp(1, 10)
    }

    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PlotError::InvalidData(format!("scatter options serialization: {err}")))
    }

    pub fn from_json_str(json: &str) -> PlotResult<Self> {
        let options: Self = serde_json::from_str(json).map_err(|err| {
            PlotError::InvalidData(format!("scatter options deserialization: {err}"))
        })?;
        options.validate()
    }
}

/// Per-column min/max hit rows, tracked independently of the histogram so
/// the envelope outline is available in every mode.
#[derive(Debug, Clone)]
struct ColumnEnvelope {
    rows: Vec<Option<(usize, usize)>>,
}

impl ColumnEnvelope {
    fn new(width: usize) -> Self {
        Self {
            rows: vec![None; width],
        }
    }

    fn note(&mut self, column: usize, row: usize) {
        if let Some(slot) = self.rows.get_mut(column) {
            *slot = Some(match *slot {
                Some((min, max)) => (min.min(row), max.max(row)),
                None => (row, row),
            });
        }
    }

    #[cfg(feature = "parallel-raster")]
    fn merge(&mut self, other: &ColumnEnvelope) {
        for (slot, incoming) in self.rows.iter_mut().zip(&other.rows) {
            if let Some((min, max)) = incoming {
                *slot = Some(match *slot {
                    Some((current_min, current_max)) => {
                        (current_min.min(*min), current_max.max(*max))
                    }
                    None => (*min, *max),
                });
            }
        }
    }
}

/// Rasterizes large point and waveform datasets into a density image by
/// binning samples into a device-pixel histogram.
#[derive(Debug, Clone)]
pub struct ScatterRasterizer {
    options: ScatterOptions,
}

impl ScatterRasterizer {
    pub fn new(options: ScatterOptions) -> PlotResult<Self> {
        Ok(Self {
            options: options.validate()?,
        })
    }

    #[must_use]
    pub fn options(&self) -> ScatterOptions {
        self.options
    }

    /// Renders `data` against the two axes into an RGBA raster whose origin
    /// is the axes' `(device_min, device_min)` corner.
    ///
    /// Unit incompatibilities between the dataset and an axis propagate as
    /// errors; the plot layer downgrades them to advisory messages.
    pub fn rasterize(
        &self,
        data: &ScatterData,
        x_axis: &Axis,
        y_axis: &Axis,
    ) -> PlotResult<RgbaRaster> {
        let (x_scale, x_offset) = data
            .x_unit()
            .conversion_to(x_axis.range().unit())
            .ok_or(PlotError::IncompatibleUnits {
                from: data.x_unit(),
                to: x_axis.range().unit(),
            })?;
        let (y_scale, y_offset) = data
            .y_unit()
            .conversion_to(y_axis.range().unit())
            .ok_or(PlotError::IncompatibleUnits {
                from: data.y_unit(),
                to: y_axis.range().unit(),
            })?;

        let x_rebin = RebinDescriptor::for_axis(x_axis)?;
        let y_rebin = RebinDescriptor::for_axis(y_axis)?;
        let width = x_rebin.bin_count();
        let height = y_rebin.bin_count();
        let mut raster = RgbaRaster::new(width as u32, height as u32)?;

        if data.is_empty() {
            return Ok(raster);
        }

        match data {
            ScatterData::Points(points) if self.is_sparse(points, width) => {
                trace!(points = points.len(), width, "sparse polyline path");
                self.draw_sparse(points, x_axis, y_axis, x_scale, x_offset, y_scale, y_offset, &mut raster)?;
            }
            ScatterData::Points(points) => {
                let convert = AxisConversion {
                    x_scale,
                    x_offset,
                    y_scale,
                    y_offset,
                };
                let (histogram, envelope) =
                    fill_points(points, &x_rebin, &y_rebin, convert, x_axis)?;
                debug!(hits = histogram.total_hits(), "dense scatter binned");
                self.compose(&histogram, &envelope, &mut raster);
            }
            ScatterData::Waveform(waveform) => {
                let convert = AxisConversion {
                    x_scale,
                    x_offset,
                    y_scale,
                    y_offset,
                };
                let (histogram, envelope) =
                    fill_waveform(waveform, &x_rebin, &y_rebin, convert)?;
                debug!(hits = histogram.total_hits(), "waveform binned");
                self.compose(&histogram, &envelope, &mut raster);
            }
        }
        Ok(raster)
    }

    fn is_sparse(&self, points: &PointSet, width: usize) -> bool {
        (points.len() as f64) <= self.options.sparse_points_per_px * width as f64
    }

    fn compose(
        &self,
        histogram: &PixelHistogram,
        envelope: &ColumnEnvelope,
        raster: &mut RgbaRaster,
    ) {
        let saturation = self.options.effective_saturation();
        let rgb = self.options.base_color_rgb;
        match self.options.envelope {
            EnvelopeMode::Off => histogram.shade_onto(raster, rgb, saturation),
            EnvelopeMode::Faint => {
                let faint_alpha = ((255 / saturation) as u8).max(1);
                for (column, rows) in envelope.rows.iter().enumerate() {
                    if let Some((min_row, max_row)) = rows {
                        for row in *min_row..=*max_row {
                            raster.blend_pixel(column as i32, row as i32, argb(faint_alpha, rgb));
                        }
                    }
                }
                histogram.shade_onto(raster, rgb, saturation);
            }
            EnvelopeMode::OutlineOnly => {
                let solid = argb(255, rgb);
                let mut previous: Option<(usize, usize, usize)> = None;
                for (column, rows) in envelope.rows.iter().enumerate() {
                    let Some((min_row, max_row)) = rows else {
                        continue;
                    };
                    match previous {
                        Some((prev_col, prev_min, prev_max)) => {
                            raster.draw_line(
                                prev_col as i32,
                                prev_min as i32,
                                column as i32,
                                *min_row as i32,
                                solid,
                            );
                            raster.draw_line(
                                prev_col as i32,
                                prev_max as i32,
                                column as i32,
                                *max_row as i32,
                                solid,
                            );
                        }
                        None => {
                            raster.set_pixel(column as i32, *min_row as i32, solid);
                            raster.set_pixel(column as i32, *max_row as i32, solid);
                        }
                    }
                    previous = Some((column, *min_row, *max_row));
                }
            }
        }
    }

    /// Direct polyline rendering for datasets too small to be worth binning:
    /// one-pixel dots connected by segments, with a pen-lift whenever two
    /// consecutive samples sit farther apart in pixel x than one cadence
    /// step. That keeps data gaps from growing spurious long lines.
    #[allow(clippy::too_many_arguments)]
    fn draw_sparse(
        &self,
        points: &PointSet,
        x_axis: &Axis,
        y_axis: &Axis,
        x_scale: f64,
        x_offset: f64,
        y_scale: f64,
        y_offset: f64,
        raster: &mut RgbaRaster,
    ) -> PlotResult<()> {
        let solid = argb(255, self.options.base_color_rgb);
        let x_origin = f64::from(x_axis.device_min());
        let y_origin = f64::from(y_axis.device_min());
        let x_unit = x_axis.range().unit();
        let y_unit = y_axis.range().unit();

        let ixstep_limit_sq = ixstep_limit_sq(points, x_axis, x_scale, x_offset)?;

        let x_range = x_axis.range();
        let data_lo = (x_range.min().value() - x_offset) / x_scale;
        let data_hi = (x_range.max().value() - x_offset) / x_scale;
        let indices = points.visible_indices(data_lo.min(data_hi), data_lo.max(data_hi));

        let mut last: Option<(i32, i32)> = None;
        for index in indices {
            let x = points.xs()[index];
            let y = points.ys()[index];
            if !x.is_finite() || !points.is_valid_sample(y) {
                last = None;
                continue;
            }
            let px = (x_axis.transform(x * x_scale + x_offset, x_unit)? - x_origin).round() as i32;
            let py = (y_axis.transform(y * y_scale + y_offset, y_unit)? - y_origin).round() as i32;
            raster.blend_pixel(px, py, solid);
            if let Some((last_x, last_y)) = last {
                let dx = f64::from(px - last_x);
                if dx * dx <= ixstep_limit_sq {
                    raster.draw_line(last_x, last_y, px, py, solid);
                }
            }
            last = Some((px, py));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisConversion {
    x_scale: f64,
    x_offset: f64,
    y_scale: f64,
    y_offset: f64,
}

/// Squared pixel-x distance beyond which consecutive sparse samples are not
/// connected. One cadence step plus a pixel of slack; unsorted data has no
/// cadence and never lifts the pen.
fn ixstep_limit_sq(
    points: &PointSet,
    x_axis: &Axis,
    x_scale: f64,
    x_offset: f64,
) -> PlotResult<f64> {
    let Some(cadence) = points.cadence() else {
        return Ok(f64::INFINITY);
    };
    let unit = x_axis.range().unit();
    let reference = x_axis.range().min().value();
    let at_reference = x_axis.transform(reference, unit)?;
    let at_step = x_axis.transform(reference + cadence * x_scale, unit)?;
    let step_px = (at_step - at_reference).abs();
    Ok((step_px + 1.0).powi(2))
}

fn fill_points(
    points: &PointSet,
    x_rebin: &RebinDescriptor,
    y_rebin: &RebinDescriptor,
    convert: AxisConversion,
    x_axis: &Axis,
) -> PlotResult<(PixelHistogram, ColumnEnvelope)> {
    let x_range = x_axis.range();
    let data_lo = (x_range.min().value() - convert.x_offset) / convert.x_scale;
    let data_hi = (x_range.max().value() - convert.x_offset) / convert.x_scale;
    let indices = points.visible_indices(data_lo.min(data_hi), data_lo.max(data_hi));

    fill_points_range(points, x_rebin, y_rebin, convert, indices)
}

#[cfg(not(feature = "parallel-raster"))]
fn fill_points_range(
    points: &PointSet,
    x_rebin: &RebinDescriptor,
    y_rebin: &RebinDescriptor,
    convert: AxisConversion,
    indices: std::ops::Range<usize>,
) -> PlotResult<(PixelHistogram, ColumnEnvelope)> {
    let mut histogram = PixelHistogram::new(x_rebin.bin_count(), y_rebin.bin_count())?;
    let mut envelope = ColumnEnvelope::new(x_rebin.bin_count());
    for index in indices {
        bin_point(points, index, x_rebin, y_rebin, convert, &mut histogram, &mut envelope);
    }
    Ok((histogram, envelope))
}

#[cfg(feature = "parallel-raster")]
fn fill_points_range(
    points: &PointSet,
    x_rebin: &RebinDescriptor,
    y_rebin: &RebinDescriptor,
    convert: AxisConversion,
    indices: std::ops::Range<usize>,
) -> PlotResult<(PixelHistogram, ColumnEnvelope)> {
    use rayon::prelude::*;

    let index_list: Vec<usize> = indices.collect();
    index_list
        .par_chunks(64 * 1024)
        .map(|chunk| -> PlotResult<(PixelHistogram, ColumnEnvelope)> {
            let mut histogram = PixelHistogram::new(x_rebin.bin_count(), y_rebin.bin_count())?;
            let mut envelope = ColumnEnvelope::new(x_rebin.bin_count());
            for index in chunk {
                bin_point(points, *index, x_rebin, y_rebin, convert, &mut histogram, &mut envelope);
            }
            Ok((histogram, envelope))
        })
        .try_reduce(
            || {
                // Bin counts are non-zero by RebinDescriptor construction.
                let histogram = PixelHistogram::new(x_rebin.bin_count(), y_rebin.bin_count())
                    .expect("non-zero bin counts");
                (histogram, ColumnEnvelope::new(x_rebin.bin_count()))
            },
            |(mut histogram, mut envelope), (other_histogram, other_envelope)| {
                histogram.merge(&other_histogram);
                envelope.merge(&other_envelope);
                Ok((histogram, envelope))
            },
        )
}

#[inline]
fn bin_point(
    points: &PointSet,
    index: usize,
    x_rebin: &RebinDescriptor,
    y_rebin: &RebinDescriptor,
    convert: AxisConversion,
    histogram: &mut PixelHistogram,
    envelope: &mut ColumnEnvelope,
) {
    let x = points.xs()[index];
    let y = points.ys()[index];
    if !x.is_finite() || !points.is_valid_sample(y) {
        return;
    }
    let Some(column) = x_rebin.bin_of(x * convert.x_scale + convert.x_offset) else {
        return;
    };
    let Some(row) = y_rebin.bin_of(y * convert.y_scale + convert.y_offset) else {
        return;
    };
    histogram.increment(column, row);
    envelope.note(column, row);
}

/// Bins a waveform dataset, taking the bulk per-record path whenever all of
/// a record's sub-sample offsets land in the same output pixel column. The
/// bulk path hoists the x transform out of the sample loop; the fallback
/// transforms each sub-sample's x individually.
fn fill_waveform(
    waveform: &WaveformSet,
    x_rebin: &RebinDescriptor,
    y_rebin: &RebinDescriptor,
    convert: AxisConversion,
) -> PlotResult<(PixelHistogram, ColumnEnvelope)> {
    let mut histogram = PixelHistogram::new(x_rebin.bin_count(), y_rebin.bin_count())?;
    let mut envelope = ColumnEnvelope::new(x_rebin.bin_count());

    let offsets = waveform.offsets();
    let offset_scale = waveform.offset_scale();
    let first_offset = offsets[0];
    let last_offset = offsets[offsets.len() - 1];

    for record in 0..waveform.record_count() {
        let x = waveform.record_xs()[record];
        if !x.is_finite() {
            continue;
        }
        let samples = waveform.record_samples(record);
        let first_col =
            x_rebin.bin_of((x + first_offset * offset_scale) * convert.x_scale + convert.x_offset);
        let last_col =
            x_rebin.bin_of((x + last_offset * offset_scale) * convert.x_scale + convert.x_offset);

        match (first_col, last_col) {
            (Some(column), Some(last_column)) if column == last_column => {
                // Bulk path: one column for the whole record.
                for y in samples {
                    if !waveform.is_valid_sample(*y) {
                        continue;
                    }
                    let Some(row) = y_rebin.bin_of(y * convert.y_scale + convert.y_offset) else {
                        continue;
                    };
                    histogram.increment(column, row);
                    envelope.note(column, row);
                }
            }
            _ => {
                for (offset, y) in offsets.iter().zip(samples) {
                    if !waveform.is_valid_sample(*y) {
                        continue;
                    }
                    let Some(column) = x_rebin.bin_of(
                        (x + offset * offset_scale) * convert.x_scale + convert.x_offset,
                    ) else {
                        continue;
                    };
                    let Some(row) = y_rebin.bin_of(y * convert.y_scale + convert.y_offset) else {
                        continue;
                    };
                    histogram.increment(column, row);
                    envelope.note(column, row);
                }
            }
        }
    }
    Ok((histogram, envelope))
}
