use plotcore_rs::data::{PointSet, ScatterData, WaveformSet};
use plotcore_rs::raster::surface::alpha_of;
use plotcore_rs::raster::{EnvelopeMode, PixelHistogram, ScatterOptions, ScatterRasterizer};
use plotcore_rs::{Axis, DatumRange, PlotError, ScaleKind, Unit};

fn axis(min: f64, max: f64, span_px: i32) -> Axis {
    Axis::new(
        DatumRange::scalar(min, max).expect("valid range"),
        ScaleKind::Linear,
        0,
        span_px,
    )
    .expect("valid axis")
}

/// Deterministic xorshift generator, good enough for bin-stress data.
struct SplitMix(u64);

impl SplitMix {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[test]
fn two_million_points_rasterize_without_alpha_overflow() {
    let mut rng = SplitMix(0x5EED);
    let count = 2_000_000;
    let mut xs = Vec::with_capacity(count);
    let mut ys = Vec::with_capacity(count);
    for _ in 0..count {
        xs.push(rng.next_unit() * 100.0);
        ys.push(rng.next_unit() * 10.0);
    }
    let points = PointSet::new(xs, ys, Unit::Dimensionless, Unit::Dimensionless)
        .expect("valid point set");

    let rasterizer = ScatterRasterizer::new(ScatterOptions {
        saturation_hit_count: 5,
        sparse_points_per_px: 0.0,
        ..ScatterOptions::default()
    })
    .expect("valid options");
    let raster = rasterizer
        .rasterize(
            &ScatterData::Points(points),
            &axis(0.0, 100.0, 800),
            &axis(0.0, 10.0, 600),
        )
        .expect("raster");

    assert_eq!((raster.width(), raster.height()), (800, 600));
    // ~4 hits per bin on average: a dense image, every alpha still in range.
    let shaded = raster
        .pixels()
        .iter()
        .filter(|pixel| alpha_of(**pixel) > 0)
        .count();
    assert!(shaded > 400_000, "expected dense coverage, got {shaded}");
}

#[test]
fn saturation_cap_applies_above_ten() {
    // Requested saturation 50 caps at 10 hits.
    let options = ScatterOptions {
        saturation_hit_count: 50,
        ..ScatterOptions::default()
    };
    assert_eq!(options.effective_saturation(), 10);
    assert_eq!(PixelHistogram::alpha_for(10, options.effective_saturation()), 255);
    assert_eq!(PixelHistogram::alpha_for(1, options.effective_saturation()), 25);
}

#[test]
fn fill_sentinel_samples_never_bin() {
    let points = PointSet::new(
        vec![5.0, 5.0, 5.0],
        vec![-1e31, -1e31, 5.0],
        Unit::Dimensionless,
        Unit::Dimensionless,
    )
    .expect("valid point set")
    .with_fill(-1e31);

    let raster = ScatterRasterizer::new(ScatterOptions {
        saturation_hit_count: 1,
        sparse_points_per_px: 0.0,
        ..ScatterOptions::default()
    })
    .expect("valid options")
    .rasterize(
        &ScatterData::Points(points),
        &axis(0.0, 10.0, 10),
        &axis(0.0, 10.0, 10),
    )
    .expect("raster");

    let shaded = raster
        .pixels()
        .iter()
        .filter(|pixel| alpha_of(**pixel) > 0)
        .count();
    assert_eq!(shaded, 1);
}

#[test]
fn waveform_dataset_bins_per_record_offsets() {
    // 1 kHz-style waveform: record timestamps in seconds, offsets in ms.
    let record_xs = vec![10.0, 20.0, 30.0];
    let offsets: Vec<f64> = (0..8).map(|i| f64::from(i) * 0.5).collect();
    let samples: Vec<f64> = (0..24).map(|i| f64::from(i % 8) / 8.0).collect();
    let waveform = WaveformSet::new(
        record_xs,
        offsets,
        samples,
        Unit::Seconds,
        Unit::Milliseconds,
        Unit::Dimensionless,
    )
    .expect("valid waveform");

    let x_range = DatumRange::new(
        plotcore_rs::Datum::new(0.0, Unit::Seconds),
        plotcore_rs::Datum::new(40.0, Unit::Seconds),
    )
    .expect("valid range");
    let x_axis = Axis::new(x_range, ScaleKind::Linear, 0, 40).expect("valid axis");
    let y_axis = axis(0.0, 1.0, 40);

    let raster = ScatterRasterizer::new(ScatterOptions::default())
        .expect("valid options")
        .rasterize(&ScatterData::Waveform(waveform), &x_axis, &y_axis)
        .expect("raster");

    // Each record's offsets span 3.5 ms, far below one pixel column: three
    // shaded columns total.
    let mut columns = Vec::new();
    for column in 0..raster.width() {
        let hit = (0..raster.height())
            .any(|row| alpha_of(raster.pixel(column, row).expect("in bounds")) > 0);
        if hit {
            columns.push(column);
        }
    }
    assert_eq!(columns, vec![10, 20, 30]);
}

#[test]
fn envelope_outline_mode_draws_extremes_only() {
    let mut rng = SplitMix(7);
    let count = 50_000;
    let mut xs = Vec::with_capacity(count);
    let mut ys = Vec::with_capacity(count);
    for i in 0..count {
        xs.push(i as f64 / count as f64 * 100.0);
        ys.push(4.0 + 2.0 * rng.next_unit());
    }
    let points = PointSet::new(xs, ys, Unit::Dimensionless, Unit::Dimensionless)
        .expect("valid point set");

    let raster = ScatterRasterizer::new(ScatterOptions {
        envelope: EnvelopeMode::OutlineOnly,
        sparse_points_per_px: 0.0,
        ..ScatterOptions::default()
    })
    .expect("valid options")
    .rasterize(
        &ScatterData::Points(points),
        &axis(0.0, 100.0, 200),
        &axis(0.0, 10.0, 100),
    )
    .expect("raster");

    // The band interior (rows 50..70 map to y 5..7) stays mostly unshaded;
    // only the two outline curves are drawn.
    let shaded = raster
        .pixels()
        .iter()
        .filter(|pixel| alpha_of(**pixel) > 0)
        .count();
    assert!(shaded < 2_000, "outline mode shaded {shaded} pixels");
}

#[test]
fn sparse_data_connects_only_within_cadence() {
    let xs = vec![10.0, 11.0, 12.0, 13.0, 80.0, 81.0, 82.0];
    let ys = vec![5.0; 7];
    let points = PointSet::new(xs, ys, Unit::Dimensionless, Unit::Dimensionless)
        .expect("valid point set");

    let raster = ScatterRasterizer::new(ScatterOptions::default())
        .expect("valid options")
        .rasterize(
            &ScatterData::Points(points),
            &axis(0.0, 100.0, 400),
            &axis(0.0, 10.0, 100),
        )
        .expect("raster");

    // Data gap between x=13 and x=80: columns 100..300 stay empty.
    for column in 100..300 {
        for row in 0..raster.height() {
            assert_eq!(
                alpha_of(raster.pixel(column, row).expect("in bounds")),
                0,
                "unexpected ink at column {column}"
            );
        }
    }
}

#[test]
fn cross_family_dataset_units_fail_rasterization() {
    let points = PointSet::new(vec![1.0], vec![1.0], Unit::Kelvin, Unit::Dimensionless)
        .expect("valid point set");
    let result = ScatterRasterizer::new(ScatterOptions::default())
        .expect("valid options")
        .rasterize(
            &ScatterData::Points(points),
            &axis(0.0, 10.0, 100),
            &axis(0.0, 10.0, 100),
        );
    assert!(matches!(result, Err(PlotError::IncompatibleUnits { .. })));
}

#[test]
fn dataset_in_milliseconds_lands_on_seconds_axis() {
    let points = PointSet::new(
        vec![5_000.0],
        vec![5.0],
        Unit::Milliseconds,
        Unit::Dimensionless,
    )
    .expect("valid point set");

    let x_range = DatumRange::new(
        plotcore_rs::Datum::new(0.0, Unit::Seconds),
        plotcore_rs::Datum::new(10.0, Unit::Seconds),
    )
    .expect("valid range");
    let x_axis = Axis::new(x_range, ScaleKind::Linear, 0, 10).expect("valid axis");

    let raster = ScatterRasterizer::new(ScatterOptions {
        sparse_points_per_px: 0.0,
        saturation_hit_count: 1,
        ..ScatterOptions::default()
    })
    .expect("valid options")
    .rasterize(&ScatterData::Points(points), &x_axis, &axis(0.0, 10.0, 10))
    .expect("raster");

    // 5000 ms converts to 5 s: column 5.
    let hit = (0..raster.height())
        .any(|row| alpha_of(raster.pixel(5, row).expect("in bounds")) > 0);
    assert!(hit);
}
