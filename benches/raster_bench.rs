use criterion::{Criterion, criterion_group, criterion_main};
use plotcore_rs::data::{PointSet, ScatterData, WaveformSet};
use plotcore_rs::raster::{ScatterOptions, ScatterRasterizer};
use plotcore_rs::ticks::measure::CharCellMeasurer;
use plotcore_rs::ticks::{TickTuning, select_linear_ticks};
use plotcore_rs::{Axis, DatumRange, ScaleKind, Unit};
use std::hint::black_box;

fn axis(min: f64, max: f64, span_px: i32) -> Axis {
    Axis::new(
        DatumRange::scalar(min, max).expect("valid range"),
        ScaleKind::Linear,
        0,
        span_px,
    )
    .expect("valid axis")
}

fn bench_scatter_2m_points(c: &mut Criterion) {
    let count = 2_000_000;
    let xs: Vec<f64> = (0..count)
        .map(|i| (i as f64 * 0.618_033_988_75).fract() * 100.0)
        .collect();
    let ys: Vec<f64> = (0..count)
        .map(|i| (i as f64 * 0.414_213_562_37).fract() * 10.0)
        .collect();
    let points = PointSet::new(xs, ys, Unit::Dimensionless, Unit::Dimensionless)
        .expect("valid point set");
    let data = ScatterData::Points(points);

    let x_axis = axis(0.0, 100.0, 800);
    let y_axis = axis(0.0, 10.0, 600);
    let rasterizer = ScatterRasterizer::new(ScatterOptions {
        sparse_points_per_px: 0.0,
        ..ScatterOptions::default()
    })
    .expect("valid options");

    c.bench_function("scatter_2m_points_800x600", |b| {
        b.iter(|| {
            let _ = rasterizer
                .rasterize(black_box(&data), black_box(&x_axis), black_box(&y_axis))
                .expect("raster should succeed");
        })
    });
}

fn bench_waveform_bulk_binning(c: &mut Criterion) {
    let records = 4_000;
    let per_record = 512;
    let record_xs: Vec<f64> = (0..records).map(|i| i as f64 * 0.025).collect();
    let offsets: Vec<f64> = (0..per_record).map(|i| i as f64 * 1e-5).collect();
    let samples: Vec<f64> = (0..records * per_record)
        .map(|i| ((i as f64 * 0.37).sin() + 1.0) * 5.0)
        .collect();
    let waveform = WaveformSet::new(
        record_xs,
        offsets,
        samples,
        Unit::Seconds,
        Unit::Seconds,
        Unit::Dimensionless,
    )
    .expect("valid waveform");
    let data = ScatterData::Waveform(waveform);

    let x_range = DatumRange::new(
        plotcore_rs::Datum::new(0.0, Unit::Seconds),
        plotcore_rs::Datum::new(100.0, Unit::Seconds),
    )
    .expect("valid range");
    let x_axis = Axis::new(x_range, ScaleKind::Linear, 0, 1000).expect("valid axis");
    let y_axis = axis(0.0, 10.0, 600);
    let rasterizer = ScatterRasterizer::new(ScatterOptions::default()).expect("valid options");

    c.bench_function("waveform_bulk_2m_samples", |b| {
        b.iter(|| {
            let _ = rasterizer
                .rasterize(black_box(&data), black_box(&x_axis), black_box(&y_axis))
                .expect("raster should succeed");
        })
    });
}

fn bench_linear_tick_selection(c: &mut Criterion) {
    let axis = axis(-273.15, 9_876.5, 1920);
    let measurer = CharCellMeasurer::default();
    let tuning = TickTuning::default();

    c.bench_function("linear_tick_selection_1920px", |b| {
        b.iter(|| {
            let _ = select_linear_ticks(black_box(&axis), &measurer, &tuning)
                .expect("selection should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_scatter_2m_points,
    bench_waveform_bulk_binning,
    bench_linear_tick_selection
);
criterion_main!(benches);
