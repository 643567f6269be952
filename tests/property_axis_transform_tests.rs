use plotcore_rs::{Axis, DatumRange, ScaleKind, Unit};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_round_trip_property(
        range_min in -1_000_000.0f64..1_000_000.0,
        range_span in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let range_max = range_min + range_span;
        let value = range_min + value_factor * range_span;

        let range = DatumRange::scalar(range_min, range_max).expect("valid range");
        let axis = Axis::new(range, ScaleKind::Linear, 0, 2048).expect("valid axis");

        let px = axis.transform(value, Unit::Dimensionless).expect("to pixel");
        let recovered = axis.inv_transform(px).expect("from pixel");
        let tolerance = axis.pixel_resolution(px).expect("resolution").value();

        prop_assert!((recovered.value() - value).abs() <= tolerance);
    }

    #[test]
    fn log_round_trip_property(
        exp_min in -6.0f64..6.0,
        exp_span in 0.1f64..8.0,
        value_factor in 0.0f64..1.0
    ) {
        let range_min = 10f64.powf(exp_min);
        let range_max = 10f64.powf(exp_min + exp_span);
        let value = 10f64.powf(exp_min + value_factor * exp_span);

        let range = DatumRange::scalar(range_min, range_max).expect("valid range");
        let axis = Axis::new(range, ScaleKind::Log, 0, 2048).expect("valid axis");

        let px = axis.transform(value, Unit::Dimensionless).expect("to pixel");
        let recovered = axis.inv_transform(px).expect("from pixel");
        let tolerance = axis.pixel_resolution(px).expect("resolution").value();

        prop_assert!((recovered.value() - value).abs() <= tolerance);
    }

    #[test]
    fn transform_output_stays_within_device_limit(
        range_min in -1_000.0f64..1_000.0,
        range_span in 0.001f64..1_000.0,
        value in -1e15f64..1e15
    ) {
        let range = DatumRange::scalar(range_min, range_min + range_span)
            .expect("valid range");
        let axis = Axis::new(range, ScaleKind::Linear, 0, 800).expect("valid axis");

        let px = axis.transform(value, Unit::Dimensionless).expect("to pixel");
        prop_assert!(px.abs() <= 10_000.0);
    }

    #[test]
    fn pan_preserves_range_width(
        range_min in -1_000.0f64..1_000.0,
        range_span in 0.001f64..1_000.0,
        fraction in -2.0f64..2.0
    ) {
        let range = DatumRange::scalar(range_min, range_min + range_span)
            .expect("valid range");
        let axis = Axis::new(range, ScaleKind::Linear, 0, 800).expect("valid axis");

        axis.pan(fraction).expect("pan");
        let width = axis.range().width().value();
        prop_assert!((width - range_span).abs() <= range_span * 1e-9 + 1e-12);
    }
}
