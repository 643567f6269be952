use smallvec::SmallVec;

/// Preferred tick step significands, in walk order.
pub const NICE_SIGNIFICANDS: [f64; 3] = [1.0, 2.0, 5.0];

/// Smallest step from the `{1, 2, 5} x 10^n` ladder that divides `span`
/// into at most `max_ticks - 1` intervals.
#[must_use]
pub fn nice_step(span: f64, max_ticks: usize) -> f64 {
    let intervals = max_ticks.saturating_sub(1).max(1);
    let raw = span / intervals as f64;
    let exponent = raw.log10().floor();

    let mut candidates: SmallVec<[f64; 8]> = SmallVec::new();
    for decade in [exponent, exponent + 1.0] {
        let base = 10f64.powf(decade);
        for significand in NICE_SIGNIFICANDS {
            candidates.push(significand * base);
        }
    }

    // Relative slack forgives ulp noise in raw so e.g. span=1, 6 ticks hits 0.2.
    candidates
        .into_iter()
        .find(|step| *step >= raw * (1.0 - 1e-9))
        .unwrap_or(raw)
}

/// Splits a nice step into `(significand, exponent)`, e.g. `0.2 -> (2, -1)`.
#[must_use]
pub fn step_parts(step: f64) -> (u8, i32) {
    let exponent = step.abs().log10().floor() as i32;
    let significand = (step / 10f64.powi(exponent)).round();
    let significand = if significand >= 10.0 {
        // Rounding pushed us into the next decade.
        return (1, exponent + 1);
    } else {
        significand as u8
    };
    (significand, exponent)
}

/// Number of minor subdivisions per major interval for a nice significand.
#[must_use]
pub fn minor_subdivisions(significand: u8) -> usize {
    match significand {
        2 => 4,
        _ => 5,
    }
}

/// All multiples of `step` inside `[min, max]`, with half-ulp slack at the
/// boundaries so range endpoints that sit on a multiple are included.
#[must_use]
pub fn collect_multiples(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let slack = step * 1e-9;
    let first = ((min - slack) / step).ceil() as i64;
    let last = ((max + slack) / step).floor() as i64;
    (first..=last).map(|index| index as f64 * step).collect()
}
