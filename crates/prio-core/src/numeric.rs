//! Numeric helpers shared by scoring and analytics.
//!
//! All helpers are total: they never panic on inverted bounds or non-finite
//! input, since bounds come from user configuration.

/// Replace NaN and infinities with `0.0`.
#[must_use]
pub fn sanitize(x: f64) -> f64 {
    if x.is_finite() { x } else { 0.0 }
}

/// Clamp `x` into `[lo, hi]`. Unlike [`f64::clamp`] this does not panic when
/// `lo > hi`; the lower bound wins.
#[must_use]
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    if x.is_nan() {
        return lo;
    }
    x.min(hi).max(lo)
}

/// Linear rescale of `x` from `[lo, hi]` into `[0, 1]`, clamped.
///
/// A degenerate range (`hi <= lo`) maps everything to `0.0`.
#[must_use]
pub fn normalize01(x: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return 0.0;
    }
    clamp((x - lo) / (hi - lo), 0.0, 1.0)
}

/// Linear rescale of `x` from `[lo, hi]` into `[band_lo, band_hi]`, clamped.
#[must_use]
pub fn scale_to_band(x: f64, lo: f64, hi: f64, band_lo: f64, band_hi: f64) -> f64 {
    band_lo + normalize01(x, lo, hi) * (band_hi - band_lo)
}

/// PERT three-point weighted mean.
#[must_use]
pub fn pert_mean(optimistic: f64, most_likely: f64, pessimistic: f64) -> f64 {
    4.0f64.mul_add(most_likely, optimistic + pessimistic) / 6.0
}

/// PERT variance approximation `((p - o) / 6)^2`.
#[must_use]
pub fn pert_variance(optimistic: f64, pessimistic: f64) -> f64 {
    ((pessimistic - optimistic) / 6.0).powi(2)
}

/// Arithmetic mean; `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
