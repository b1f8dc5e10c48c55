//! Small numerical toolkit: least squares, exponential smoothing, AR(1),
//! information criteria and normal quantiles.
//!
//! Every fit returns [`AnalyticsError`] instead of panicking so callers can
//! fall back to a simpler model.

use prio_core::numeric::mean;

use crate::error::AnalyticsError;

/// Floor for residual variance inside `ln`, keeps perfect fits finite.
const RSS_FLOOR: f64 = 1e-12;

/// Akaike information criterion for a Gaussian fit: `n ln(rss/n) + 2k`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aic(rss: f64, n: usize, k: usize) -> f64 {
    let n_f = n.max(1) as f64;
    n_f.mul_add((rss / n_f).max(RSS_FLOOR).ln(), 2.0 * k as f64)
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub rss: f64,
    pub n: usize,
    x_mean: f64,
    sxx: f64,
}

impl LinearFit {
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }

    /// Residual variance with `n - 2` degrees of freedom (0 for two points).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sigma2(&self) -> f64 {
        if self.n > 2 {
            self.rss / (self.n - 2) as f64
        } else {
            0.0
        }
    }

    /// Standard error of a new observation at `x`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn prediction_se(&self, x: f64) -> f64 {
        let leverage = 1.0 / self.n as f64 + (x - self.x_mean).powi(2) / self.sxx;
        (self.sigma2() * (1.0 + leverage)).sqrt()
    }

    #[must_use]
    pub fn aic(&self) -> f64 {
        aic(self.rss, self.n, 2)
    }
}

/// Least-squares line through `(xs[i], ys[i])`.
///
/// # Errors
///
/// Fewer than two points, mismatched lengths, or constant `xs`.
pub fn ols(xs: &[f64], ys: &[f64]) -> Result<LinearFit, AnalyticsError> {
    const MODEL: &str = "OLS";
    if xs.len() != ys.len() {
        return Err(AnalyticsError::Degenerate {
            model: MODEL,
            reason: "length mismatch",
        });
    }
    let n = xs.len();
    if n < 2 {
        return Err(AnalyticsError::InsufficientData {
            model: MODEL,
            needed: 2,
            got: n,
        });
    }
    let (Some(x_mean), Some(y_mean)) = (mean(xs), mean(ys)) else {
        return Err(AnalyticsError::InsufficientData {
            model: MODEL,
            needed: 2,
            got: n,
        });
    };
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        sxx += (x - x_mean).powi(2);
        sxy += (x - x_mean) * (y - y_mean);
    }
    if sxx <= f64::EPSILON {
        return Err(AnalyticsError::Degenerate {
            model: MODEL,
            reason: "constant x",
        });
    }
    let slope = sxy / sxx;
    let intercept = slope.mul_add(-x_mean, y_mean);
    let rss = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - slope.mul_add(*x, intercept)).powi(2))
        .sum::<f64>();
    if !(slope.is_finite() && intercept.is_finite() && rss.is_finite()) {
        return Err(AnalyticsError::NonFinite { model: MODEL });
    }
    Ok(LinearFit {
        intercept,
        slope,
        rss,
        n,
        x_mean,
        sxx,
    })
}

// ---------------------------------------------------------------------------
// Holt linear exponential smoothing
// ---------------------------------------------------------------------------

/// Holt smoothing state after the last observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltFit {
    pub alpha: f64,
    pub beta: f64,
    pub level: f64,
    pub trend: f64,
    /// Sum of squared one-step-ahead errors.
    pub sse: f64,
    /// Number of one-step errors behind `sse`.
    pub n: usize,
}

impl HoltFit {
    /// Forecast `h` steps past the last observation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn forecast(&self, h: usize) -> f64 {
        self.trend.mul_add(h as f64, self.level)
    }

    #[must_use]
    pub fn aic(&self) -> f64 {
        aic(self.sse, self.n, 2)
    }
}

fn holt_pass(ys: &[f64], alpha: f64, beta: f64) -> HoltFit {
    let mut level = ys[0];
    let mut trend = ys[1] - ys[0];
    let mut sse = 0.0;
    for &y in &ys[1..] {
        let err = y - (level + trend);
        sse += err * err;
        let next_level = alpha.mul_add(y, (1.0 - alpha) * (level + trend));
        trend = beta.mul_add(next_level - level, (1.0 - beta) * trend);
        level = next_level;
    }
    HoltFit {
        alpha,
        beta,
        level,
        trend,
        sse,
        n: ys.len() - 1,
    }
}

/// Holt smoothing with `alpha`, `beta` chosen on a 0.1 grid by lowest SSE.
///
/// # Errors
///
/// Fewer than three points or a non-finite result.
pub fn holt(ys: &[f64]) -> Result<HoltFit, AnalyticsError> {
    const MODEL: &str = "HOLT";
    if ys.len() < 3 {
        return Err(AnalyticsError::InsufficientData {
            model: MODEL,
            needed: 3,
            got: ys.len(),
        });
    }
    let grid: Vec<f64> = (1..10).map(|i| f64::from(i) / 10.0).collect();
    let mut best: Option<HoltFit> = None;
    for &alpha in &grid {
        for &beta in &grid {
            let fit = holt_pass(ys, alpha, beta);
            if best.is_none_or(|b| fit.sse < b.sse) {
                best = Some(fit);
            }
        }
    }
    best.filter(|f| f.sse.is_finite() && f.level.is_finite() && f.trend.is_finite())
        .ok_or(AnalyticsError::NonFinite { model: MODEL })
}

// ---------------------------------------------------------------------------
// AR(1)
// ---------------------------------------------------------------------------

/// `y[t] = c + phi * y[t-1] + e`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ar1Fit {
    pub c: f64,
    pub phi: f64,
    pub sigma2: f64,
    pub rss: f64,
    pub n: usize,
    pub last: f64,
}

impl Ar1Fit {
    /// Mean forecast `h` steps ahead (h >= 1).
    #[must_use]
    pub fn forecast(&self, h: usize) -> f64 {
        let mut y = self.last;
        for _ in 0..h.max(1) {
            y = self.phi.mul_add(y, self.c);
        }
        y
    }

    /// Forecast standard error `h` steps ahead.
    #[must_use]
    pub fn forecast_se(&self, h: usize) -> f64 {
        let phi2 = self.phi * self.phi;
        let mut acc = 0.0;
        let mut term = 1.0;
        for _ in 0..h.max(1) {
            acc += term;
            term *= phi2;
        }
        (self.sigma2 * acc).sqrt()
    }

    #[must_use]
    pub fn aic(&self) -> f64 {
        aic(self.rss, self.n, 2)
    }
}

/// AR(1) by least squares on lagged pairs.
///
/// # Errors
///
/// Fewer than four points, or a constant series.
pub fn ar1(ys: &[f64]) -> Result<Ar1Fit, AnalyticsError> {
    const MODEL: &str = "AR1";
    if ys.len() < 4 {
        return Err(AnalyticsError::InsufficientData {
            model: MODEL,
            needed: 4,
            got: ys.len(),
        });
    }
    let lagged = &ys[..ys.len() - 1];
    let current = &ys[1..];
    let line = ols(lagged, current).map_err(|_| AnalyticsError::Degenerate {
        model: MODEL,
        reason: "constant series",
    })?;
    let last = ys[ys.len() - 1];
    Ok(Ar1Fit {
        c: line.intercept,
        phi: line.slope,
        sigma2: line.sigma2(),
        rss: line.rss,
        n: line.n,
        last,
    })
}

// ---------------------------------------------------------------------------
// Descriptive helpers
// ---------------------------------------------------------------------------

/// Trailing simple moving averages over full windows. A window longer than
/// the series is shrunk to the series length.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.clamp(1, values.len().max(1));
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Exponential moving average with smoothing `2 / (span + 1)`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ema(values: &[f64], span: usize) -> Option<f64> {
    let (&first, rest) = values.split_first()?;
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    Some(
        rest.iter()
            .fold(first, |s, &v| alpha.mul_add(v, (1.0 - alpha) * s)),
    )
}

/// Population variance; 0 for fewer than two values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values).unwrap_or(0.0);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Inverse standard normal CDF (Acklam's rational approximation, relative
/// error below 1.2e-9). `None` outside `(0, 1)`.
#[must_use]
pub fn normal_quantile(p: f64) -> Option<f64> {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };
    let x = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };
    Some(x)
}
