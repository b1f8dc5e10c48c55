//! Tiered effort forecasting: PERT, then history, then a fallback estimate.
//!
//! The first applicable tier wins. A history tier that cannot produce a
//! forecast falls through to the fallback, which always succeeds.

use prio_core::config::EffortForecastConfig;
use prio_core::entities::{Details, Labels, Task};
use prio_core::enums::ForecastTier;
use prio_core::numeric::{pert_mean, pert_variance};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AnalyticsError;
use crate::series::{self, Series};
use crate::stats;

pub const LABEL: &str = "EFFORT_SRC";

/// Metadata keys searched for an effort history, in order.
pub const HISTORY_KEYS: [&str; 2] = ["history_efforts", "history"];

/// Used when `alpha` is out of range.
const Z_95: f64 = 1.959_963_984_540_054;

/// One projected step with its prediction interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub step: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortForecast {
    pub expected_effort: f64,
    pub variance: f64,
    pub tier: ForecastTier,
    /// `PERT`, `HIST_MA`, `OLS`, `AR1` or `FALLBACK`.
    pub method: String,
    /// Projected steps; empty outside the history tier.
    pub forecast: Vec<ForecastPoint>,
    pub details: Details,
}

impl EffortForecast {
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::from([(LABEL.to_string(), self.tier.as_str().to_string())])
    }
}

/// Forecast the effort of `task`.
#[must_use]
pub fn forecast(task: &Task, cfg: &EffortForecastConfig) -> EffortForecast {
    if let Some(pert) = pert_tier(task) {
        return pert;
    }
    match history_tier(task, cfg) {
        Ok(history) => return history,
        Err(e) => tracing::debug!(task_id = %task.id, reason = %e, "history tier skipped"),
    }
    fallback_tier(task, cfg)
}

fn pert_tier(task: &Task) -> Option<EffortForecast> {
    let (o, m, p) = task.metadata.pert_triplet("effort")?;
    let expected = pert_mean(o, m, p);
    if !expected.is_finite() {
        return None;
    }
    let mut details = Details::new();
    details.insert("pert".into(), json!({ "o": o, "m": m, "p": p }));
    Some(EffortForecast {
        expected_effort: expected,
        variance: pert_variance(o, p),
        tier: ForecastTier::Pert,
        method: "PERT".into(),
        forecast: Vec::new(),
        details,
    })
}

/// A fitted history model able to project `h` steps ahead.
struct Projection {
    method: &'static str,
    aic: Option<f64>,
    points: Vec<ForecastPoint>,
}

fn history_tier(
    task: &Task,
    cfg: &EffortForecastConfig,
) -> Result<EffortForecast, AnalyticsError> {
    let series = series::from_metadata(&task.metadata, &HISTORY_KEYS).truncated(cfg.max_series_len);
    let n = series.len();
    if n < cfg.min_points.max(1) {
        return Err(AnalyticsError::InsufficientData {
            model: "HISTORY",
            needed: cfg.min_points.max(1),
            got: n,
        });
    }

    let ys = series.ys();
    let window = cfg.ma_window.clamp(1, n);
    let variance = stats::population_variance(&ys);
    let z = stats::normal_quantile(1.0 - cfg.alpha / 2.0).unwrap_or(Z_95);
    let periods = cfg.forecast_periods.max(1);

    let baseline = moving_average_projection(&ys, window, variance, z, periods)?;
    let mut candidates = Vec::new();
    let mut model_errors = Vec::new();
    if cfg.use_models && n >= cfg.model_min_points {
        match ols_projection(&series, z, periods) {
            Ok(p) => candidates.push(p),
            Err(e) => model_errors.push(e.to_string()),
        }
        if cfg.use_ar && n >= cfg.ar_min_points {
            match ar1_projection(&ys, z, periods) {
                Ok(p) => candidates.push(p),
                Err(e) => model_errors.push(e.to_string()),
            }
        }
    }
    for e in &model_errors {
        tracing::debug!(task_id = %task.id, error = %e, "forecast model failed");
    }

    let chosen = candidates
        .into_iter()
        .filter(|p| p.aic.is_some_and(f64::is_finite))
        .min_by(|a, b| a.aic.unwrap_or(f64::INFINITY).total_cmp(&b.aic.unwrap_or(f64::INFINITY)))
        .unwrap_or(baseline);

    let expected = chosen.points.first().map_or(0.0, |p| p.mean);
    let mut details = Details::new();
    details.insert("n_points".into(), json!(n));
    details.insert("window".into(), json!(window));
    details.insert(
        "sma".into(),
        json!(stats::moving_average(&ys, window).last().copied()),
    );
    details.insert("ema".into(), json!(stats::ema(&ys, window)));
    details.insert("aic".into(), json!(chosen.aic));
    details.insert("alpha".into(), json!(cfg.alpha));
    if !model_errors.is_empty() {
        details.insert("model_errors".into(), json!(model_errors));
    }

    Ok(EffortForecast {
        expected_effort: expected,
        variance,
        tier: ForecastTier::History,
        method: chosen.method.into(),
        forecast: chosen.points,
        details,
    })
}

fn interval(step: usize, mean: f64, se: f64, z: f64) -> ForecastPoint {
    let mean = mean.max(0.0);
    ForecastPoint {
        step,
        mean,
        lower: z.mul_add(-se, mean).max(0.0),
        upper: z.mul_add(se, mean),
    }
}

fn moving_average_projection(
    ys: &[f64],
    window: usize,
    variance: f64,
    z: f64,
    periods: usize,
) -> Result<Projection, AnalyticsError> {
    let mean = stats::moving_average(ys, window)
        .last()
        .copied()
        .ok_or(AnalyticsError::InsufficientData {
            model: "HIST_MA",
            needed: 1,
            got: 0,
        })?;
    let se = variance.sqrt();
    Ok(Projection {
        method: "HIST_MA",
        aic: None,
        points: (1..=periods).map(|h| interval(h, mean, se, z)).collect(),
    })
}

#[allow(clippy::cast_precision_loss)]
fn ols_projection(series: &Series, z: f64, periods: usize) -> Result<Projection, AnalyticsError> {
    let line = stats::ols(&series.xs(), &series.ys())?;
    let last_x = series.points.last().map_or(0.0, |p| p.x);
    let step = series.step();
    let points = (1..=periods)
        .map(|h| {
            let x = step.mul_add(h as f64, last_x);
            interval(h, line.predict(x), line.prediction_se(x), z)
        })
        .collect();
    Ok(Projection {
        method: "OLS",
        aic: Some(line.aic()),
        points,
    })
}

fn ar1_projection(ys: &[f64], z: f64, periods: usize) -> Result<Projection, AnalyticsError> {
    let fit = stats::ar1(ys)?;
    Ok(Projection {
        method: "AR1",
        aic: Some(fit.aic()),
        points: (1..=periods)
            .map(|h| interval(h, fit.forecast(h), fit.forecast_se(h), z))
            .collect(),
    })
}

fn fallback_tier(task: &Task, cfg: &EffortForecastConfig) -> EffortForecast {
    // PERT was already ruled out, so this is field, metadata, an earlier
    // forecast, then default.
    let estimate = task.resolved_effort(false, cfg.default_effort);
    let mut details = Details::new();
    details.insert("fallback".into(), json!(estimate.value));
    details.insert("source".into(), json!(estimate.source.as_str()));
    EffortForecast {
        expected_effort: estimate.value,
        variance: 0.0,
        tier: ForecastTier::Fallback,
        method: "FALLBACK".into(),
        forecast: Vec::new(),
        details,
    }
}
