//! Trend detection over a task's `history` series.

use prio_core::config::TrendConfig;
use prio_core::entities::{Details, Labels, Task};
use prio_core::enums::TrendDirection;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AnalyticsError;
use crate::series::{self, Series};
use crate::stats;

pub const LABEL: &str = "TREND";

/// Metadata key holding the observed series.
pub const SERIES_KEY: &str = "history";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    /// Trend strength in `[0, 1]`.
    pub score: f64,
    pub direction: TrendDirection,
    pub n_points: usize,
    /// OLS slope in value per day (per step for untimed series).
    pub slope: Option<f64>,
    /// Lowest-AIC model when model competition ran.
    pub model: Option<String>,
    /// That model's one-step-ahead forecast.
    pub forecast: Option<f64>,
    pub details: Details,
}

impl TrendReport {
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::from([(LABEL.to_string(), self.direction.as_str().to_string())])
    }

    fn flat(n_points: usize, reason: &str) -> Self {
        let mut details = Details::new();
        details.insert("n_points".into(), json!(n_points));
        details.insert("reason".into(), json!(reason));
        Self {
            score: 0.0,
            direction: TrendDirection::Flat,
            n_points,
            slope: None,
            model: None,
            forecast: None,
            details,
        }
    }
}

/// A fitted candidate competing on AIC.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    model: &'static str,
    aic: f64,
    forecast: f64,
}

/// Direction and strength of the trend in `task.metadata["history"]`.
///
/// Too few points, or timestamps that collapse to one instant, give a neutral
/// FLAT report with score 0.
#[must_use]
pub fn analyze(task: &Task, cfg: &TrendConfig) -> TrendReport {
    let series = series::from_metadata(&task.metadata, &[SERIES_KEY]).truncated(cfg.max_series_len);
    let n = series.len();
    if n < cfg.min_points.max(2) {
        return TrendReport::flat(n, "insufficient_points");
    }

    let xs = series.xs();
    let ys = series.ys();
    let line = match stats::ols(&xs, &ys) {
        Ok(line) => line,
        Err(e) => {
            tracing::debug!(task_id = %task.id, error = %e, "trend fit failed");
            return TrendReport::flat(n, "degenerate_series");
        }
    };

    #[allow(clippy::cast_precision_loss)]
    let avg_abs_y = ys.iter().map(|y| y.abs()).sum::<f64>() / n as f64;
    let strength = if avg_abs_y > 1e-6 {
        (line.slope.abs() * cfg.strength_horizon_days / avg_abs_y).min(1.0)
    } else {
        0.0
    };
    let direction = TrendDirection::from_slope(line.slope);

    let mut details = Details::new();
    details.insert("n_points".into(), json!(n));
    details.insert("a".into(), json!(line.intercept));
    details.insert("b".into(), json!(line.slope));
    details.insert("avg_y".into(), json!(avg_abs_y));
    details.insert("direction".into(), json!(direction.as_str()));
    details.insert("timestamped".into(), json!(series.timestamped));

    let mut model = None;
    let mut forecast = None;
    if cfg.use_models && n >= cfg.model_min_points {
        let (candidates, errors) = fit_candidates(&series, &line, cfg);
        if let Some(best) = candidates.iter().min_by(|a, b| a.aic.total_cmp(&b.aic)) {
            model = Some(best.model.to_string());
            forecast = Some(best.forecast);
        }
        details.insert(
            "models".into(),
            candidates
                .iter()
                .map(|c| json!({ "model": c.model, "aic": c.aic, "forecast": c.forecast }))
                .collect(),
        );
        if !errors.is_empty() {
            details.insert("model_errors".into(), json!(errors));
        }
    }

    TrendReport {
        score: strength,
        direction,
        n_points: n,
        slope: Some(line.slope),
        model,
        forecast,
        details,
    }
}

fn fit_candidates(
    series: &Series,
    line: &stats::LinearFit,
    cfg: &TrendConfig,
) -> (Vec<Candidate>, Vec<String>) {
    let ys = series.ys();
    let next_x = series.points.last().map_or(0.0, |p| p.x) + series.step();
    let mut candidates = vec![Candidate {
        model: "OLS",
        aic: line.aic(),
        forecast: line.predict(next_x),
    }];
    let mut errors = Vec::new();

    let mut push = |fit: Result<Candidate, AnalyticsError>| match fit {
        Ok(c) if c.aic.is_finite() && c.forecast.is_finite() => candidates.push(c),
        Ok(c) => errors.push(format!("{} produced a non-finite result", c.model)),
        Err(e) => errors.push(e.to_string()),
    };

    push(stats::holt(&ys).map(|fit| Candidate {
        model: "HOLT",
        aic: fit.aic(),
        forecast: fit.forecast(1),
    }));
    if cfg.use_ar && ys.len() >= cfg.ar_min_points {
        push(stats::ar1(&ys).map(|fit| Candidate {
            model: "AR1",
            aic: fit.aic(),
            forecast: fit.forecast(1),
        }));
    }
    (candidates, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn task_with(history: serde_json::Value) -> Task {
        Task::new("t", "p", "x").with_meta(SERIES_KEY, history)
    }

    #[test]
    fn too_few_points_is_flat() {
        let report = analyze(&task_with(json!([1, 2])), &TrendConfig::default());
        assert_eq!(report.direction, TrendDirection::Flat);
        assert_eq!(report.score, 0.0);
        assert_eq!(report.details["reason"], "insufficient_points");
        assert_eq!(report.labels()[LABEL], "FLAT");
    }

    #[test]
    fn rising_daily_series_is_up() {
        let history = json!([
            {"ts": "2024-01-01", "value": 10},
            {"ts": "2024-01-02", "value": 11},
            {"ts": "2024-01-03", "value": 12},
        ]);
        let report = analyze(&task_with(history), &TrendConfig::default());
        assert_eq!(report.direction, TrendDirection::Up);
        // |b| * 30 / mean|y| = 30 / 11, clamped.
        assert_eq!(report.score, 1.0);
        assert!((report.slope.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gentle_decline_has_partial_strength() {
        let report = analyze(&task_with(json!([100, 99, 98, 97])), &TrendConfig::default());
        assert_eq!(report.direction, TrendDirection::Down);
        assert!((report.score - 30.0 / 98.5).abs() < 1e-9);
    }

    #[test]
    fn constant_series_is_flat_with_zero_strength() {
        let report = analyze(&task_with(json!([5, 5, 5, 5])), &TrendConfig::default());
        assert_eq!(report.direction, TrendDirection::Flat);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn identical_timestamps_are_degenerate() {
        let history = json!([["2024-01-01", 1], ["2024-01-01", 2], ["2024-01-01", 3]]);
        let report = analyze(&task_with(history), &TrendConfig::default());
        assert_eq!(report.details["reason"], "degenerate_series");
    }

    #[test]
    fn models_compete_on_long_series() {
        let ys: Vec<f64> = (0..12).map(|i| f64::from(i).mul_add(2.0, 1.0)).collect();
        let report = analyze(&task_with(json!(ys)), &TrendConfig::default());
        let model = report.model.unwrap();
        assert!(["OLS", "HOLT", "AR1"].contains(&model.as_str()));
        assert!((report.forecast.unwrap() - 25.0).abs() < 1e-6);
        assert!(report.details["models"].as_array().unwrap().len() >= 2);
    }

    #[test]
    fn models_can_be_disabled() {
        let cfg = TrendConfig {
            use_models: false,
            ..TrendConfig::default()
        };
        let ys: Vec<f64> = (0..12).map(f64::from).collect();
        let report = analyze(&task_with(json!(ys)), &cfg);
        assert!(report.model.is_none());
        assert!(!report.details.contains_key("models"));
    }
}
