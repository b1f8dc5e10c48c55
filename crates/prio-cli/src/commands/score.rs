use prio_core::entities::Labels;
use prio_core::lookup::TaskLookup;
use prio_scoring::{MethodOutcome, PriorityReport};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ScoreArgs;
use crate::commands::shared::tasks::TaskSet;
use crate::context::AppContext;
use crate::output::output_rows;
use crate::output::table::{Cell, TableRow};

/// One method's outcome, flattened for table output.
#[derive(Debug, Serialize)]
pub struct MethodRow {
    pub method: String,
    pub score: Option<f64>,
    pub normalized: Option<f64>,
    pub weight: Option<f64>,
    pub labels: Labels,
    pub error: Option<String>,
}

pub fn handle(args: &ScoreArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = ctx.analysis_config(&args.methods.methods);
    let orchestrator = ctx.orchestrator();

    let report = match &args.input {
        Some(path) => {
            let set = TaskSet::load(ctx, None, Some(path))?;
            let Some(task) = set.find(&args.id) else {
                anyhow::bail!("task {} not found in {}", args.id, path.display());
            };
            orchestrator.analyze(task, &config, Some(set.lookup(ctx)))
        }
        None => {
            let Some(task) = ctx.store.lookup(&args.id) else {
                anyhow::bail!("task {} not found in the store", args.id);
            };
            orchestrator.analyze(&task, &config, Some(&ctx.store))
        }
    };

    output_rows(&report, &method_rows(&report), flags.format)
}

impl TableRow for MethodRow {
    const HEADERS: &'static [&'static str] =
        &["method", "score", "normalized", "weight", "labels", "error"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Key(self.method.clone()),
            Cell::Number(self.score),
            Cell::Number(self.normalized),
            Cell::Number(self.weight),
            Cell::labels(&self.labels),
            Cell::Text(self.error.clone().unwrap_or_else(|| "-".to_string())),
        ]
    }
}

pub fn method_rows(report: &PriorityReport) -> Vec<MethodRow> {
    let aggregate = report.aggregate.as_ref();
    report
        .by_method
        .iter()
        .map(|(method, outcome)| {
            let normalized = aggregate.and_then(|a| a.per_method_norm.get(method).copied());
            let weight = aggregate.and_then(|a| a.weights.get(method).copied());
            match outcome {
                MethodOutcome::Scored { score, labels, .. } => MethodRow {
                    method: method.to_string(),
                    score: Some(*score),
                    normalized,
                    weight,
                    labels: labels.clone(),
                    error: None,
                },
                MethodOutcome::Failed { error } => MethodRow {
                    method: method.to_string(),
                    score: None,
                    normalized: None,
                    weight: None,
                    labels: Labels::new(),
                    error: Some(error.clone()),
                },
            }
        })
        .collect()
}
