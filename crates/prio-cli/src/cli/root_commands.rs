use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Score one task with every configured method.
    Score(ScoreArgs),
    /// Rank tasks by aggregate priority score.
    Rank(RankArgs),
    /// Score a stored project, write labels back and save the analysis.
    Analyze(AnalyzeArgs),
    /// Trend, risk, dependency and effort analytics.
    Analytics(AnalyticsArgs),
    /// Review completed tasks for estimation misses and blockers.
    Forensic(ForensicArgs),
    /// Import tasks from a JSON array or JSONL file into the store.
    Import(ImportArgs),
    /// Show the effective configuration.
    Config(ConfigArgs),
}

/// Overrides `analysis.methods` for one run.
#[derive(Clone, Debug, Default, Args)]
pub struct MethodArgs {
    /// Comma-separated method names (e.g. RICE,WSJF)
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ScoreArgs {
    /// Task id
    pub id: String,
    /// Read tasks from this file instead of the store
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub methods: MethodArgs,
}

#[derive(Clone, Debug, Args)]
pub struct RankArgs {
    /// Stored project id
    #[arg(required_unless_present = "input")]
    pub project: Option<String>,
    /// Read tasks from this file instead of the store
    #[arg(long, conflicts_with = "project")]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub methods: MethodArgs,
}

#[derive(Clone, Debug, Args)]
pub struct AnalyzeArgs {
    /// Stored project id
    pub project: String,
    #[command(flatten)]
    pub methods: MethodArgs,
}

#[derive(Clone, Debug, Args)]
pub struct AnalyticsArgs {
    /// Stored project id
    #[arg(required_unless_present = "input")]
    pub project: Option<String>,
    /// Read tasks from this file instead of the store
    #[arg(long, conflicts_with = "project")]
    pub input: Option<PathBuf>,
    /// Analyze only this task
    #[arg(long)]
    pub task: Option<String>,
    /// Completed-task history for forensic analysis
    #[arg(long)]
    pub history: Option<PathBuf>,
    /// Write forecast, risk and dependency results back into task metadata
    #[arg(long, conflicts_with = "input")]
    pub annotate: bool,
}

#[derive(Clone, Debug, Args)]
pub struct ForensicArgs {
    /// Stored project whose tasks form the history
    #[arg(required_unless_present = "input")]
    pub project: Option<String>,
    /// History file (JSON array or JSONL)
    #[arg(long, conflicts_with = "project")]
    pub input: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// JSON array or JSONL file of tasks
    pub file: PathBuf,
    /// Assign every imported task to this project
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ConfigArgs {
    /// Print as TOML instead of the selected output format
    #[arg(long)]
    pub toml: bool,
}
