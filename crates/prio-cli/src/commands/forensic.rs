use crate::cli::GlobalFlags;
use crate::cli::root_commands::ForensicArgs;
use crate::commands::shared::tasks::TaskSet;
use crate::context::AppContext;
use crate::output::output;

pub fn handle(args: &ForensicArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let history = TaskSet::load(ctx, args.project.as_deref(), args.input.as_deref())?;
    let report = ctx.aggregator().run_forensic(&history.tasks);
    tracing::debug!(
        records = history.tasks.len(),
        level = report.level.as_str(),
        "forensic review complete"
    );
    output(&report, flags.format)
}
