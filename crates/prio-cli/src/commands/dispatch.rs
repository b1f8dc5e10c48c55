use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Score(args) => commands::score::handle(&args, ctx, flags),
        Commands::Rank(args) => commands::rank::handle(&args, ctx, flags),
        Commands::Analyze(args) => commands::analyze::handle(&args, ctx, flags),
        Commands::Analytics(args) => commands::analytics::handle(&args, ctx, flags),
        Commands::Forensic(args) => commands::forensic::handle(&args, ctx, flags),
        Commands::Import(args) => commands::import::handle(&args, ctx, flags),
        Commands::Config(args) => commands::config::handle(&args, &ctx.config, flags),
    }
}
