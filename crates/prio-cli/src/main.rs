use anyhow::Context;
use clap::Parser;
use prio_config::PrioConfig;

mod cli;
mod commands;
mod context;
mod output;
mod ui;

fn main() {
    if let Err(error) = run() {
        eprintln!("prio error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let config = PrioConfig::load_with_dotenv_from(flags.config.as_deref())
        .inspect_err(|error| {
            if let Some(key) = error.key() {
                tracing::debug!(key, "configuration rejected");
            }
        })
        .context("failed to load prio configuration")?;

    // `config` only reports; it must not create the data directory.
    if let cli::Commands::Config(args) = &cli.command {
        return commands::config::handle(args, &config, &flags);
    }

    let ctx = context::AppContext::init(config, flags.data_dir.as_deref())
        .context("failed to initialize prio application context")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PRIO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
