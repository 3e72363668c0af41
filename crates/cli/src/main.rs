// kbnav CLI entry point. Works on the local knowledge base directly; no
// daemon required.

use std::path::PathBuf;
use std::process;

use anyhow::Context as _;
use clap::Parser;
use kbnav_daemon::config::KbnavConfig;
use kbnav_daemon::navigator::Navigator;
use tracing::{debug, info_span};

mod commands;
mod exit_code;
mod output;

use commands::Context;
use exit_code::ExitCode;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kbnav", about = "Browse and search a plain-text knowledge base")]
struct Cli {
    /// Config file; defaults to ./kbnav.toml, then the user config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force JSON output.
    #[arg(long, global = true)]
    json: bool,

    /// Log at the configured level instead of warnings only.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::detect(cli.json);

    match run(cli, format) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => {
            output::print_anyhow_error(format, &error);
            ExitCode::from_error(&error).into()
        }
    }
}

fn run(cli: Cli, format: OutputFormat) -> anyhow::Result<()> {
    let config = KbnavConfig::load(cli.config.as_deref()).context("failed to load config")?;

    let mut logging = config.logging.clone();
    if !cli.verbose {
        logging.level = "warn".into();
    }
    kbnav_daemon::logging::init(&logging)?;

    let navigator = Navigator::open(config.navigator_options(info_span!("navigator")))
        .context("failed to open knowledge base")?;
    let ctx = Context { navigator, format };

    let result = commands::run(cli.command, &ctx);
    ctx.navigator.close().context("failed to close knowledge base")?;
    debug!(ok = result.is_ok(), "command finished");
    result
}
