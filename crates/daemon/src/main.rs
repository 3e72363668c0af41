// kbnavd: HTTP API plus JSON-RPC over TCP, or JSON-RPC over stdio.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kbnav_daemon::config::KbnavConfig;
use tracing::info;

#[derive(Parser)]
#[command(name = "kbnavd", about = "Read-only knowledge base navigator daemon")]
struct Args {
    /// Config file; defaults to ./kbnav.toml, then the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serve JSON-RPC on stdin/stdout instead of the network listeners.
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = KbnavConfig::load(args.config.as_deref()).context("failed to load config")?;
    kbnav_daemon::logging::init(&config.logging)?;

    if args.stdio {
        info!("starting kbnav stdio rpc");
        return kbnav_daemon::runtime::run_stdio(config)
            .await
            .context("stdio rpc terminated unexpectedly");
    }

    info!(roots = ?config.kb.roots, "starting kbnav daemon");
    kbnav_daemon::runtime::run(config).await.context("daemon terminated unexpectedly")
}
