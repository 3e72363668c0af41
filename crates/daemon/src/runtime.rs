use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn};

use crate::config::KbnavConfig;
use crate::http::{self, Credentials, HttpState};
use crate::navigator::Navigator;
use crate::rpc::methods::RpcServerState;
use crate::rpc::stream::{serve_stdio, serve_tcp_until_shutdown};

/// A running daemon: HTTP API plus the optional TCP JSON-RPC listener.
pub struct DaemonHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<Result<()>>>,
    http_addr: SocketAddr,
    rpc_addr: Option<SocketAddr>,
}

impl DaemonHandle {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_addr
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Wait for the listeners to drain and the navigator to close.
    pub async fn wait(mut self) -> Result<()> {
        match self.task.take() {
            Some(task) => task.await.context("daemon task panicked")?,
            None => Ok(()),
        }
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Run until Ctrl-C or SIGTERM.
pub async fn run(config: KbnavConfig) -> Result<()> {
    let handle = start(&config).await?;
    let shutdown_tx = handle.shutdown_tx.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });
    handle.wait().await
}

/// Serve JSON-RPC over stdin/stdout until stdin closes. No HTTP.
pub async fn run_stdio(config: KbnavConfig) -> Result<()> {
    let navigator = open_navigator(&config).await?;
    let result = serve_stdio(RpcServerState::new(Arc::clone(&navigator))).await;
    close_navigator(navigator);
    result
}

pub async fn start(config: &KbnavConfig) -> Result<DaemonHandle> {
    if config.http.password.is_empty() {
        bail!("refusing to start the http api without a password (set KBNAV_PASSWORD)");
    }

    let http_listener = TcpListener::bind(&config.http.addr)
        .await
        .with_context(|| format!("failed to bind http listener on {}", config.http.addr))?;
    let rpc_listener = match &config.rpc.addr {
        Some(addr) => Some(
            TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind rpc listener on {addr}"))?,
        ),
        None => None,
    };

    let http_addr = http_listener.local_addr().context("http listener has no local address")?;
    let rpc_addr = rpc_listener
        .as_ref()
        .map(TcpListener::local_addr)
        .transpose()
        .context("rpc listener has no local address")?;

    let navigator = open_navigator(config).await?;
    let http_state = HttpState::new(
        Arc::clone(&navigator),
        Credentials::new(&config.http.username, &config.http.password),
    );
    let rpc_state = RpcServerState::new(Arc::clone(&navigator));

    let (shutdown_tx, _) = broadcast::channel(4);
    let mut http_shutdown = shutdown_tx.subscribe();
    let rpc_shutdown = shutdown_tx.subscribe();

    let task = tokio::spawn(async move {
        let http = http::serve(http_listener, http_state, async move {
            let _ = http_shutdown.recv().await;
        });
        let rpc = async move {
            match rpc_listener {
                Some(listener) => serve_tcp_until_shutdown(listener, rpc_state, rpc_shutdown).await,
                None => Ok(()),
            }
        };

        let result = tokio::try_join!(http, rpc).map(|_| ());
        close_navigator(navigator);
        result
    });

    info!(%http_addr, rpc_addr = ?rpc_addr, "kbnav daemon started");
    Ok(DaemonHandle { shutdown_tx, task: Some(task), http_addr, rpc_addr })
}

async fn open_navigator(config: &KbnavConfig) -> Result<Arc<Navigator>> {
    let options = config.navigator_options(info_span!("navigator"));
    let reindex = config.search.reindex_on_start;

    let navigator = tokio::task::spawn_blocking(move || -> Result<Navigator> {
        let navigator = Navigator::open(options).context("failed to open knowledge base")?;
        if reindex && navigator.is_indexed() {
            let report = navigator.reindex().context("initial reindex failed")?;
            info!(
                indexed = report.indexed,
                removed = report.removed,
                failed = report.failed,
                "initial reindex finished"
            );
        }
        Ok(navigator)
    })
    .await
    .context("navigator startup task panicked")??;

    Ok(Arc::new(navigator))
}

/// Close the navigator if this was the last reference. A connection task
/// still holding one keeps the index open until it drops.
fn close_navigator(navigator: Arc<Navigator>) {
    match Arc::try_unwrap(navigator) {
        Ok(navigator) => {
            if let Err(error) = navigator.close() {
                warn!(%error, "failed to close navigator");
            }
        }
        Err(_) => warn!("navigator still in use at shutdown; index closes when it drops"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
