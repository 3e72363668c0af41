// Read-only HTTP API over the navigator. Everything but `/health` sits behind
// Basic auth.

pub mod auth;
pub mod error;
mod routes;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::navigator::Navigator;
pub use auth::Credentials;

#[derive(Clone)]
pub struct HttpState {
    navigator: Arc<Navigator>,
    credentials: Arc<Credentials>,
}

impl HttpState {
    pub fn new(navigator: Arc<Navigator>, credentials: Credentials) -> Self {
        Self { navigator, credentials: Arc::new(credentials) }
    }
}

pub fn router(state: HttpState) -> Router {
    let protected = Router::new()
        .route("/documents", get(routes::list_documents))
        .route("/documents/{*path}", get(routes::read_document))
        .route("/section", get(routes::read_section))
        .route("/search", get(routes::search))
        .route("/resources", get(routes::list_resources))
        .route("/resource", get(routes::read_resource))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.credentials),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: HttpState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("http listener has no local address")?;
    info!(listen_addr = %addr, "starting http api");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http api exited unexpectedly")
}
