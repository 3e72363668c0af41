use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use kbnav_common::types::{Document, Resource, SearchResult, SectionRead};
use kbnav_common::KbError;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::ApiError;
use super::HttpState;
use crate::navigator::Navigator;

#[derive(Debug, Deserialize)]
pub(super) struct SectionQuery {
    path: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResourceQuery {
    uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct Health {
    status: &'static str,
    indexed: bool,
}

pub(super) async fn health(State(state): State<HttpState>) -> (StatusCode, Json<Health>) {
    (StatusCode::OK, Json(Health { status: "ok", indexed: state.navigator.is_indexed() }))
}

pub(super) async fn list_documents(
    State(state): State<HttpState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    blocking(&state, |navigator| Ok(navigator.list_documents())).await
}

pub(super) async fn read_document(
    State(state): State<HttpState>,
    Path(path): Path<String>,
) -> Result<Json<Document>, ApiError> {
    blocking(&state, move |navigator| navigator.read_document(&path)).await
}

pub(super) async fn read_section(
    State(state): State<HttpState>,
    Query(query): Query<SectionQuery>,
) -> Result<Json<SectionRead>, ApiError> {
    let path = required(query.path, "path")?;
    let title = required(query.title, "title")?;
    blocking(&state, move |navigator| navigator.read_section(&path, &title)).await
}

pub(super) async fn search(
    State(state): State<HttpState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchResult>>, ApiError> {
    let q = query.q.ok_or_else(|| KbError::InvalidQuery("missing query parameter: q".into()))?;
    let limit = query.limit;
    blocking(&state, move |navigator| navigator.search_documents(&q, limit)).await
}

pub(super) async fn list_resources(
    State(state): State<HttpState>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    blocking(&state, |navigator| Ok(navigator.list_resources())).await
}

pub(super) async fn read_resource(
    State(state): State<HttpState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<Document>, ApiError> {
    let uri = required(query.uri, "uri")?;
    blocking(&state, move |navigator| navigator.read_resource(&uri)).await
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("missing query parameter: {name}")))
}

/// Run a navigator call on the blocking pool.
async fn blocking<T, F>(state: &HttpState, call: F) -> Result<Json<T>, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Navigator) -> Result<T, KbError> + Send + 'static,
{
    let navigator = Arc::clone(&state.navigator);
    match tokio::task::spawn_blocking(move || call(&navigator)).await {
        Ok(result) => result.map(Json).map_err(ApiError::from),
        Err(join_error) => {
            error!(?join_error, "navigator task failed");
            Err(ApiError::internal("request handling failed"))
        }
    }
}
