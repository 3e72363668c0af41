use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use super::error::ApiError;

/// The single username/password pair the HTTP API accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_eq(&self.username, username);
        let password_ok = constant_time_eq(&self.password, password);
        username_ok & password_ok
    }
}

/// Byte-wise comparison that does not stop at the first difference.
fn constant_time_eq(expected: &str, actual: &str) -> bool {
    let diff = expected
        .bytes()
        .zip(actual.bytes())
        .fold(0u8, |acc, (left, right)| acc | (left ^ right));
    expected.len() == actual.len() && diff == 0
}

pub async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    request: Request,
    next: Next,
) -> Response {
    let Some((username, password)) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic)
    else {
        return ApiError::unauthorized("missing or malformed basic credentials").into_response();
    };

    if !credentials.matches(&username, &password) {
        warn!(%username, uri = %request.uri(), "rejected http credentials");
        return ApiError::unauthorized("invalid credentials").into_response();
    }

    next.run(request).await
}

/// Decode `Basic <base64(user:pass)>` into its two halves.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// `Authorization` header value for the given pair.
pub fn basic_header_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
