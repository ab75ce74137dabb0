// src/api/auth.rs

use crate::api::{types::ErrorResponse, ApiState};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

/// Header for webhook senders that cannot set `Authorization`.
pub const TOKEN_HEADER: &str = "x-majlis-token";

/// Accept `Authorization: Bearer <token>` or `x-majlis-token: <token>`
/// when a token is configured; everything passes otherwise.
pub fn check_auth(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let Some(expected) = state.token.as_deref() else {
        return Ok(());
    };

    let presented = presented_token(headers).unwrap_or_default();
    if tokens_match(presented.as_bytes(), expected.as_bytes()) {
        return Ok(());
    }

    tracing::debug!("Rejected request with missing or wrong token");
    Err((
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Invalid or missing token".into(),
        }),
    ))
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    header("authorization")
        .and_then(|v| v.strip_prefix("Bearer "))
        .or_else(|| header(TOKEN_HEADER))
        .map(str::trim)
}

/// Compares every byte so timing does not reveal the matching prefix.
fn tokens_match(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
