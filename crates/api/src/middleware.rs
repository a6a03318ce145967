use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use maintrack_auth::TokenCodec;

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenCodec>,
}

/// Require a valid bearer token and attach the caller to the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let claims = state.tokens.verify(token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "rejected bearer token");
        ApiError::InvalidToken
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.into_user()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = match headers.get(AUTHORIZATION) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ApiError::Unauthenticated("No token provided")),
    };

    let header = header
        .to_str()
        .map_err(|_| ApiError::Unauthenticated("Invalid auth header"))?;

    // Exactly "Bearer <token>": one space, no extra segments.
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(*token),
        _ => Err(ApiError::Unauthenticated("Invalid auth header")),
    }
}
