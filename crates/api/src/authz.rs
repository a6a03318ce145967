//! Per-route role guard.
//!
//! Each guarded route is wrapped with [`require_capability`] carrying the
//! route's [`Capability`]; the role check itself lives in
//! `maintrack_auth::authorize`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};

use maintrack_auth::{authorize, Capability};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

/// Reject the request unless the authenticated caller's role may use
/// `capability`. Must run inside the auth middleware.
pub async fn require_capability(
    State(capability): State<Capability>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .ok_or(ApiError::Unauthenticated("Unauthorized"))?;

    if let Err(e) = authorize(principal.role(), capability) {
        tracing::warn!(user_id = %principal.user_id(), error = %e, "authorization denied");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Wrap a method router so it only runs for callers allowed `capability`.
pub fn guarded(route: MethodRouter, capability: Capability) -> MethodRouter {
    route.route_layer(axum::middleware::from_fn_with_state(
        capability,
        require_capability,
    ))
}
