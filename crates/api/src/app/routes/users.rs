use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::get,
    Json, Router,
};

use maintrack_auth::{Capability, UserSummary};

use crate::app::dto::{self, ApiQuery, RoleFilter};
use crate::app::errors::{ApiError, OrInternal};
use crate::app::services::AppServices;
use crate::authz::guarded;

pub fn router() -> Router {
    Router::new().route("/", guarded(get(list_users), Capability::ListUsers))
}

/// User directory, optionally restricted to one role. Never exposes hashes.
#[tracing::instrument(skip_all)]
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<dto::UsersQuery>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let role = match query.role_filter() {
        RoleFilter::All => None,
        RoleFilter::Only(role) => Some(role),
        RoleFilter::Nothing => return Ok(Json(Vec::new())),
    };

    let users = services
        .users
        .list(role)
        .await
        .or_internal("Failed to fetch users")?;
    Ok(Json(users.iter().map(|u| u.summary()).collect()))
}
