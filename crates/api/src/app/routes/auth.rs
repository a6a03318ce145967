use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use maintrack_auth::{Credentials, PublicUser, Registration, User};
use maintrack_infra::StoreError;

use crate::app::dto::{self, ApiJson};
use crate::app::errors::{ApiError, OrInternal};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Signup and login: no token required.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[tracing::instrument(skip_all)]
pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::SignupRequest>,
) -> Result<Json<dto::AuthResponse>, ApiError> {
    let registration = Registration::parse(body.name, body.email, body.password, body.role.as_ref())?;

    let existing = services
        .users
        .find_by_email(&registration.email)
        .await
        .or_internal("Signup failed")?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let hash = services.hash_password(registration.password.clone()).await?;
    let user = User::register(&registration, hash, Utc::now());

    let user = match services.users.insert(user).await {
        Ok(user) => user,
        // Lost a race with a concurrent signup for the same email.
        Err(StoreError::Duplicate(_)) => return Err(ApiError::Conflict("Email already exists".to_string())),
        Err(e) => return Err(ApiError::internal("Signup failed", e)),
    };

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    session(&services, user.public_view(), "Signup failed")
}

#[tracing::instrument(skip_all)]
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> Result<Json<dto::AuthResponse>, ApiError> {
    let credentials = Credentials::parse(body.email, body.password)?;

    let Some(user) = services
        .users
        .find_by_email(&credentials.email)
        .await
        .or_internal("Login failed")?
    else {
        tracing::warn!("login failed: unknown email");
        return Err(ApiError::Unauthenticated("Invalid credentials"));
    };

    let valid = services
        .verify_password(credentials.password, user.password_hash.clone())
        .await?;
    if !valid {
        tracing::warn!(user_id = %user.id, "login failed: wrong password");
        return Err(ApiError::Unauthenticated("Invalid credentials"));
    }

    session(&services, user.public_view(), "Login failed")
}

pub async fn me(principal: Option<Extension<PrincipalContext>>) -> Result<Json<dto::MeResponse>, ApiError> {
    let Extension(principal) = principal.ok_or(ApiError::Unauthenticated("Unauthorized"))?;
    Ok(Json(dto::MeResponse {
        user: principal.into_user(),
    }))
}

fn session(
    services: &AppServices,
    user: PublicUser,
    failure: &'static str,
) -> Result<Json<dto::AuthResponse>, ApiError> {
    let token = services.issue_token(&user).or_internal(failure)?;
    Ok(Json(dto::AuthResponse { token, user }))
}
