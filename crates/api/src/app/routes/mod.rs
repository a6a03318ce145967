use axum::{routing::get, Router};

pub mod auth;
pub mod equipment;
pub mod reports;
pub mod system;
pub mod users;
pub mod work_orders;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/equipment", equipment::router())
        .nest("/workorders", work_orders::router())
        .nest("/users", users::router())
        .nest("/reports", reports::router())
}
