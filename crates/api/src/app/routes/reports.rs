use std::sync::Arc;

use axum::{extract::Extension, routing::get, Json, Router};

use maintrack_auth::{Capability, Role};
use maintrack_maintenance::{MaintenanceSummary, TechnicianWorkload, WorkOrderFilter};

use crate::app::errors::{ApiError, OrInternal};
use crate::app::services::AppServices;
use crate::authz::guarded;

pub fn router() -> Router {
    Router::new()
        .route("/summary", guarded(get(summary), Capability::ViewSummary))
        .route("/workload", guarded(get(workload), Capability::ViewWorkload))
}

#[tracing::instrument(skip_all)]
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<MaintenanceSummary>, ApiError> {
    let equipment = services
        .equipment
        .list()
        .await
        .or_internal("Failed to build summary")?;
    let orders = services
        .work_orders
        .list(&WorkOrderFilter::default())
        .await
        .or_internal("Failed to build summary")?;
    Ok(Json(MaintenanceSummary::compute(&equipment, &orders)))
}

#[tracing::instrument(skip_all)]
pub async fn workload(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<TechnicianWorkload>>, ApiError> {
    let technicians = services
        .users
        .list(Some(Role::Technician))
        .await
        .or_internal("Failed to build workload")?;
    let orders = services
        .work_orders
        .list(&WorkOrderFilter::default())
        .await
        .or_internal("Failed to build workload")?;
    Ok(Json(TechnicianWorkload::compute(&technicians, &orders)))
}
