use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;

use maintrack_auth::Capability;
use maintrack_core::WorkOrderId;
use maintrack_maintenance::{WorkOrder, WorkOrderView};

use crate::app::dto::{self, ApiJson, ApiQuery};
use crate::app::errors::{ApiError, OrInternal};
use crate::app::services::AppServices;
use crate::authz::guarded;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            guarded(get(list_work_orders), Capability::ListWorkOrders)
                .merge(guarded(post(create_work_order), Capability::CreateWorkOrder)),
        )
        .route(
            "/:id",
            guarded(put(update_work_order), Capability::UpdateWorkOrder)
                .merge(guarded(delete(delete_work_order), Capability::DeleteWorkOrder)),
        )
}

fn parse_id(raw: &str) -> Result<WorkOrderId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[tracing::instrument(skip_all)]
pub async fn list_work_orders(
    Extension(services): Extension<Arc<AppServices>>,
    ApiQuery(query): ApiQuery<dto::WorkOrderQuery>,
) -> Result<Json<Vec<WorkOrderView>>, ApiError> {
    let Some(filter) = query.into_filter()? else {
        return Ok(Json(Vec::new()));
    };

    let orders = services
        .work_orders
        .list(&filter)
        .await
        .or_internal("Failed to fetch work orders")?;
    let views = services
        .expand(orders)
        .await
        .or_internal("Failed to fetch work orders")?;
    Ok(Json(views))
}

/// References are stored as given; they are not checked for existence.
#[tracing::instrument(skip_all)]
pub async fn create_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::CreateWorkOrderRequest>,
) -> Result<(StatusCode, Json<WorkOrderView>), ApiError> {
    let draft = body.into_draft()?;
    let created = services
        .work_orders
        .insert(WorkOrder::create(draft, Utc::now()))
        .await
        .or_internal("Failed to create work order")?;

    tracing::info!(work_order_id = %created.id, equipment_id = %created.equipment, "work order created");
    let view = services
        .expand_one(created)
        .await
        .or_internal("Failed to create work order")?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(skip_all, fields(work_order_id = %id))]
pub async fn update_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateWorkOrderRequest>,
) -> Result<Json<WorkOrderView>, ApiError> {
    let id = parse_id(&id)?;
    let patch = body.into_patch()?;

    let Some(mut order) = services
        .work_orders
        .find_by_id(id)
        .await
        .or_internal("Failed to update work order")?
    else {
        return Err(ApiError::NotFound);
    };

    order.apply(patch, Utc::now());
    let updated = services
        .work_orders
        .update(order)
        .await
        .or_internal("Failed to update work order")?
        .ok_or(ApiError::NotFound)?;
    let view = services
        .expand_one(updated)
        .await
        .or_internal("Failed to update work order")?;
    Ok(Json(view))
}

#[tracing::instrument(skip_all, fields(work_order_id = %id))]
pub async fn delete_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<dto::SuccessResponse>, ApiError> {
    let id = parse_id(&id)?;
    let removed = services
        .work_orders
        .delete(id)
        .await
        .or_internal("Failed to delete work order")?;
    if !removed {
        return Err(ApiError::NotFound);
    }

    tracing::info!("work order deleted");
    Ok(Json(dto::SuccessResponse::ok()))
}
