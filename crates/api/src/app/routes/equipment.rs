use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;

use maintrack_auth::Capability;
use maintrack_core::EquipmentId;
use maintrack_maintenance::{Equipment, EquipmentPatch};

use crate::app::dto::{self, ApiJson};
use crate::app::errors::{ApiError, OrInternal};
use crate::app::services::AppServices;
use crate::authz::guarded;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            guarded(get(list_equipment), Capability::ListEquipment)
                .merge(guarded(post(create_equipment), Capability::CreateEquipment)),
        )
        .route(
            "/:id",
            guarded(put(update_equipment), Capability::UpdateEquipment)
                .merge(guarded(delete(delete_equipment), Capability::DeleteEquipment)),
        )
}

/// Path ids that are not well-formed cannot name a record.
fn parse_id(raw: &str) -> Result<EquipmentId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

#[tracing::instrument(skip_all)]
pub async fn list_equipment(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<Equipment>>, ApiError> {
    let items = services
        .equipment
        .list()
        .await
        .or_internal("Failed to fetch equipment")?;
    Ok(Json(items))
}

#[tracing::instrument(skip_all)]
pub async fn create_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::CreateEquipmentRequest>,
) -> Result<(StatusCode, Json<Equipment>), ApiError> {
    let draft = body.into_draft()?;
    let created = services
        .equipment
        .insert(Equipment::create(draft, Utc::now()))
        .await
        .or_internal("Failed to create equipment")?;

    tracing::info!(equipment_id = %created.id, "equipment created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip_all, fields(equipment_id = %id))]
pub async fn update_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::UpdateEquipmentRequest>,
) -> Result<Json<Equipment>, ApiError> {
    let id = parse_id(&id)?;
    let patch: EquipmentPatch = body.into_patch()?;

    let Some(mut record) = services
        .equipment
        .find_by_id(id)
        .await
        .or_internal("Failed to update equipment")?
    else {
        return Err(ApiError::NotFound);
    };

    record.apply(patch, Utc::now());
    let updated = services
        .equipment
        .update(record)
        .await
        .or_internal("Failed to update equipment")?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated))
}

/// Work orders that reference the removed equipment are left as they are.
#[tracing::instrument(skip_all, fields(equipment_id = %id))]
pub async fn delete_equipment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<dto::SuccessResponse>, ApiError> {
    let id = parse_id(&id)?;
    let removed = services
        .equipment
        .delete(id)
        .await
        .or_internal("Failed to delete equipment")?;
    if !removed {
        return Err(ApiError::NotFound);
    }

    tracing::info!("equipment deleted");
    Ok(Json(dto::SuccessResponse::ok()))
}
