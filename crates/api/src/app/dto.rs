//! Request/response DTOs and the JSON body and query-string extractors.
//!
//! Request bodies reject unknown fields. Patch bodies distinguish an absent
//! field (left alone) from an explicit `null` (cleared, where the field is
//! optional).

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use maintrack_auth::{PublicUser, Role};
use maintrack_core::patch::double_option;
use maintrack_core::{parse_date, DomainError, EquipmentId, FlexibleDate, UserId};
use maintrack_maintenance::{
    EquipmentPatch, EquipmentStatus, NewEquipment, NewWorkOrder, Priority, WorkOrderFilter,
    WorkOrderPatch, WorkOrderStatus,
};

use crate::app::errors::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Extractor
// ─────────────────────────────────────────────────────────────────────────────

/// `Json<T>` whose rejections (bad JSON, wrong shape, unknown fields) become
/// 400 validation errors with the standard error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// `Query<T>` counterpart of [`ApiJson`]: a query string that does not fit
/// `T` (e.g. a repeated key) is a 400 with the standard error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::validation(rejection.body_text()))?;
        Ok(ApiQuery(value))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Kept raw: anything that is not a known role string becomes technician.
    #[serde(default)]
    pub role: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Equipment
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateEquipmentRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub last_maintenance_date: Option<FlexibleDate>,
    pub next_maintenance_date: Option<FlexibleDate>,
}

impl CreateEquipmentRequest {
    pub fn into_draft(self) -> Result<NewEquipment, ApiError> {
        Ok(NewEquipment::new(
            self.name,
            self.kind,
            self.status,
            self.last_maintenance_date.map(FlexibleDate::into_inner),
            self.next_maintenance_date.map(FlexibleDate::into_inner),
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateEquipmentRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "double_option")]
    pub kind: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<EquipmentStatus>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_maintenance_date: Option<Option<FlexibleDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub next_maintenance_date: Option<Option<FlexibleDate>>,
}

impl UpdateEquipmentRequest {
    pub fn into_patch(self) -> Result<EquipmentPatch, ApiError> {
        let patch = EquipmentPatch {
            name: not_null("name", self.name)?,
            kind: not_null("type", self.kind)?,
            status: not_null("status", self.status)?,
            last_maintenance_date: nullable_date(self.last_maintenance_date),
            next_maintenance_date: nullable_date(self.next_maintenance_date),
        };
        Ok(patch.validate()?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Work orders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateWorkOrderRequest {
    pub title: Option<String>,
    pub equipment: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_technician: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<FlexibleDate>,
}

impl CreateWorkOrderRequest {
    pub fn into_draft(self) -> Result<NewWorkOrder, ApiError> {
        let equipment = non_empty(self.equipment)
            .map(|raw| parse_ref::<EquipmentId>("equipment", &raw))
            .transpose()?;
        let technician = non_empty(self.assigned_technician)
            .map(|raw| parse_ref::<UserId>("assignedTechnician", &raw))
            .transpose()?;

        Ok(NewWorkOrder::new(
            self.title,
            equipment,
            self.priority,
            self.status,
            technician,
            self.description,
            self.due_date.map(FlexibleDate::into_inner),
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateWorkOrderRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub equipment: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<WorkOrderStatus>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_technician: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<FlexibleDate>>,
}

impl UpdateWorkOrderRequest {
    pub fn into_patch(self) -> Result<WorkOrderPatch, ApiError> {
        let equipment = match not_null("equipment", self.equipment)? {
            Some(raw) if raw.is_empty() => return Err(ApiError::validation("equipment cannot be empty")),
            Some(raw) => Some(parse_ref::<EquipmentId>("equipment", &raw)?),
            None => None,
        };
        // null or "" unassigns.
        let assigned_technician = match self.assigned_technician {
            None => None,
            Some(raw) => Some(
                non_empty(raw)
                    .map(|raw| parse_ref::<UserId>("assignedTechnician", &raw))
                    .transpose()?,
            ),
        };

        let patch = WorkOrderPatch {
            title: not_null("title", self.title)?,
            equipment,
            priority: not_null("priority", self.priority)?,
            status: not_null("status", self.status)?,
            assigned_technician,
            description: self.description,
            due_date: nullable_date(self.due_date),
        };
        Ok(patch.validate()?)
    }
}

/// Query string of `GET /workorders`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct WorkOrderQuery {
    pub status: Option<String>,
    pub technician: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl WorkOrderQuery {
    /// `Ok(None)` means the query can match nothing (an unknown status).
    pub fn into_filter(self) -> Result<Option<WorkOrderFilter>, ApiError> {
        let status = match non_empty(self.status) {
            None => None,
            Some(raw) => match raw.parse::<WorkOrderStatus>() {
                Ok(status) => Some(status),
                Err(_) => return Ok(None),
            },
        };
        let technician = non_empty(self.technician)
            .map(|raw| parse_ref::<UserId>("technician", &raw))
            .transpose()?;
        let created_from = non_empty(self.from).map(|raw| parse_date(&raw)).transpose()?;
        let created_to = non_empty(self.to).map(|raw| parse_date(&raw)).transpose()?;

        Ok(Some(WorkOrderFilter {
            status,
            technician,
            created_from,
            created_to,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub role: Option<String>,
}

/// Result of interpreting the `role` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    All,
    Only(Role),
    /// A role outside the known set; matches no user.
    Nothing,
}

impl UsersQuery {
    pub fn role_filter(&self) -> RoleFilter {
        match self.role.as_deref() {
            None | Some("") => RoleFilter::All,
            Some(raw) => raw.parse().map(RoleFilter::Only).unwrap_or(RoleFilter::Nothing),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn not_null<T>(field: &'static str, value: Option<Option<T>>) -> Result<Option<T>, ApiError> {
    match value {
        None => Ok(None),
        Some(Some(v)) => Ok(Some(v)),
        Some(None) => Err(ApiError::validation(format!("{field} cannot be null"))),
    }
}

fn nullable_date(
    value: Option<Option<FlexibleDate>>,
) -> Option<Option<chrono::DateTime<chrono::Utc>>> {
    value.map(|inner| inner.map(FlexibleDate::into_inner))
}

fn parse_ref<I>(field: &'static str, raw: &str) -> Result<I, ApiError>
where
    I: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<I>()
        .map_err(|_| ApiError::validation(format!("Invalid {field} id")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: serde::de::DeserializeOwned>(v: serde_json::Value) -> Result<T, serde_json::Error> {
        serde_json::from_value(v)
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse::<CreateEquipmentRequest>(json!({"name": "a", "type": "b", "colour": "red"})).is_err());
        assert!(parse::<LoginRequest>(json!({"email": "a", "password": "b", "remember": true})).is_err());
    }

    #[test]
    fn out_of_enum_values_are_rejected() {
        assert!(parse::<CreateEquipmentRequest>(json!({"name": "a", "type": "b", "status": "broken"})).is_err());
        assert!(parse::<CreateWorkOrderRequest>(json!({"title": "t", "priority": "urgent"})).is_err());
    }

    #[test]
    fn create_equipment_accepts_plain_dates() {
        let req: CreateEquipmentRequest =
            parse(json!({"name": "Pump", "type": "hydraulic", "nextMaintenanceDate": "2024-09-01"})).unwrap();
        let draft = req.into_draft().unwrap();
        assert_eq!(draft.next_maintenance_date.unwrap().to_rfc3339(), "2024-09-01T00:00:00+00:00");
    }

    #[test]
    fn create_work_order_without_equipment_is_missing_fields() {
        let req: CreateWorkOrderRequest = parse(json!({"title": "Fix"})).unwrap();
        assert!(matches!(req.into_draft(), Err(ApiError::Validation(m)) if m == "Missing fields"));
    }

    #[test]
    fn create_work_order_rejects_malformed_equipment_id() {
        let req: CreateWorkOrderRequest = parse(json!({"title": "Fix", "equipment": "pump-7"})).unwrap();
        assert!(matches!(req.into_draft(), Err(ApiError::Validation(m)) if m == "Invalid equipment id"));
    }

    #[test]
    fn equipment_patch_null_clears_dates_but_not_name() {
        let req: UpdateEquipmentRequest = parse(json!({"lastMaintenanceDate": null})).unwrap();
        assert_eq!(req.into_patch().unwrap().last_maintenance_date, Some(None));

        let req: UpdateEquipmentRequest = parse(json!({"name": null})).unwrap();
        assert!(req.into_patch().is_err());

        let req: UpdateEquipmentRequest = parse(json!({"type": ""})).unwrap();
        assert!(req.into_patch().is_err());
    }

    #[test]
    fn work_order_patch_unassigns_on_null_or_empty() {
        for raw in [json!({"assignedTechnician": null}), json!({"assignedTechnician": ""})] {
            let req: UpdateWorkOrderRequest = parse(raw).unwrap();
            assert_eq!(req.into_patch().unwrap().assigned_technician, Some(None));
        }
        let req: UpdateWorkOrderRequest = parse(json!({})).unwrap();
        assert_eq!(req.into_patch().unwrap(), WorkOrderPatch::default());
    }

    #[test]
    fn query_with_unknown_status_matches_nothing() {
        let q = WorkOrderQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(q.into_filter().unwrap().is_none());
    }

    #[test]
    fn query_parses_bounds_and_ignores_empty_values() {
        let q = WorkOrderQuery {
            status: Some(String::new()),
            technician: Some(String::new()),
            from: Some("2024-01-01".into()),
            to: Some("2024-01-31T23:59:59Z".into()),
        };
        let filter = q.into_filter().unwrap().unwrap();
        assert!(filter.status.is_none());
        assert!(filter.technician.is_none());
        assert!(filter.created_from.unwrap() < filter.created_to.unwrap());

        let bad = WorkOrderQuery {
            from: Some("last tuesday".into()),
            ..Default::default()
        };
        assert!(bad.into_filter().is_err());
    }

    #[test]
    fn role_filter_distinguishes_unknown_roles() {
        let q = |r: Option<&str>| UsersQuery { role: r.map(String::from) }.role_filter();
        assert_eq!(q(None), RoleFilter::All);
        assert_eq!(q(Some("")), RoleFilter::All);
        assert_eq!(q(Some("manager")), RoleFilter::Only(Role::Manager));
        assert_eq!(q(Some("admin")), RoleFilter::Nothing);
    }
}
