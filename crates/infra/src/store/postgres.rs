//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / other | N/A | `Backend` |
//!
//! Rows that fail to decode (unknown enum text, wrong column type) surface
//! as `Backend` errors rather than being skipped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use maintrack_auth::{Role, User};
use maintrack_core::{EquipmentId, UserId, WorkOrderId};
use maintrack_maintenance::{Equipment, WorkOrder, WorkOrderFilter};

use super::{CredentialStore, EquipmentStore, StoreError, StoreResult, WorkOrderStore};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Open a connection pool.
pub async fn connect(database_url: &str) -> StoreResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create tables and indexes if they do not exist yet.
#[instrument(skip(pool), err)]
pub async fn bootstrap(pool: &PgPool) -> StoreResult<()> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("bootstrap_schema", e))?;
    tracing::info!("database schema ready");
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Duplicate(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {operation}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

fn decode<T, E: core::fmt::Display>(column: &str, value: Result<T, E>) -> StoreResult<T> {
    value.map_err(|e| StoreError::Backend(format!("failed to decode column '{column}': {e}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

fn user_from_row(row: &PgRow) -> StoreResult<User> {
    let role: String = decode("role", row.try_get("role"))?;
    Ok(User {
        id: UserId::from_uuid(decode("id", row.try_get("id"))?),
        name: decode("name", row.try_get("name"))?,
        email: decode("email", row.try_get("email"))?,
        password_hash: decode("password_hash", row.try_get("password_hash"))?,
        role: decode("role", role.parse::<Role>())?,
        created_at: decode("created_at", row.try_get("created_at"))?,
        updated_at: decode("updated_at", row.try_get("updated_at"))?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;
        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> StoreResult<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        user_from_row(&row)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_users_by_ids", e))?;
        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::text IS NULL OR role = $1) ORDER BY created_at ASC, id ASC"
        ))
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))?;
        rows.iter().map(user_from_row).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Equipment
// ─────────────────────────────────────────────────────────────────────────────

const EQUIPMENT_COLUMNS: &str =
    "id, name, kind, status, last_maintenance_date, next_maintenance_date, created_at, updated_at";

fn equipment_from_row(row: &PgRow) -> StoreResult<Equipment> {
    let status: String = decode("status", row.try_get("status"))?;
    Ok(Equipment {
        id: EquipmentId::from_uuid(decode("id", row.try_get("id"))?),
        name: decode("name", row.try_get("name"))?,
        kind: decode("kind", row.try_get("kind"))?,
        status: decode("status", status.parse())?,
        last_maintenance_date: decode("last_maintenance_date", row.try_get("last_maintenance_date"))?,
        next_maintenance_date: decode("next_maintenance_date", row.try_get("next_maintenance_date"))?,
        created_at: decode("created_at", row.try_get("created_at"))?,
        updated_at: decode("updated_at", row.try_get("updated_at"))?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresEquipmentStore {
    pool: PgPool,
}

impl PostgresEquipmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for PostgresEquipmentStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<Equipment>> {
        let rows = sqlx::query(&format!(
            "SELECT {EQUIPMENT_COLUMNS} FROM equipment ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_equipment", e))?;
        rows.iter().map(equipment_from_row).collect()
    }

    #[instrument(skip(self), fields(equipment_id = %id), err)]
    async fn find_by_id(&self, id: EquipmentId) -> StoreResult<Option<Equipment>> {
        let row = sqlx::query(&format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_equipment", e))?;
        row.as_ref().map(equipment_from_row).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn find_by_ids(&self, ids: &[EquipmentId]) -> StoreResult<Vec<Equipment>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(&format!("SELECT {EQUIPMENT_COLUMNS} FROM equipment WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_equipment_by_ids", e))?;
        rows.iter().map(equipment_from_row).collect()
    }

    #[instrument(skip(self, equipment), fields(equipment_id = %equipment.id), err)]
    async fn insert(&self, equipment: Equipment) -> StoreResult<Equipment> {
        let row = sqlx::query(&format!(
            "INSERT INTO equipment ({EQUIPMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {EQUIPMENT_COLUMNS}"
        ))
        .bind(equipment.id.as_uuid())
        .bind(&equipment.name)
        .bind(&equipment.kind)
        .bind(equipment.status.as_str())
        .bind(equipment.last_maintenance_date)
        .bind(equipment.next_maintenance_date)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_equipment", e))?;
        equipment_from_row(&row)
    }

    #[instrument(skip(self, equipment), fields(equipment_id = %equipment.id), err)]
    async fn update(&self, equipment: Equipment) -> StoreResult<Option<Equipment>> {
        let row = sqlx::query(&format!(
            "UPDATE equipment SET name = $2, kind = $3, status = $4, last_maintenance_date = $5, \
             next_maintenance_date = $6, updated_at = $7 WHERE id = $1 RETURNING {EQUIPMENT_COLUMNS}"
        ))
        .bind(equipment.id.as_uuid())
        .bind(&equipment.name)
        .bind(&equipment.kind)
        .bind(equipment.status.as_str())
        .bind(equipment.last_maintenance_date)
        .bind(equipment.next_maintenance_date)
        .bind(equipment.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_equipment", e))?;
        row.as_ref().map(equipment_from_row).transpose()
    }

    #[instrument(skip(self), fields(equipment_id = %id), err)]
    async fn delete(&self, id: EquipmentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_equipment", e))?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Work orders
// ─────────────────────────────────────────────────────────────────────────────

const WORK_ORDER_COLUMNS: &str = "id, title, equipment_id, priority, status, assigned_technician, \
                                  description, due_date, created_at, updated_at";

fn work_order_from_row(row: &PgRow) -> StoreResult<WorkOrder> {
    let priority: String = decode("priority", row.try_get("priority"))?;
    let status: String = decode("status", row.try_get("status"))?;
    let technician: Option<Uuid> = decode("assigned_technician", row.try_get("assigned_technician"))?;
    let due_date: Option<DateTime<Utc>> = decode("due_date", row.try_get("due_date"))?;
    Ok(WorkOrder {
        id: WorkOrderId::from_uuid(decode("id", row.try_get("id"))?),
        title: decode("title", row.try_get("title"))?,
        equipment: EquipmentId::from_uuid(decode("equipment_id", row.try_get("equipment_id"))?),
        priority: decode("priority", priority.parse())?,
        status: decode("status", status.parse())?,
        assigned_technician: technician.map(UserId::from_uuid),
        description: decode("description", row.try_get("description"))?,
        due_date,
        created_at: decode("created_at", row.try_get("created_at"))?,
        updated_at: decode("updated_at", row.try_get("updated_at"))?,
    })
}

#[derive(Debug, Clone)]
pub struct PostgresWorkOrderStore {
    pool: PgPool,
}

impl PostgresWorkOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkOrderStore for PostgresWorkOrderStore {
    #[instrument(skip(self), err)]
    async fn list(&self, filter: &WorkOrderFilter) -> StoreResult<Vec<WorkOrder>> {
        let rows = sqlx::query(&format!(
            "SELECT {WORK_ORDER_COLUMNS} FROM work_orders \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR assigned_technician = $2) \
               AND ($3::timestamptz IS NULL OR created_at >= $3) \
               AND ($4::timestamptz IS NULL OR created_at <= $4) \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.technician.map(|t| *t.as_uuid()))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_work_orders", e))?;
        rows.iter().map(work_order_from_row).collect()
    }

    #[instrument(skip(self), fields(work_order_id = %id), err)]
    async fn find_by_id(&self, id: WorkOrderId) -> StoreResult<Option<WorkOrder>> {
        let row = sqlx::query(&format!("SELECT {WORK_ORDER_COLUMNS} FROM work_orders WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_work_order", e))?;
        row.as_ref().map(work_order_from_row).transpose()
    }

    #[instrument(skip(self, order), fields(work_order_id = %order.id), err)]
    async fn insert(&self, order: WorkOrder) -> StoreResult<WorkOrder> {
        let row = sqlx::query(&format!(
            "INSERT INTO work_orders ({WORK_ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {WORK_ORDER_COLUMNS}"
        ))
        .bind(order.id.as_uuid())
        .bind(&order.title)
        .bind(order.equipment.as_uuid())
        .bind(order.priority.as_str())
        .bind(order.status.as_str())
        .bind(order.assigned_technician.map(|t| *t.as_uuid()))
        .bind(&order.description)
        .bind(order.due_date)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_work_order", e))?;
        work_order_from_row(&row)
    }

    #[instrument(skip(self, order), fields(work_order_id = %order.id), err)]
    async fn update(&self, order: WorkOrder) -> StoreResult<Option<WorkOrder>> {
        let row = sqlx::query(&format!(
            "UPDATE work_orders SET title = $2, equipment_id = $3, priority = $4, status = $5, \
             assigned_technician = $6, description = $7, due_date = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {WORK_ORDER_COLUMNS}"
        ))
        .bind(order.id.as_uuid())
        .bind(&order.title)
        .bind(order.equipment.as_uuid())
        .bind(order.priority.as_str())
        .bind(order.status.as_str())
        .bind(order.assigned_technician.map(|t| *t.as_uuid()))
        .bind(&order.description)
        .bind(order.due_date)
        .bind(order.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_work_order", e))?;
        row.as_ref().map(work_order_from_row).transpose()
    }

    #[instrument(skip(self), fields(work_order_id = %id), err)]
    async fn delete(&self, id: WorkOrderId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_work_order", e))?;
        Ok(result.rows_affected() > 0)
    }
}
