//! Record stores for users, equipment and work orders.
//!
//! Each store is an async trait with an in-memory implementation (dev/test)
//! and a Postgres implementation. List operations return records newest
//! first, ties broken by id descending, except the user directory which is
//! returned oldest first.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use maintrack_auth::{Role, User};
use maintrack_core::{EquipmentId, UserId, WorkOrderId};
use maintrack_maintenance::{Equipment, WorkOrder, WorkOrderFilter};

pub use in_memory::{InMemoryCredentialStore, InMemoryEquipmentStore, InMemoryWorkOrderStore};
pub use postgres::{PostgresCredentialStore, PostgresEquipmentStore, PostgresWorkOrderStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a new user. Fails with [`StoreError::Duplicate`] if the email is taken.
    async fn insert(&self, user: User) -> StoreResult<User>;

    /// Batch lookup; ids that do not resolve are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// All users, optionally restricted to one role, oldest first.
    async fn list(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait EquipmentStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<Equipment>>;
    async fn find_by_id(&self, id: EquipmentId) -> StoreResult<Option<Equipment>>;
    async fn find_by_ids(&self, ids: &[EquipmentId]) -> StoreResult<Vec<Equipment>>;
    async fn insert(&self, equipment: Equipment) -> StoreResult<Equipment>;

    /// Replace a stored record. Returns `None` if the id no longer exists.
    async fn update(&self, equipment: Equipment) -> StoreResult<Option<Equipment>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: EquipmentId) -> StoreResult<bool>;
}

#[async_trait]
pub trait WorkOrderStore: Send + Sync {
    async fn list(&self, filter: &WorkOrderFilter) -> StoreResult<Vec<WorkOrder>>;
    async fn find_by_id(&self, id: WorkOrderId) -> StoreResult<Option<WorkOrder>>;
    async fn insert(&self, order: WorkOrder) -> StoreResult<WorkOrder>;
    async fn update(&self, order: WorkOrder) -> StoreResult<Option<WorkOrder>>;
    async fn delete(&self, id: WorkOrderId) -> StoreResult<bool>;
}
