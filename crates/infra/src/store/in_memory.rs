//! In-memory stores for tests/dev.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use maintrack_auth::{Role, User};
use maintrack_core::entity::sort_newest_first;
use maintrack_core::{EquipmentId, UserId, WorkOrderId};
use maintrack_maintenance::{Equipment, WorkOrder, WorkOrderFilter};

use super::{CredentialStore, EquipmentStore, StoreError, StoreResult, WorkOrderStore};

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let map = read(&self.inner)?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut map = write(&self.inner)?;
        if map.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email '{}'", user.email)));
        }
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let map = read(&self.inner)?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn list(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let map = read(&self.inner)?;
        let mut users: Vec<User> = map
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Equipment
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryEquipmentStore {
    inner: RwLock<HashMap<EquipmentId, Equipment>>,
}

impl InMemoryEquipmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EquipmentStore for InMemoryEquipmentStore {
    async fn list(&self) -> StoreResult<Vec<Equipment>> {
        let mut all: Vec<Equipment> = read(&self.inner)?.values().cloned().collect();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn find_by_id(&self, id: EquipmentId) -> StoreResult<Option<Equipment>> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[EquipmentId]) -> StoreResult<Vec<Equipment>> {
        let map = read(&self.inner)?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn insert(&self, equipment: Equipment) -> StoreResult<Equipment> {
        let mut map = write(&self.inner)?;
        if map.contains_key(&equipment.id) {
            return Err(StoreError::Duplicate(format!("equipment {}", equipment.id)));
        }
        map.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn update(&self, equipment: Equipment) -> StoreResult<Option<Equipment>> {
        let mut map = write(&self.inner)?;
        match map.get_mut(&equipment.id) {
            Some(slot) => {
                *slot = equipment.clone();
                Ok(Some(equipment))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: EquipmentId) -> StoreResult<bool> {
        Ok(write(&self.inner)?.remove(&id).is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Work orders
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryWorkOrderStore {
    inner: RwLock<HashMap<WorkOrderId, WorkOrder>>,
}

impl InMemoryWorkOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkOrderStore for InMemoryWorkOrderStore {
    async fn list(&self, filter: &WorkOrderFilter) -> StoreResult<Vec<WorkOrder>> {
        let mut matching: Vec<WorkOrder> = read(&self.inner)?
            .values()
            .filter(|wo| filter.matches(wo))
            .cloned()
            .collect();
        sort_newest_first(&mut matching);
        Ok(matching)
    }

    async fn find_by_id(&self, id: WorkOrderId) -> StoreResult<Option<WorkOrder>> {
        Ok(read(&self.inner)?.get(&id).cloned())
    }

    async fn insert(&self, order: WorkOrder) -> StoreResult<WorkOrder> {
        let mut map = write(&self.inner)?;
        if map.contains_key(&order.id) {
            return Err(StoreError::Duplicate(format!("work order {}", order.id)));
        }
        map.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update(&self, order: WorkOrder) -> StoreResult<Option<WorkOrder>> {
        let mut map = write(&self.inner)?;
        match map.get_mut(&order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: WorkOrderId) -> StoreResult<bool> {
        Ok(write(&self.inner)?.remove(&id).is_some())
    }
}
