//! Process-wide service wiring: stores, token codec and password hasher.
//!
//! Built once at startup (in-memory or Postgres, depending on configuration)
//! and handed to every handler as `Extension<Arc<AppServices>>`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;

use maintrack_auth::{BcryptHasher, Hs256TokenCodec, PasswordHasher, PublicUser, TokenCodec, TokenError};
use maintrack_infra::store::postgres::{self, PostgresCredentialStore, PostgresEquipmentStore, PostgresWorkOrderStore};
use maintrack_infra::{
    AppConfig, CredentialStore, EquipmentStore, InMemoryCredentialStore, InMemoryEquipmentStore,
    InMemoryWorkOrderStore, StoreError, WorkOrderStore,
};
use maintrack_maintenance::{expand_work_orders, ReferenceIds, WorkOrder, WorkOrderView};

use crate::app::errors::{ApiError, OrInternal};

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn CredentialStore>,
    pub equipment: Arc<dyn EquipmentStore>,
    pub work_orders: Arc<dyn WorkOrderStore>,
    pub tokens: Arc<dyn TokenCodec>,
    pub hasher: Arc<dyn PasswordHasher>,
}

impl AppServices {
    /// In-memory stores; used for dev and tests.
    pub fn in_memory(tokens: Arc<dyn TokenCodec>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users: Arc::new(InMemoryCredentialStore::new()),
            equipment: Arc::new(InMemoryEquipmentStore::new()),
            work_orders: Arc::new(InMemoryWorkOrderStore::new()),
            tokens,
            hasher,
        }
    }

    /// Hash on the blocking pool so bcrypt never stalls the async workers.
    pub async fn hash_password(&self, password: String) -> Result<String, ApiError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .or_internal("Signup failed")?
            .or_internal("Signup failed")
    }

    pub async fn verify_password(&self, password: String, hash: String) -> Result<bool, ApiError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .or_internal("Login failed")?
            .or_internal("Login failed")
    }

    pub fn issue_token(&self, user: &PublicUser) -> Result<String, TokenError> {
        self.tokens.issue(user, Utc::now())
    }

    /// Resolve the equipment and technician references of `orders` with one
    /// batch lookup per store.
    pub async fn expand(&self, orders: Vec<WorkOrder>) -> Result<Vec<WorkOrderView>, StoreError> {
        let ids = ReferenceIds::collect(&orders);
        let equipment = if ids.equipment.is_empty() {
            Vec::new()
        } else {
            self.equipment.find_by_ids(&ids.equipment).await?
        };
        let users = if ids.users.is_empty() {
            Vec::new()
        } else {
            self.users.find_by_ids(&ids.users).await?
        };
        let users = users.iter().map(|u| u.summary()).collect();
        Ok(expand_work_orders(orders, equipment, users))
    }

    pub async fn expand_one(&self, order: WorkOrder) -> Result<WorkOrderView, StoreError> {
        self.expand(vec![order])
            .await?
            .pop()
            .ok_or_else(|| StoreError::Backend("work order expansion returned no rows".to_string()))
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    let tokens: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::with_ttl(
        config.jwt_secret.as_bytes(),
        Duration::minutes(config.token_ttl_minutes),
    ));
    let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost));

    // `AppConfig` guarantees a URL whenever persistent stores are requested.
    let database_url = match config.database_url.as_deref() {
        Some(url) if config.use_persistent_stores => url,
        _ => {
            tracing::info!("using in-memory stores");
            return Ok(AppServices::in_memory(tokens, hasher));
        }
    };
    let pool = postgres::connect(database_url).await?;
    postgres::bootstrap(&pool).await?;
    tracing::info!("using postgres stores");

    Ok(AppServices {
        users: Arc::new(PostgresCredentialStore::new(pool.clone())),
        equipment: Arc::new(PostgresEquipmentStore::new(pool.clone())),
        work_orders: Arc::new(PostgresWorkOrderStore::new(pool)),
        tokens,
        hasher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maintrack_maintenance::WorkOrderFilter;

    #[tokio::test]
    async fn database_url_alone_does_not_select_postgres() {
        let config = AppConfig {
            database_url: Some("postgres://127.0.0.1:1/unreachable".to_string()),
            use_persistent_stores: false,
            bcrypt_cost: 4,
            ..AppConfig::default()
        };

        let services = build_services(&config).await.unwrap();
        assert!(services.users.list(None).await.unwrap().is_empty());
        assert!(services
            .work_orders
            .list(&WorkOrderFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
