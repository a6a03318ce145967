//! Infrastructure layer: record stores (in-memory and Postgres) and
//! configuration loading.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{
    CredentialStore, EquipmentStore, InMemoryCredentialStore, InMemoryEquipmentStore,
    InMemoryWorkOrderStore, StoreError, StoreResult, WorkOrderStore,
};
