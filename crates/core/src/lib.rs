//! `maintrack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod patch;
pub mod time;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EquipmentId, UserId, WorkOrderId};
pub use time::{parse_date, FlexibleDate};
