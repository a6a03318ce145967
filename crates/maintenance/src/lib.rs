//! Maintenance domain module (equipment, work orders, reporting).
//!
//! This crate contains the record types and lifecycle rules for maintainable
//! assets and the work orders raised against them, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod equipment;
pub mod expansion;
pub mod reports;
pub mod work_order;

pub use equipment::{Equipment, EquipmentPatch, EquipmentStatus, NewEquipment};
pub use expansion::{expand_work_orders, ReferenceIds, WorkOrderView};
pub use reports::{
    EquipmentStatusCounts, MaintenanceSummary, TechnicianWorkload, WorkOrderStatusCounts,
};
pub use work_order::{NewWorkOrder, Priority, WorkOrder, WorkOrderFilter, WorkOrderPatch, WorkOrderStatus};

/// Keep a required string field only if it is present and non-empty.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
