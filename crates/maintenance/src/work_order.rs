use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maintrack_core::patch::apply_nullable;
use maintrack_core::{DomainError, DomainResult, Entity, EquipmentId, UserId, WorkOrderId};

use crate::required;

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl core::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(DomainError::validation(format!("invalid priority '{other}'"))),
        }
    }
}

/// Lifecycle status of a work order. Any transition is allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl WorkOrderStatus {
    pub const ALL: [WorkOrderStatus; 4] = [
        WorkOrderStatus::Open,
        WorkOrderStatus::InProgress,
        WorkOrderStatus::Completed,
        WorkOrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "open",
            WorkOrderStatus::InProgress => "in_progress",
            WorkOrderStatus::Completed => "completed",
            WorkOrderStatus::Cancelled => "cancelled",
        }
    }
}

impl core::str::FromStr for WorkOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("invalid work order status '{s}'")))
    }
}

impl core::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of maintenance work raised against one piece of equipment.
///
/// References are held by id only. Neither reference is checked for
/// existence, and the technician reference is not checked against the
/// user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    #[serde(rename = "_id")]
    pub id: WorkOrderId,
    pub title: String,
    pub equipment: EquipmentId,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub assigned_technician: Option<UserId>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    pub fn create(draft: NewWorkOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: WorkOrderId::new(),
            title: draft.title,
            equipment: draft.equipment,
            priority: draft.priority.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            assigned_technician: draft.assigned_technician,
            description: draft.description,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update and bump `updated_at`.
    pub fn apply(&mut self, patch: WorkOrderPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(equipment) = patch.equipment {
            self.equipment = equipment;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        apply_nullable(&mut self.assigned_technician, patch.assigned_technician);
        apply_nullable(&mut self.description, patch.description);
        apply_nullable(&mut self.due_date, patch.due_date);
        self.updated_at = now;
    }
}

impl Entity for WorkOrder {
    type Id = WorkOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkOrder {
    pub title: String,
    pub equipment: EquipmentId,
    pub priority: Option<Priority>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_technician: Option<UserId>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewWorkOrder {
    /// Title and equipment are required.
    pub fn new(
        title: Option<String>,
        equipment: Option<EquipmentId>,
        priority: Option<Priority>,
        status: Option<WorkOrderStatus>,
        assigned_technician: Option<UserId>,
        description: Option<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        match (required(title), equipment) {
            (Some(title), Some(equipment)) => Ok(Self {
                title,
                equipment,
                priority,
                status,
                assigned_technician,
                description,
                due_date,
            }),
            _ => Err(DomainError::validation("Missing fields")),
        }
    }
}

/// Partial update for a work order. Nullable fields are tri-state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkOrderPatch {
    pub title: Option<String>,
    pub equipment: Option<EquipmentId>,
    pub priority: Option<Priority>,
    pub status: Option<WorkOrderStatus>,
    pub assigned_technician: Option<Option<UserId>>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl WorkOrderPatch {
    pub fn validate(self) -> DomainResult<Self> {
        if self.title.as_deref() == Some("") {
            return Err(DomainError::validation("title cannot be empty"));
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing filter
// ─────────────────────────────────────────────────────────────────────────────

/// Query filter for listing work orders. Every present criterion must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub technician: Option<UserId>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
}

impl WorkOrderFilter {
    pub fn matches(&self, order: &WorkOrder) -> bool {
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(technician) = self.technician {
            if order.assigned_technician != Some(technician) {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if order.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.created_to {
            if order.created_at > to {
                return false;
            }
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn order_at(created_at: DateTime<Utc>) -> WorkOrder {
        let draft = NewWorkOrder::new(
            Some("Replace seal".into()),
            Some(EquipmentId::new()),
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();
        WorkOrder::create(draft, created_at)
    }

    #[test]
    fn create_applies_defaults() {
        let wo = order_at(Utc::now());
        assert_eq!(wo.priority, Priority::Medium);
        assert_eq!(wo.status, WorkOrderStatus::Open);
        assert!(wo.assigned_technician.is_none());
    }

    #[test]
    fn create_requires_title_and_equipment() {
        let missing_equipment = NewWorkOrder::new(Some("t".into()), None, None, None, None, None, None);
        let empty_title =
            NewWorkOrder::new(Some(String::new()), Some(EquipmentId::new()), None, None, None, None, None);
        assert_eq!(missing_equipment.unwrap_err(), DomainError::validation("Missing fields"));
        assert_eq!(empty_title.unwrap_err(), DomainError::validation("Missing fields"));
    }

    #[test]
    fn any_status_transition_is_allowed() {
        let mut wo = order_at(Utc::now());
        for status in [WorkOrderStatus::Completed, WorkOrderStatus::Open, WorkOrderStatus::Cancelled] {
            wo.apply(
                WorkOrderPatch {
                    status: Some(status),
                    ..Default::default()
                },
                Utc::now(),
            );
            assert_eq!(wo.status, status);
        }
    }

    #[test]
    fn patch_can_unassign_technician() {
        let mut wo = order_at(Utc::now());
        wo.assigned_technician = Some(UserId::new());
        wo.description = Some("leaking".into());
        wo.apply(
            WorkOrderPatch {
                assigned_technician: Some(None),
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(wo.assigned_technician.is_none());
        assert_eq!(wo.description.as_deref(), Some("leaking"));
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let t = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let wo = order_at(t);
        let exact = WorkOrderFilter {
            created_from: Some(t),
            created_to: Some(t),
            ..Default::default()
        };
        assert!(exact.matches(&wo));

        let after = WorkOrderFilter {
            created_from: Some(t + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!after.matches(&wo));
    }

    #[test]
    fn filter_on_technician_requires_assignment() {
        let tech = UserId::new();
        let mut wo = order_at(Utc::now());
        let filter = WorkOrderFilter {
            technician: Some(tech),
            ..Default::default()
        };
        assert!(!filter.matches(&wo));
        wo.assigned_technician = Some(tech);
        assert!(filter.matches(&wo));
    }

    #[test]
    fn serializes_snake_case_enums_and_camel_case_fields() {
        let mut wo = order_at(Utc::now());
        wo.status = WorkOrderStatus::InProgress;
        let v = serde_json::to_value(&wo).unwrap();
        assert_eq!(v["status"], "in_progress");
        assert_eq!(v["priority"], "medium");
        assert!(v["assignedTechnician"].is_null());
        assert!(v["dueDate"].is_null());
    }

    proptest! {
        #[test]
        fn empty_filter_matches_everything(secs in 0i64..4_000_000_000) {
            let created = Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert!(WorkOrderFilter::default().matches(&order_at(created)));
        }

        #[test]
        fn status_filter_matches_only_that_status(a in 0usize..4, b in 0usize..4) {
            let mut wo = order_at(Utc::now());
            wo.status = WorkOrderStatus::ALL[a];
            let filter = WorkOrderFilter { status: Some(WorkOrderStatus::ALL[b]), ..Default::default() };
            prop_assert_eq!(filter.matches(&wo), a == b);
        }
    }
}
