//! Dashboard aggregates over equipment and work orders.

use serde::Serialize;

use maintrack_auth::{Role, User};
use maintrack_core::UserId;

use crate::{Equipment, EquipmentStatus, WorkOrder, WorkOrderStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EquipmentStatusCounts {
    pub total: u64,
    pub operational: u64,
    pub maintenance_due: u64,
    pub down: u64,
}

impl EquipmentStatusCounts {
    fn record(&mut self, status: EquipmentStatus) {
        self.total += 1;
        match status {
            EquipmentStatus::Operational => self.operational += 1,
            EquipmentStatus::MaintenanceDue => self.maintenance_due += 1,
            EquipmentStatus::Down => self.down += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkOrderStatusCounts {
    pub total: u64,
    pub open: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
}

impl WorkOrderStatusCounts {
    fn record(&mut self, status: WorkOrderStatus) {
        self.total += 1;
        match status {
            WorkOrderStatus::Open => self.open += 1,
            WorkOrderStatus::InProgress => self.in_progress += 1,
            WorkOrderStatus::Completed => self.completed += 1,
            WorkOrderStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Fleet-wide status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceSummary {
    pub equipment: EquipmentStatusCounts,
    pub work_orders: WorkOrderStatusCounts,
}

impl MaintenanceSummary {
    pub fn compute(equipment: &[Equipment], work_orders: &[WorkOrder]) -> Self {
        let mut summary = Self::default();
        for e in equipment {
            summary.equipment.record(e.status);
        }
        for wo in work_orders {
            summary.work_orders.record(wo.status);
        }
        summary
    }
}

/// Assigned work per technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianWorkload {
    pub technician_id: UserId,
    pub name: String,
    #[serde(flatten)]
    pub counts: WorkOrderStatusCounts,
}

impl TechnicianWorkload {
    /// One row per technician-role user, including those with nothing
    /// assigned, ordered by name then id. Orders assigned to users who are not
    /// technicians are ignored.
    pub fn compute(users: &[User], work_orders: &[WorkOrder]) -> Vec<Self> {
        let mut rows: Vec<Self> = users
            .iter()
            .filter(|u| u.role == Role::Technician)
            .map(|u| Self {
                technician_id: u.id,
                name: u.name.clone(),
                counts: WorkOrderStatusCounts::default(),
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.technician_id.cmp(&b.technician_id)));

        for wo in work_orders {
            let Some(tech) = wo.assigned_technician else { continue };
            if let Some(row) = rows.iter_mut().find(|r| r.technician_id == tech) {
                row.counts.record(wo.status);
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewEquipment, NewWorkOrder};
    use chrono::Utc;
    use maintrack_auth::Registration;
    use maintrack_core::EquipmentId;

    fn user(name: &str, role: &str) -> User {
        let reg = Registration::parse(
            Some(name.into()),
            Some(format!("{name}@plant.test")),
            Some("pw".into()),
            Some(&serde_json::json!(role)),
        )
        .unwrap();
        User::register(&reg, "hash".into(), Utc::now())
    }

    fn order(status: WorkOrderStatus, tech: Option<UserId>) -> WorkOrder {
        let draft = NewWorkOrder::new(
            Some("Job".into()),
            Some(EquipmentId::new()),
            None,
            Some(status),
            tech,
            None,
            None,
        )
        .unwrap();
        WorkOrder::create(draft, Utc::now())
    }

    #[test]
    fn summary_counts_each_status() {
        let down = Equipment::create(
            NewEquipment::new(Some("A".into()), Some("t".into()), Some(EquipmentStatus::Down), None, None).unwrap(),
            Utc::now(),
        );
        let ok = Equipment::create(
            NewEquipment::new(Some("B".into()), Some("t".into()), None, None, None).unwrap(),
            Utc::now(),
        );
        let orders = vec![
            order(WorkOrderStatus::Open, None),
            order(WorkOrderStatus::Open, None),
            order(WorkOrderStatus::Completed, None),
        ];

        let summary = MaintenanceSummary::compute(&[down, ok], &orders);
        assert_eq!(summary.equipment.total, 2);
        assert_eq!(summary.equipment.down, 1);
        assert_eq!(summary.equipment.operational, 1);
        assert_eq!(summary.work_orders.open, 2);
        assert_eq!(summary.work_orders.completed, 1);
        assert_eq!(summary.work_orders.total, 3);

        let v = serde_json::to_value(summary).unwrap();
        assert_eq!(v["workOrders"]["in_progress"], 0);
        assert_eq!(v["equipment"]["maintenance_due"], 0);
    }

    #[test]
    fn workload_lists_technicians_by_name() {
        let zed = user("zed", "technician");
        let amy = user("amy", "technician");
        let boss = user("boss", "manager");
        let orders = vec![
            order(WorkOrderStatus::Open, Some(zed.id)),
            order(WorkOrderStatus::InProgress, Some(zed.id)),
            order(WorkOrderStatus::Open, Some(boss.id)),
            order(WorkOrderStatus::Open, None),
        ];

        let rows = TechnicianWorkload::compute(&[zed.clone(), boss, amy.clone()], &orders);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].technician_id, amy.id);
        assert_eq!(rows[0].counts.total, 0);
        assert_eq!(rows[1].technician_id, zed.id);
        assert_eq!(rows[1].counts.open, 1);
        assert_eq!(rows[1].counts.in_progress, 1);
        assert_eq!(rows[1].counts.total, 2);

        let v = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(v["technicianId"], serde_json::json!(zed.id.to_string()));
        assert_eq!(v["total"], 2);
    }
}
