//! Reference expansion for work orders.
//!
//! Work orders store their equipment and technician by id. Responses embed the
//! referenced records instead, resolved in one batch per collection. A
//! reference that no longer resolves renders as `null`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use maintrack_auth::UserSummary;
use maintrack_core::{EquipmentId, UserId, WorkOrderId};

use crate::{Equipment, Priority, WorkOrder, WorkOrderStatus};

/// Distinct ids referenced by a batch of work orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceIds {
    pub equipment: Vec<EquipmentId>,
    pub users: Vec<UserId>,
}

impl ReferenceIds {
    pub fn collect<'a>(orders: impl IntoIterator<Item = &'a WorkOrder>) -> Self {
        let mut equipment = BTreeSet::new();
        let mut users = BTreeSet::new();
        for order in orders {
            equipment.insert(order.equipment);
            if let Some(tech) = order.assigned_technician {
                users.insert(tech);
            }
        }
        Self {
            equipment: equipment.into_iter().collect(),
            users: users.into_iter().collect(),
        }
    }
}

/// A work order with its references replaced by the referenced records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderView {
    #[serde(rename = "_id")]
    pub id: WorkOrderId,
    pub title: String,
    pub equipment: Option<Equipment>,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub assigned_technician: Option<UserSummary>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Join work orders against already-fetched equipment and users.
///
/// Output order follows input order.
pub fn expand_work_orders(
    orders: Vec<WorkOrder>,
    equipment: Vec<Equipment>,
    users: Vec<UserSummary>,
) -> Vec<WorkOrderView> {
    let equipment: HashMap<EquipmentId, Equipment> =
        equipment.into_iter().map(|e| (e.id, e)).collect();
    let users: HashMap<UserId, UserSummary> = users.into_iter().map(|u| (u.id, u)).collect();

    orders
        .into_iter()
        .map(|order| WorkOrderView {
            id: order.id,
            title: order.title,
            equipment: equipment.get(&order.equipment).cloned(),
            priority: order.priority,
            status: order.status,
            assigned_technician: order
                .assigned_technician
                .and_then(|id| users.get(&id).cloned()),
            description: order.description,
            due_date: order.due_date,
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewEquipment, NewWorkOrder};
    use maintrack_auth::Role;

    fn equipment(name: &str) -> Equipment {
        let draft = NewEquipment::new(Some(name.into()), Some("pump".into()), None, None, None).unwrap();
        Equipment::create(draft, Utc::now())
    }

    fn order(equipment: EquipmentId, tech: Option<UserId>) -> WorkOrder {
        let draft =
            NewWorkOrder::new(Some("Inspect".into()), Some(equipment), None, None, tech, None, None).unwrap();
        WorkOrder::create(draft, Utc::now())
    }

    fn tech(name: &str) -> UserSummary {
        UserSummary {
            id: UserId::new(),
            name: name.into(),
            email: format!("{name}@plant.test"),
            role: Role::Technician,
        }
    }

    #[test]
    fn collect_deduplicates_references() {
        let eq = equipment("Press");
        let t = tech("sam");
        let orders = vec![order(eq.id, Some(t.id)), order(eq.id, Some(t.id)), order(eq.id, None)];
        let ids = ReferenceIds::collect(&orders);
        assert_eq!(ids.equipment, vec![eq.id]);
        assert_eq!(ids.users, vec![t.id]);
    }

    #[test]
    fn expands_resolved_references() {
        let eq = equipment("Press");
        let t = tech("sam");
        let views = expand_work_orders(vec![order(eq.id, Some(t.id))], vec![eq.clone()], vec![t.clone()]);
        assert_eq!(views[0].equipment.as_ref(), Some(&eq));
        assert_eq!(views[0].assigned_technician.as_ref(), Some(&t));
    }

    #[test]
    fn dangling_references_render_as_null() {
        let views = expand_work_orders(vec![order(EquipmentId::new(), Some(UserId::new()))], vec![], vec![]);
        let v = serde_json::to_value(&views[0]).unwrap();
        assert!(v["equipment"].is_null());
        assert!(v["assignedTechnician"].is_null());
    }

    #[test]
    fn preserves_input_order() {
        let eq = equipment("Lathe");
        let orders = vec![order(eq.id, None), order(eq.id, None), order(eq.id, None)];
        let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        let views = expand_work_orders(orders, vec![eq], vec![]);
        assert_eq!(views.iter().map(|v| v.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn expanded_technician_has_no_password_field() {
        let eq = equipment("Lathe");
        let t = tech("kim");
        let views = expand_work_orders(vec![order(eq.id, Some(t.id))], vec![eq], vec![t]);
        let v = serde_json::to_value(&views[0]).unwrap();
        let tech = v["assignedTechnician"].as_object().unwrap();
        assert!(tech.contains_key("_id"));
        assert!(!tech.keys().any(|k| k.to_lowercase().contains("password")));
    }
}
