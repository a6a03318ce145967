//! Route capability table and the single authorization check.

use serde::Serialize;
use thiserror::Error;

use crate::Role;

/// Something a caller can ask the API to do.
///
/// Each HTTP route that needs more than "is authenticated" maps to exactly one
/// capability; the allow-list lives in [`Capability::allowed_roles`] and nowhere
/// else.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ListEquipment,
    CreateEquipment,
    UpdateEquipment,
    DeleteEquipment,
    ListWorkOrders,
    CreateWorkOrder,
    UpdateWorkOrder,
    DeleteWorkOrder,
    ListUsers,
    ViewSummary,
    ViewWorkload,
}

const ANY: &[Role] = &[Role::Technician, Role::Supervisor, Role::Manager];
const SUPERVISION: &[Role] = &[Role::Supervisor, Role::Manager];
const MANAGEMENT: &[Role] = &[Role::Manager];

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::ListEquipment,
        Capability::CreateEquipment,
        Capability::UpdateEquipment,
        Capability::DeleteEquipment,
        Capability::ListWorkOrders,
        Capability::CreateWorkOrder,
        Capability::UpdateWorkOrder,
        Capability::DeleteWorkOrder,
        Capability::ListUsers,
        Capability::ViewSummary,
        Capability::ViewWorkload,
    ];

    /// Roles permitted to use this capability.
    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Capability::ListEquipment
            | Capability::ListWorkOrders
            | Capability::ListUsers
            | Capability::ViewSummary => ANY,
            Capability::CreateEquipment
            | Capability::UpdateEquipment
            | Capability::CreateWorkOrder
            | Capability::ViewWorkload => SUPERVISION,
            Capability::UpdateWorkOrder => ANY,
            Capability::DeleteEquipment | Capability::DeleteWorkOrder => MANAGEMENT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ListEquipment => "equipment.list",
            Capability::CreateEquipment => "equipment.create",
            Capability::UpdateEquipment => "equipment.update",
            Capability::DeleteEquipment => "equipment.delete",
            Capability::ListWorkOrders => "workorders.list",
            Capability::CreateWorkOrder => "workorders.create",
            Capability::UpdateWorkOrder => "workorders.update",
            Capability::DeleteWorkOrder => "workorders.delete",
            Capability::ListUsers => "users.list",
            Capability::ViewSummary => "reports.summary",
            Capability::ViewWorkload => "reports.workload",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role '{role}' may not use '{capability}'")]
    Forbidden { role: Role, capability: Capability },
}

/// Decide whether `role` may use `capability`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(role: Role, capability: Capability) -> Result<(), AuthzError> {
    if capability.allowed_roles().contains(&role) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden { role, capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(cap: Capability) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|r| authorize(*r, cap).is_ok())
            .collect()
    }

    #[test]
    fn reads_are_open_to_every_role() {
        for cap in [
            Capability::ListEquipment,
            Capability::ListWorkOrders,
            Capability::ListUsers,
            Capability::ViewSummary,
        ] {
            assert_eq!(allowed(cap), Role::ALL.to_vec(), "{cap}");
        }
    }

    #[test]
    fn equipment_writes() {
        assert_eq!(allowed(Capability::CreateEquipment), vec![Role::Supervisor, Role::Manager]);
        assert_eq!(allowed(Capability::UpdateEquipment), vec![Role::Supervisor, Role::Manager]);
        assert_eq!(allowed(Capability::DeleteEquipment), vec![Role::Manager]);
    }

    #[test]
    fn work_order_writes() {
        assert_eq!(allowed(Capability::CreateWorkOrder), vec![Role::Supervisor, Role::Manager]);
        assert_eq!(allowed(Capability::UpdateWorkOrder), Role::ALL.to_vec());
        assert_eq!(allowed(Capability::DeleteWorkOrder), vec![Role::Manager]);
    }

    #[test]
    fn workload_report_excludes_technicians() {
        assert_eq!(allowed(Capability::ViewWorkload), vec![Role::Supervisor, Role::Manager]);
    }

    #[test]
    fn denial_names_role_and_capability() {
        let err = authorize(Role::Technician, Capability::DeleteEquipment).unwrap_err();
        assert_eq!(
            err.to_string(),
            "forbidden: role 'technician' may not use 'equipment.delete'"
        );
    }

    #[test]
    fn every_capability_allows_managers() {
        for cap in Capability::ALL {
            assert!(authorize(Role::Manager, cap).is_ok(), "{cap}");
        }
    }
}
