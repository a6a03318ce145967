use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maintrack_core::{DomainError, DomainResult, Entity, EquipmentId};

use crate::required;

// ─────────────────────────────────────────────────────────────────────────────
// Status
// ─────────────────────────────────────────────────────────────────────────────

/// Operational state of a piece of equipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    MaintenanceDue,
    Down,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 3] = [
        EquipmentStatus::Operational,
        EquipmentStatus::MaintenanceDue,
        EquipmentStatus::Down,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::MaintenanceDue => "maintenance_due",
            EquipmentStatus::Down => "down",
        }
    }
}

impl core::str::FromStr for EquipmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("invalid equipment status '{s}'")))
    }
}

impl core::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

/// A maintainable asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(rename = "_id")]
    pub id: EquipmentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: EquipmentStatus,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub next_maintenance_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Materialize a validated draft as a new record.
    pub fn create(draft: NewEquipment, now: DateTime<Utc>) -> Self {
        Self {
            id: EquipmentId::new(),
            name: draft.name,
            kind: draft.kind,
            status: draft.status.unwrap_or_default(),
            last_maintenance_date: draft.last_maintenance_date,
            next_maintenance_date: draft.next_maintenance_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge a partial update. Fields absent from the patch are left alone.
    pub fn apply(&mut self, patch: EquipmentPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        maintrack_core::patch::apply_nullable(&mut self.last_maintenance_date, patch.last_maintenance_date);
        maintrack_core::patch::apply_nullable(&mut self.next_maintenance_date, patch.next_maintenance_date);
        self.updated_at = now;
    }
}

impl Entity for Equipment {
    type Id = EquipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Create / update inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Validated input for creating equipment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEquipment {
    pub name: String,
    pub kind: String,
    pub status: Option<EquipmentStatus>,
    pub last_maintenance_date: Option<DateTime<Utc>>,
    pub next_maintenance_date: Option<DateTime<Utc>>,
}

impl NewEquipment {
    /// Name and type are required; everything else falls back to defaults.
    pub fn new(
        name: Option<String>,
        kind: Option<String>,
        status: Option<EquipmentStatus>,
        last_maintenance_date: Option<DateTime<Utc>>,
        next_maintenance_date: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        match (required(name), required(kind)) {
            (Some(name), Some(kind)) => Ok(Self {
                name,
                kind,
                status,
                last_maintenance_date,
                next_maintenance_date,
            }),
            _ => Err(DomainError::validation("Missing fields")),
        }
    }
}

/// Partial update for equipment.
///
/// The maintenance dates are tri-state: `None` leaves the field unchanged,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub last_maintenance_date: Option<Option<DateTime<Utc>>>,
    pub next_maintenance_date: Option<Option<DateTime<Utc>>>,
}

impl EquipmentPatch {
    /// Reject patches that would blank a required field.
    pub fn validate(self) -> DomainResult<Self> {
        if self.name.as_deref() == Some("") {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.kind.as_deref() == Some("") {
            return Err(DomainError::validation("type cannot be empty"));
        }
        Ok(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
