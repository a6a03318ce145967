use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed: every stored user carries exactly one of these.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Technician,
    Supervisor,
    Manager,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Technician, Role::Supervisor, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Technician => "technician",
            Role::Supervisor => "supervisor",
            Role::Manager => "manager",
        }
    }

    /// Role requested at signup, falling back to technician.
    ///
    /// Absent values, non-string values and unrecognized names all coerce
    /// silently; signup never fails because of the role field.
    pub fn coerce(requested: Option<&serde_json::Value>) -> Role {
        let role = requested
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());
        match (requested, role) {
            (_, Some(role)) => role,
            (Some(v), None) if !v.is_null() => {
                tracing::debug!(requested = %v, "unrecognized role at signup; using technician");
                Role::default()
            }
            _ => Role::default(),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technician" => Ok(Role::Technician),
            "supervisor" => Ok(Role::Supervisor),
            "manager" => Ok(Role::Manager),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
