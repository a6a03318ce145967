//! User identity records and the views that are allowed to leave the
//! credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maintrack_core::{DomainError, Entity, UserId};

use crate::Role;

/// Stored user identity.
///
/// `password_hash` never appears in any serialized view; use
/// [`User::public_view`] or [`User::summary`] to hand a user to callers.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Build a fresh record from a validated registration and its hash.
    pub fn register(registration: &Registration, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            password_hash,
            role: registration.role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Identity embedded in tokens and returned from the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Directory projection of a user (also used for the expanded technician on a
/// work order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Validated signup input.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl Registration {
    /// Validate raw signup fields.
    ///
    /// Name, email and password must be present and non-empty. The role is
    /// coerced (see [`Role::coerce`]) and never causes a failure. Email is kept
    /// exactly as given: matching is case-sensitive.
    pub fn parse(
        name: Option<String>,
        email: Option<String>,
        password: Option<String>,
        role: Option<&serde_json::Value>,
    ) -> Result<Self, DomainError> {
        match (non_empty(name), non_empty(email), non_empty(password)) {
            (Some(name), Some(email), Some(password)) => Ok(Self {
                name,
                email,
                password,
                role: Role::coerce(role),
            }),
            _ => Err(DomainError::validation("Missing fields")),
        }
    }
}

/// Validated login input.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn parse(email: Option<String>, password: Option<String>) -> Result<Self, DomainError> {
        match (non_empty(email), non_empty(password)) {
            (Some(email), Some(password)) => Ok(Self { email, password }),
            _ => Err(DomainError::validation("Missing credentials")),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn registration_requires_name_email_password() {
        let cases = [
            (None, s("a@b.c"), s("pw")),
            (s("Ann"), None, s("pw")),
            (s("Ann"), s("a@b.c"), None),
            (s(""), s("a@b.c"), s("pw")),
            (s("Ann"), s(""), s("pw")),
            (s("Ann"), s("a@b.c"), s("")),
        ];
        for (name, email, password) in cases {
            let err = Registration::parse(name, email, password, None).unwrap_err();
            assert_eq!(err, DomainError::validation("Missing fields"));
        }
    }

    #[test]
    fn registration_coerces_role_and_keeps_email_verbatim() {
        let reg = Registration::parse(s("Ann"), s("Ann@Example.com"), s("pw"), Some(&json!("admin")))
            .unwrap();
        assert_eq!(reg.role, Role::Technician);
        assert_eq!(reg.email, "Ann@Example.com");

        let reg = Registration::parse(s("Ann"), s("a@b.c"), s("pw"), Some(&json!("supervisor")))
            .unwrap();
        assert_eq!(reg.role, Role::Supervisor);
    }

    #[test]
    fn credentials_require_both_fields() {
        assert_eq!(
            Credentials::parse(s("a@b.c"), None).unwrap_err(),
            DomainError::validation("Missing credentials")
        );
        assert!(Credentials::parse(s("a@b.c"), s("pw")).is_ok());
    }

    #[test]
    fn views_never_carry_the_hash() {
        let reg = Registration::parse(s("Ann"), s("a@b.c"), s("pw"), None).unwrap();
        let user = User::register(&reg, "$2b$10$secret".to_string(), Utc::now());

        let public = serde_json::to_value(user.public_view()).unwrap();
        assert_eq!(public["id"], json!(user.id.to_string()));
        assert_eq!(public["role"], json!("technician"));
        assert!(!public.to_string().contains("secret"));

        let summary = serde_json::to_value(user.summary()).unwrap();
        assert_eq!(summary["_id"], json!(user.id.to_string()));
        assert_eq!(summary.as_object().unwrap().len(), 4);

        assert!(!format!("{user:?}").contains("secret"));
    }
}
