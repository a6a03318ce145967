//! `maintrack-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how to
//! hash passwords, sign and verify tokens, and decide whether a role may use a
//! capability, but not where users live or how requests arrive.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError, Capability};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use password::{BcryptHasher, PasswordError, PasswordHasher};
pub use roles::{Role, UnknownRole};
pub use token::{Hs256TokenCodec, TokenCodec, TokenError, DEFAULT_TOKEN_TTL_MINUTES};
pub use user::{Credentials, PublicUser, Registration, User, UserSummary};
