//! Configuration loading and representation.
//!
//! Everything comes from environment variables; every key has a default
//! except `DATABASE_URL`, which is required once persistent stores are
//! switched on.

use thiserror::Error;

use maintrack_auth::{BcryptHasher, DEFAULT_TOKEN_TTL_MINUTES};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },

    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub use_persistent_stores: bool,
    pub bcrypt_cost: u32,
    pub token_ttl_minutes: i64,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("use_persistent_stores", &self.use_persistent_stores)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            database_url: None,
            use_persistent_stores: false,
            bcrypt_cost: BcryptHasher::DEFAULT_COST,
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_secret
            }
        };

        let use_persistent_stores = match lookup("USE_PERSISTENT_STORES") {
            Some(raw) => parse("USE_PERSISTENT_STORES", &raw)?,
            None => false,
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => parse("BCRYPT_COST", &raw)?,
            None => defaults.bcrypt_cost,
        };
        // bcrypt only accepts costs in 4..=31.
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let token_ttl_minutes = match lookup("TOKEN_TTL_MINUTES") {
            Some(raw) => parse("TOKEN_TTL_MINUTES", &raw)?,
            None => defaults.token_ttl_minutes,
        };
        if token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_MINUTES",
                value: token_ttl_minutes.to_string(),
            });
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            jwt_secret,
            database_url,
            use_persistent_stores,
            bcrypt_cost,
            token_ttl_minutes,
        })
    }
}

fn parse<T: core::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.token_ttl_minutes, 120);
        assert!(!cfg.use_persistent_stores);
    }

    #[test]
    fn reads_overrides() {
        let cfg = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("BCRYPT_COST", "12"),
            ("TOKEN_TTL_MINUTES", "30"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.bcrypt_cost, 12);
        assert_eq!(cfg.token_ttl_minutes, 30);
    }

    #[test]
    fn persistent_stores_need_database_url() {
        assert_eq!(
            load(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err(),
            ConfigError::MissingDatabaseUrl
        );
        let cfg = load(&[("USE_PERSISTENT_STORES", "true"), ("DATABASE_URL", "postgres://x")]).unwrap();
        assert!(cfg.use_persistent_stores);
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(matches!(
            load(&[("BCRYPT_COST", "lots")]),
            Err(ConfigError::Invalid { key: "BCRYPT_COST", .. })
        ));
        assert!(load(&[("BCRYPT_COST", "2")]).is_err());
        assert!(load(&[("TOKEN_TTL_MINUTES", "0")]).is_err());
        assert!(load(&[("USE_PERSISTENT_STORES", "yes")]).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let cfg = load(&[("JWT_SECRET", "s3cret"), ("DATABASE_URL", "postgres://u:p@h/db")]).unwrap();
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("s3cret"));
        assert!(!shown.contains("u:p@h"));
    }
}
