//! Seed data configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Inputs for the seed/bootstrap run.
///
/// `password_hash` is the one required secret: the pre-hashed credential
/// assigned to every seeded identity. It is never defaulted; a run must
/// fail before any write if it is absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeedConfig {
    /// Pre-hashed password for seeded identities
    /// (`CASTAWAY_SEED__PASSWORD_HASH`).
    #[serde(default)]
    pub password_hash: String,
}

impl SeedConfig {
    /// Check that the required secret is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.password_hash.is_empty()
    }

    /// Return the password hash, or the fatal configuration error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` if the hash is empty.
    pub fn require_password_hash(&self) -> Result<&str, ConfigError> {
        if self.password_hash.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "seed.password_hash".to_string(),
            });
        }
        Ok(&self.password_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = SeedConfig::default();
        assert!(!config.is_configured());
        assert!(config.require_password_hash().is_err());
    }

    #[test]
    fn configured_when_hash_set() {
        let config = SeedConfig {
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
        };
        assert!(config.is_configured());
        assert_eq!(
            config.require_password_hash().unwrap(),
            "$2b$12$abcdefghijklmnopqrstuv"
        );
    }
}
