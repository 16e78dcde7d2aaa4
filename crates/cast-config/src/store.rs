//! Document store location configuration.

use serde::{Deserialize, Serialize};

/// Default store file path, relative to the working directory.
fn default_path() -> String {
    ".castaway/pool.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path to the libSQL database file. `:memory:` is accepted for tests.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}
