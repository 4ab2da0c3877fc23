//! Run configuration
//!
//! Loaded from an optional TOML file; command line flags override it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{CheckError, CheckResult};
use crate::retry::RetryPolicy;

/// Tag that selects an item for the report
pub const FILTER_TAG: &str = "IDChecker";

/// Tag that makes the owner section mandatory
pub const OWNER_TAG: &str = "w3 IDs";

/// Config directory name under the platform config dir
const CONFIG_DIR: &str = "idchecker";

/// Config file name
const CONFIG_FILE: &str = "config.toml";

/// Environment variable naming an alternate config file
pub const CONFIG_ENV: &str = "IDCHECKER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Vault that holds the ID records
    pub vault: String,

    /// Owner reported for items without the owner tag
    pub default_owner: String,

    /// Path or name of the `op` executable
    pub op_binary: PathBuf,

    /// Retry policy for TLS handshake timeouts
    pub retry: RetryPolicy,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            vault: "SE&TS Shared OPs".to_string(),
            default_owner: "L2 Support".to_string(),
            op_binary: PathBuf::from("op"),
            retry: RetryPolicy::default(),
        }
    }
}

/// Get the default config file path
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Resolve the config file: `IDCHECKER_CONFIG` if set, else the default path
pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

/// Load configuration, falling back to defaults when the file is absent
pub async fn load_config(path: &Path) -> CheckResult<CheckerConfig> {
    if !path.exists() {
        return Ok(CheckerConfig::default());
    }

    let content = fs::read_to_string(path).await?;
    let config: CheckerConfig =
        toml::from_str(&content).map_err(|e| CheckError::Config(e.to_string()))?;

    Ok(config)
}
