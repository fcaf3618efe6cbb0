//! Configuration
//!
//! Persistent settings live in `~/.signet/config.json` (directory overridable
//! via `SIGNET_CONFIG_DIR`). The access token itself is never stored in the
//! config file: it is resolved from `SIGNET_ACCESS_TOKEN` or read from a
//! token file the config points at.

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Env var holding the OAuth access token for the Google APIs.
pub const TOKEN_ENV_VAR: &str = "SIGNET_ACCESS_TOKEN";

/// Env var overriding the config directory (used by tests).
pub const CONFIG_DIR_ENV_VAR: &str = "SIGNET_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Not configured: {0}")]
    Missing(String),

    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Stored application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace admin the delegated credentials act as.
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Directory customer handle; `my_customer` selects the admin's own
    /// domain.
    #[serde(default = "default_customer_id")]
    pub customer_id: String,

    /// File containing the access token, one line, used when the env var is
    /// absent.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            customer_id: default_customer_id(),
            token_file: None,
        }
    }
}

fn default_customer_id() -> String {
    "my_customer".to_string()
}

/// Directory holding the config file.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV_VAR) {
        return PathBuf::from(dir);
    }
    let home = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".signet")
}

/// Full path of the config file.
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

impl AppConfig {
    /// Load the config file; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Write the config file, creating the config directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let dir = config_dir();
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = config_path();
        let raw = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, raw).map_err(|source| ConfigError::Io { path, source })
    }

    /// Whether everything a deployment needs is in place: an admin email and
    /// a resolvable access token.
    pub fn is_configured(&self) -> bool {
        self.admin_email.is_some() && self.access_token().is_ok()
    }

    /// Resolve the access token: env var first, then the configured token
    /// file.
    pub fn access_token(&self) -> Result<String, ConfigError> {
        if let Ok(token) = env::var(TOKEN_ENV_VAR) {
            if !token.trim().is_empty() {
                return Ok(token.trim().to_string());
            }
        }
        if let Some(path) = &self.token_file {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let token = raw.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
        Err(ConfigError::Missing(format!(
            "no access token; set {TOKEN_ENV_VAR} or configure token_file"
        )))
    }
}
