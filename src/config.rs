use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Gateway configuration, one YAML mapping per section.
///
/// Every key is optional; missing keys keep their zero value.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub general: General,
    pub certificates: Certificates,
    pub media: Media,
    pub nat: Nat,
    pub plugins: Plugins,
    pub transports: Transports,
    pub events: Events,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct General {
    pub configs_folder: String,
    pub plugins_folder: String,
    pub transports_folder: String,
    pub events_folder: String,
    pub log_to_stdout: bool,
    pub log_to_file: String,
    pub daemonize: bool,
    pub pid_file: String,
    pub interface: String,
    pub debug_level: i64,
    pub debug_timestamps: bool,
    pub debug_colors: bool,
    pub debug_locks: bool,
    pub api_secret: String,
    pub token_auth: bool,
    pub token_auth_secret: String,
    pub admin_secret: String,
    pub server_name: String,
    /// Seconds.
    pub session_timeout: i64,
    /// Seconds.
    #[serde(alias = "reclain_session_timeout")]
    pub reclaim_session_timeout: i64,
    pub recordings_tmp_ext: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Certificates {
    pub cert_pem: String,
    pub cert_key: String,
    pub cert_pwd: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Media {
    pub ipv6: bool,
    pub max_nack_queue: i64,
    pub rfc_4588: bool,
    pub rtp_port_range: String,
    pub dtls_mtu: i64,
    pub no_media_timer: i64,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Nat {
    pub stun_server: String,
    pub stun_port: i64,
    pub nice_debug: bool,
    pub full_trickle: bool,
    pub ice_lite: bool,
    pub ice_tcp: bool,
    pub nat_1_1_mapping: String,
    pub turn_server: String,
    pub turn_port: i64,
    pub turn_type: String,
    pub turn_user: String,
    pub turn_pwd: String,
    pub turn_rest_api: String,
    pub turn_rest_api_key: String,
    pub turn_rest_api_method: String,
    pub ice_enforce_list: String,
    pub ice_ignore_list: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Plugins {
    pub disable: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Transports {
    pub disable: String,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Events {
    pub broadcast: bool,
    pub disable: String,
    pub stats_period: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading config file '{}': {error}", .path.display())]
    ErrorReadingFile {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Error writing config file '{}': {error}", .path.display())]
    ErrorWritingFile {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Error parsing config file {0}")]
    ParseError(#[from] serde_yml::Error),
    #[error("Error serializing config {0}")]
    SerializeError(serde_yml::Error),
}

impl Config {
    pub fn new(content: &str) -> Result<Config, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yml::from_str(content).map_err(|e| e.into())
    }

    pub fn from_file(config_path: &Path) -> Result<Config, ConfigError> {
        let content =
            std::fs::read_to_string(config_path).map_err(|e| ConfigError::ErrorReadingFile {
                path: config_path.to_path_buf(),
                error: e,
            })?;
        Self::new(content.as_str())
    }

    /// Like [`Config::from_file`], but an unreadable file only logs a warning
    /// and yields the defaults. Malformed YAML is still an error.
    pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
        match Self::from_file(config_path) {
            Err(e @ ConfigError::ErrorReadingFile { .. }) => {
                warn!("{e}, using defaults");
                Ok(Config::default())
            }
            other => other,
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yml::to_string(self).map_err(ConfigError::SerializeError)
    }

    pub fn save(&self, config_path: &Path) -> Result<(), ConfigError> {
        let content = self.to_yaml()?;
        std::fs::write(config_path, content).map_err(|e| ConfigError::ErrorWritingFile {
            path: config_path.to_path_buf(),
            error: e,
        })
    }
}
