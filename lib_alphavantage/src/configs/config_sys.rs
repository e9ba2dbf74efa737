//! # Client Configuration
//!
//! Resolves the settings an Alpha Vantage client and its binaries run with.
//!
//! Sources are layered, later ones winning for every value they set:
//! 1. Built-in defaults.
//! 2. An optional JSON file (`ALPHAVANTAGE_CONFIG_PATH`, else `alphavantage.json`
//!    in the working directory when present).
//! 3. Environment variables.
//!
//! Command-line front ends merge their own flags on top with `ConfigLayer::merge`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use url::Url;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "ALPHAVANTAGE_API_KEY";
/// Environment variable overriding the endpoint.
pub const ENV_BASE_URL: &str = "ALPHAVANTAGE_BASE_URL";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "ALPHAVANTAGE_TIMEOUT_SECS";
/// Environment variable pointing at a JSON configuration file.
pub const ENV_CONFIG_PATH: &str = "ALPHAVANTAGE_CONFIG_PATH";
/// Environment variable holding the log filter.
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
/// Environment variable holding the log directory.
pub const ENV_LOG_DIR: &str = "LOG_DIR";

/// Configuration file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "alphavantage.json";

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("failed to load environment file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Environment variable {0} is not present")]
    MissingEnvVar(String),
}

/// One partial source of settings. Unset values defer to earlier layers.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigLayer {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl ConfigLayer {
    /// Built-in defaults.
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            log_dir: Some(PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }

    // 'other' overrides 'self' for Some values
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            api_key: other.api_key.or(self.api_key),
            base_url: other.base_url.or(self.base_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            log_level: other.log_level.or(self.log_level),
            log_dir: other.log_dir.or(self.log_dir),
        }
    }

    /// Reads a JSON layer from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds a layer from environment-style variables.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => Some(parse_secs(ENV_TIMEOUT_SECS, &raw)?),
            None => None,
        };

        Ok(Self {
            api_key: get(ENV_API_KEY),
            base_url: get(ENV_BASE_URL),
            timeout_secs,
            log_level: get(ENV_LOG_LEVEL),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Validates the merged layers into a usable configuration.
    ///
    /// Missing values fall back to the built-in defaults.
    pub fn resolve(self) -> Result<AlphaVantageConfig, ConfigError> {
        let merged = Self::defaults().merge(self);

        let raw_url = merged.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_url).map_err(|e| ConfigError::InvalidValue {
            name: "base_url".to_string(),
            value: raw_url.clone(),
            reason: e.to_string(),
        })?;

        let timeout_secs = merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(AlphaVantageConfig {
            api_key: merged.api_key.filter(|k| !k.trim().is_empty()),
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            log_level: merged.log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: merged.log_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        })
    }
}

/// Fully resolved settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AlphaVantageConfig {
    /// Absent until some layer provides it; the client refuses to start without it.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub timeout: Duration,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl AlphaVantageConfig {
    /// The API key, or `MissingEnvVar` naming the variable that should hold it.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(ENV_API_KEY.to_string()))
    }
}

impl std::fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

/// Loads `.env`, then the platform-specific `.env.linux` or `.env.windows`,
/// from the working directory.
///
/// Missing files are skipped. Variables already set in the process win.
/// Returns the files that were loaded; nothing is logged here because this
/// usually runs before a subscriber is installed.
pub fn load_dotenv() -> Result<Vec<PathBuf>, ConfigError> {
    load_dotenv_from(Path::new("."))
}

/// Like `load_dotenv`, looking for the files in `dir`.
pub fn load_dotenv_from(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let platform_file = if cfg!(windows) { ".env.windows" } else { ".env.linux" };
    let mut loaded = Vec::new();

    for file in [".env", platform_file] {
        let path = dir.join(file);
        match dotenvy::from_path(&path) {
            Ok(()) => loaded.push(path),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(loaded)
}

/// Resolves configuration from defaults, the config file and the process environment.
pub fn load_config() -> Result<AlphaVantageConfig, ConfigError> {
    load_layers(|name| env::var(name).ok())?.resolve()
}

/// Like `load_config`, with variables read from `lookup` instead of the process environment.
pub fn load_config_with<L>(lookup: L) -> Result<AlphaVantageConfig, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    load_layers(lookup)?.resolve()
}

/// Merges the file and environment layers without applying defaults.
///
/// Front ends that add their own layer on top call this, merge, then `resolve`.
pub fn load_layers<L>(lookup: L) -> Result<ConfigLayer, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let file_layer = match lookup(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
        Some(path) => ConfigLayer::from_file(Path::new(&path))?,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                ConfigLayer::from_file(fallback)?
            } else {
                info!("Config file not found at {}. Using defaults and environment variables.", fallback.display());
                ConfigLayer::default()
            }
        }
    };

    Ok(file_layer.merge(ConfigLayer::from_lookup(lookup)?))
}

fn parse_secs(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
