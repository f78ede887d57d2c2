use crate::error::{Result, StowageError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level stowage configuration stored as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StowageConfig {
    pub stowage: StowageSettings,
    #[serde(default)]
    pub storages: Vec<StorageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StowageSettings {
    /// Directory the package producer writes finished packages into.
    pub tmp_path: String,
    /// Directory holding the per-storage cycling ledgers.
    pub data_path: String,
}

/// One `[[storages]]` entry, selected by its `type` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    #[serde(rename = "cloudfiles")]
    CloudFiles(CloudFilesConfig),
    #[serde(rename = "local")]
    Local(LocalConfig),
}

impl StorageConfig {
    pub fn id(&self) -> Option<&str> {
        match self {
            StorageConfig::CloudFiles(c) => c.id.as_deref(),
            StorageConfig::Local(c) => c.id.as_deref(),
        }
    }

    pub fn keep(&self) -> Option<u32> {
        match self {
            StorageConfig::CloudFiles(c) => c.keep,
            StorageConfig::Local(c) => c.keep,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StorageConfig::CloudFiles(_) => "cloudfiles",
            StorageConfig::Local(_) => "local",
        }
    }
}

/// Rackspace Cloud Files storage settings.
///
/// Nothing is validated here; bad credentials only show up once the
/// storage first connects.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudFilesConfig {
    /// Distinguishes several storages of the same type.
    pub id: Option<String>,
    /// Number of packages to retain; `None` disables cycling.
    pub keep: Option<u32>,
    pub username: String,
    pub api_key: String,
    pub auth_url: Option<String>,
    /// Use Rackspace ServiceNet (internal network) for transfers.
    pub servicenet: bool,
    pub container: String,
    /// Remote path prefix inside the container.
    pub path: String,
    /// Extra object headers, e.g. `[["X-Delete-After", 864000]]`.
    pub additional_metadata: Vec<(String, MetadataValue)>,
}

impl Default for CloudFilesConfig {
    fn default() -> Self {
        Self {
            id: None,
            keep: None,
            username: String::new(),
            api_key: String::new(),
            auth_url: None,
            servicenet: false,
            container: String::new(),
            path: default_remote_path(),
            additional_metadata: Vec::new(),
        }
    }
}

impl fmt::Debug for CloudFilesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudFilesConfig")
            .field("id", &self.id)
            .field("keep", &self.keep)
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .field("auth_url", &self.auth_url)
            .field("servicenet", &self.servicenet)
            .field("container", &self.container)
            .field("path", &self.path)
            .field("additional_metadata", &self.additional_metadata)
            .finish()
    }
}

fn default_remote_path() -> String {
    "backups".to_string()
}

/// A metadata header value. TOML allows either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Integer(i64),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => write!(f, "{s}"),
            MetadataValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        MetadataValue::Integer(n)
    }
}

/// Filesystem directory storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub keep: Option<u32>,
    pub path: String,
}

impl StowageConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StowageError::ConfigNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| StowageError::TomlDe(e.to_string()))
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| StowageError::TomlSer(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config for `stowage init`.
    pub fn default_config(base_dir: &Path) -> Self {
        Self {
            stowage: StowageSettings {
                tmp_path: base_dir.join(".tmp").display().to_string(),
                data_path: base_dir.join("data").display().to_string(),
            },
            storages: vec![],
        }
    }

    /// Resolve the config file path: `<base_dir>/stowage.toml`
    pub fn default_path(base_dir: &Path) -> PathBuf {
        base_dir.join("stowage.toml")
    }

    /// Resolve the default stowage home directory: `~/.stowage`
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|h| h.join(".stowage"))
            .ok_or_else(|| StowageError::Config("Cannot determine home directory".to_string()))
    }
}
