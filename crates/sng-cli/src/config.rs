//! CLI configuration

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sng_core::GraphQueries;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sng")
}

/// Default location of the config file
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sng")
        .join("config.toml")
}

/// Graph database backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process, lost on exit
    Memory,
    /// Persistent, stored in the data directory
    Redb,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redb => write!(f, "redb"),
        }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub backend: Backend,
    /// Address the viewer listens on
    pub bind: String,
    /// Seed file loaded on reset; `<data_dir>/seed.txt` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
    pub pool_size: usize,
    pub user_label: String,
    pub relationship_type: String,
}

impl Default for Config {
    fn default() -> Self {
        let queries = GraphQueries::default();
        Self {
            data_dir: default_data_dir(),
            backend: Backend::Redb,
            bind: "127.0.0.1:5000".to_string(),
            seed_file: None,
            pool_size: 8,
            user_label: queries.user_label,
            relationship_type: queries.relationship_type,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "data_dir",
            "backend",
            "bind",
            "seed_file",
            "pool_size",
            "user_label",
            "relationship_type",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "backend" => Some(self.backend.to_string()),
            "bind" => Some(self.bind.clone()),
            "seed_file" => self.seed_file.as_ref().map(|p| p.display().to_string()),
            "pool_size" => Some(self.pool_size.to_string()),
            "user_label" => Some(self.user_label.clone()),
            "relationship_type" => Some(self.relationship_type.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "backend" => {
                self.backend = Backend::from_str(value, true)
                    .map_err(|_| anyhow::anyhow!("Invalid backend: {} (memory, redb)", value))?
            }
            "bind" => self.bind = value.to_string(),
            "seed_file" => self.seed_file = Some(PathBuf::from(value)),
            "pool_size" => {
                self.pool_size = value
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid pool size: {}", value))?
            }
            "user_label" => self.user_label = value.to_string(),
            "relationship_type" => self.relationship_type = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Available keys: {}",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    pub fn seed_file(&self) -> PathBuf {
        self.seed_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("seed.txt"))
    }

    pub fn queries(&self) -> GraphQueries {
        GraphQueries::new(&self.user_label, &self.relationship_type)
    }
}
