use crate::campaign::RegistryPolicy;
use crate::query::SortKey;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub campaigns: RegistryPolicy,
    #[serde(default)]
    pub dashboard: ViewConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Csv,
    Sqlite,
    /// Campaigns live in memory only; customers still come from CSV.
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_customers_path")]
    pub customers_path: String,
    #[serde(default = "default_campaigns_path")]
    pub campaigns_path: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Csv
}

fn default_customers_path() -> String {
    "data/clientes.csv".to_string()
}

fn default_campaigns_path() -> String {
    "data/campanhas.csv".to_string()
}

fn default_database_path() -> String {
    "data/pizzaria.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            customers_path: default_customers_path(),
            campaigns_path: default_campaigns_path(),
            database_path: default_database_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub sort_key: SortKey,
}

fn default_top_n() -> usize {
    10
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            sort_key: SortKey::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl DashboardConfig {
    /// Load from TOML, or YAML when the extension says so.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        };
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            toml::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
        Ok(())
    }

    pub fn default_path() -> &'static str {
        "pizzeria-dashboard.toml"
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}
