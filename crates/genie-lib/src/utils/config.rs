// Genie Configuration
//
// TOML file (camelCase keys) with environment overrides.
// Lookup order: explicit path, then {config_dir}/genie/config.toml, then defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::dashboard::DEFAULT_DASHBOARD_NAMESPACE;
use crate::services::dashboard_store::{DashboardError, DashboardResult};
use crate::utils::ids::validate_namespace;

pub const ENV_NAMESPACE: &str = "GENIE_NAMESPACE";
pub const ENV_STORE_BACKEND: &str = "GENIE_STORE_BACKEND";
pub const ENV_API_ENDPOINT: &str = "GENIE_API_ENDPOINT";
pub const ENV_API_TOKEN: &str = "GENIE_API_TOKEN";

const CONFIG_DIR_NAME: &str = "genie";
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_namespace() -> String {
    DEFAULT_DASHBOARD_NAMESPACE.to_string()
}

fn default_endpoint() -> String {
    "https://kubernetes.default.svc".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_watch_interval_secs() -> u64 {
    10
}

/// Dashboard store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Kubernetes,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "kubernetes" | "kube" => Ok(StoreBackend::Kubernetes),
            _ => Err(format!("Unknown store backend: {}", s)),
        }
    }
}

/// Dashboard store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            endpoint: default_endpoint(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Dashboard collection polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    #[serde(default = "default_watch_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval_secs(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenieConfig {
    /// Namespace dashboards are created in and listed from
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Default for GenieConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            store: StoreConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl GenieConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration, apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> DashboardResult<Self> {
        // .env is optional
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    log::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    pub fn from_file(path: &Path) -> DashboardResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GenieConfig = toml::from_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the environment (lookup is injectable for tests)
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            self.namespace = namespace;
        }
        if let Some(backend) = lookup(ENV_STORE_BACKEND) {
            match backend.parse() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => log::warn!("Ignoring {}: {}", ENV_STORE_BACKEND, e),
            }
        }
        if let Some(endpoint) = lookup(ENV_API_ENDPOINT) {
            self.store.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_API_TOKEN) {
            self.store.token = Some(token);
        }
    }

    pub fn validate(&self) -> DashboardResult<()> {
        validate_namespace(&self.namespace).map_err(DashboardError::InvalidConfig)?;

        if self.store.backend == StoreBackend::Kubernetes && self.store.endpoint.trim().is_empty() {
            return Err(DashboardError::InvalidConfig(
                "store.endpoint is required for the kubernetes backend".to_string(),
            ));
        }
        if self.store.timeout_secs == 0 {
            return Err(DashboardError::InvalidConfig(
                "store.timeoutSecs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = GenieConfig::default();
        assert_eq!(config.namespace, "default");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.store.endpoint, "https://kubernetes.default.svc");
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.watch.interval_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let file = write_config(
            r#"
namespace = "team-a"

[store]
backend = "kubernetes"
endpoint = "https://api.cluster.example:6443"
timeoutSecs = 5
"#,
        );

        let config = GenieConfig::from_file(file.path()).unwrap();
        assert_eq!(config.namespace, "team-a");
        assert_eq!(config.store.backend, StoreBackend::Kubernetes);
        assert_eq!(config.store.timeout_secs, 5);
        assert!(config.store.token.is_none());
        assert_eq!(config.watch.interval_secs, 10);
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let file = write_config("namespace = [");
        let result = GenieConfig::from_file(file.path());
        assert!(matches!(result, Err(DashboardError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = GenieConfig::from_file(Path::new("/nonexistent/genie/config.toml"));
        assert!(matches!(result, Err(DashboardError::IoError(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_NAMESPACE, "observability"),
            (ENV_STORE_BACKEND, "Kubernetes"),
            (ENV_API_ENDPOINT, "https://10.0.0.1:6443"),
            (ENV_API_TOKEN, "secret"),
        ]);

        let mut config = GenieConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.namespace, "observability");
        assert_eq!(config.store.backend, StoreBackend::Kubernetes);
        assert_eq!(config.store.endpoint, "https://10.0.0.1:6443");
        assert_eq!(config.store.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_overrides_ignore_blank_and_unknown() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_NAMESPACE, "  "), (ENV_STORE_BACKEND, "etcd")]);

        let mut config = GenieConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config, GenieConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GenieConfig::default();
        config.namespace = "Not_Valid".to_string();
        assert!(config.validate().is_err());

        let mut config = GenieConfig::default();
        config.store.backend = StoreBackend::Kubernetes;
        config.store.endpoint = String::new();
        assert!(config.validate().is_err());

        let mut config = GenieConfig::default();
        config.store.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
