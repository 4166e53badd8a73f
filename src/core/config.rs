use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Environment variable overriding the primary provider base URL.
pub const PRIMARY_API_ENV: &str = "EXCHANGE_API";
/// Environment variable overriding the secondary provider base URL.
pub const SECONDARY_API_ENV: &str = "EXCHANGE_API2";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderEndpoint {
    /// Base URL; the uppercase currency code is appended verbatim.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub primary: ProviderEndpoint,
    pub secondary: ProviderEndpoint,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            primary: ProviderEndpoint {
                base_url: "https://open.er-api.com/v6/latest/".to_string(),
            },
            secondary: ProviderEndpoint {
                base_url: "https://open.er-api.com/v6/latest/".to_string(),
            },
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeoConfig {
    /// HTTP geolocation endpoint, queried as `<base_url>/<ip>`.
    pub base_url: Option<String>,
    /// Fixed IP to country assignments, consulted before `base_url`.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

impl Default for GeoConfig {
    fn default() -> Self {
        GeoConfig {
            base_url: Some("http://ip-api.com/json".to_string()),
            overrides: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LimitsConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            window_secs: 60,
            max_requests: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    pub rate_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            rate_ttl_secs: 24 * 60 * 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HistoryConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    pub data_path: Option<String>,
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            listen: default_listen(),
            providers: ProvidersConfig::default(),
            geo: GeoConfig::default(),
            limits: LimitsConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file if present, built-in defaults otherwise,
    /// then applies environment overrides.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            return Self::load_from_path(&config_path);
        }

        debug!(path = %config_path.display(), "No config file, using defaults");
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "foreignrate", "foreignrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("com", "foreignrate", "foreignrate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.apply_env(|name| std::env::var(name).ok());
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Overrides provider base URLs from `EXCHANGE_API` / `EXCHANGE_API2`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var(PRIMARY_API_ENV).filter(|v| !v.is_empty()) {
            debug!(%url, "Primary provider overridden from environment");
            self.providers.primary.base_url = url;
        }
        if let Some(url) = var(SECONDARY_API_ENV).filter(|v| !v.is_empty()) {
            debug!(%url, "Secondary provider overridden from environment");
            self.providers.secondary.base_url = url;
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_secs)
    }

    pub fn rate_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.rate_ttl_secs)
    }

    pub fn usage_window(&self) -> Duration {
        Duration::from_secs(self.limits.window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
listen: "127.0.0.1:9000"
providers:
  primary:
    base_url: "http://example.com/primary/"
  secondary:
    base_url: "http://example.com/secondary/"
geo:
  overrides:
    "127.0.0.1": "NG"
limits:
  window_secs: 10
  max_requests: 5
history:
  enabled: true
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(
            config.providers.primary.base_url,
            "http://example.com/primary/"
        );
        assert_eq!(
            config.providers.secondary.base_url,
            "http://example.com/secondary/"
        );
        assert_eq!(config.providers.timeout_secs, 10);
        assert!(config.geo.base_url.is_none());
        assert_eq!(
            config.geo.overrides.get("127.0.0.1").map(String::as_str),
            Some("NG")
        );
        assert_eq!(config.usage_window(), Duration::from_secs(10));
        assert_eq!(config.limits.max_requests, 5);
        assert_eq!(config.rate_ttl(), Duration::from_secs(86400));
        assert!(config.history.enabled);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: /tmp/fr").unwrap();
        assert_eq!(config.listen, "0.0.0.0:8000");
        assert_eq!(config.limits.window_secs, 60);
        assert_eq!(config.limits.max_requests, 30);
        assert!(!config.history.enabled);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fr")
        );
    }

    #[test]
    fn test_env_overrides_provider_urls() {
        let mut config = AppConfig::default();
        config.apply_env(|name| match name {
            PRIMARY_API_ENV => Some("http://primary/".to_string()),
            SECONDARY_API_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.providers.primary.base_url, "http://primary/");
        assert_eq!(
            config.providers.secondary.base_url,
            ProvidersConfig::default().secondary.base_url
        );
    }
}
