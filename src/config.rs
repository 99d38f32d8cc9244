use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

/// Deployment mode. Controls the CORS allow-list and how much error detail
/// is returned to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Whether underlying failure details may be included in responses.
    #[must_use]
    pub const fn exposes_error_details(self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!("Unknown environment '{other}' (expected development or production)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Connection string of the inquiry store (`sqlite:` or `postgres://`).
    pub database_url: String,

    pub log_level: String,

    pub log_format: LogFormat,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/atelier.db".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub environment: Environment,

    /// Allowed origins while running in development.
    pub development_origins: Vec<String>,

    /// Explicit origins allowed in production.
    pub production_origins: Vec<String>,

    /// Wildcard subdomain patterns allowed in production, e.g. `https://*.vercel.app`.
    pub production_origin_patterns: Vec<String>,

    /// Upper bound for request bodies in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            environment: Environment::Development,
            development_origins: vec!["http://localhost:5173".to_string()],
            production_origins: vec!["https://interior-designer-gold.vercel.app".to_string()],
            production_origin_patterns: vec!["https://*.vercel.app".to_string()],
            max_body_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Explicit origins for the active environment.
    #[must_use]
    pub fn active_origins(&self) -> &[String] {
        match self.environment {
            Environment::Development => &self.development_origins,
            Environment::Production => &self.production_origins,
        }
    }

    /// Wildcard patterns for the active environment. Development never uses patterns.
    #[must_use]
    pub fn active_origin_patterns(&self) -> &[String] {
        match self.environment {
            Environment::Development => &[],
            Environment::Production => &self.production_origin_patterns,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    /// Port for the Prometheus scrape endpoint. Metrics are recorded but not
    /// served when unset.
    pub metrics_port: Option<u16>,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "atelier".to_string());

        Self {
            metrics_enabled: true,
            metrics_port: None,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    /// Loads the config file (if any), then `.env`, then environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        dotenvy::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Recognised keys: `PORT`, `HOST`, `DATABASE_URL`, `APP_ENV` (falling
    /// back to `NODE_ENV`), `CORS_ALLOWED_ORIGINS` (comma separated, replaces
    /// the list of the active environment) and `LOG_LEVEL`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            self.general.database_url = url;
        }

        if let Some(env) = lookup("APP_ENV") {
            self.server.environment = env.parse()?;
        } else if let Some(env) = lookup("NODE_ENV") {
            // Any value other than production keeps development mode.
            self.server.environment = if env.trim().eq_ignore_ascii_case("production") {
                Environment::Production
            } else {
                Environment::Development
            };
        }

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();

            match self.server.environment {
                Environment::Development => self.server.development_origins = origins,
                Environment::Production => self.server.production_origins = origins,
            }
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.general.log_level = level;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("atelier").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".atelier").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port must be > 0");
        }

        if self.general.max_db_connections < self.general.min_db_connections {
            anyhow::bail!("max_db_connections must be >= min_db_connections");
        }

        crate::api::cors::OriginPolicy::for_server(&self.server)
            .context("Invalid CORS configuration")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(
            config.server.active_origins(),
            &["http://localhost:5173".to_string()]
        );
        assert!(config.server.active_origin_patterns().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 8080
            environment = "production"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Production);

        assert_eq!(config.general.database_url, "sqlite:data/atelier.db");
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("environment = \"development\""));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[
                ("PORT", "9000"),
                ("DATABASE_URL", "postgres://localhost/atelier"),
                ("APP_ENV", "production"),
                (
                    "CORS_ALLOWED_ORIGINS",
                    "https://studio.example.com, https://www.studio.example.com",
                ),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.general.database_url, "postgres://localhost/atelier");
        assert_eq!(config.server.environment, Environment::Production);
        assert_eq!(
            config.server.production_origins,
            vec![
                "https://studio.example.com".to_string(),
                "https://www.studio.example.com".to_string()
            ]
        );
        // Development list is untouched when production is active.
        assert_eq!(config.server.development_origins.len(), 1);
    }

    #[test]
    fn node_env_is_used_when_app_env_is_absent() {
        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[("NODE_ENV", "production")]))
            .unwrap();
        assert_eq!(config.server.environment, Environment::Production);

        let mut config = Config::default();
        config.apply_env(lookup_from(&[("NODE_ENV", "test")])).unwrap();
        assert_eq!(config.server.environment, Environment::Development);

        let mut config = Config::default();
        config
            .apply_env(lookup_from(&[("APP_ENV", "dev"), ("NODE_ENV", "production")]))
            .unwrap();
        assert_eq!(config.server.environment, Environment::Development);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = Config::default();
        assert!(config.apply_env(lookup_from(&[("PORT", "abc")])).is_err());
    }

    #[test]
    fn environment_parsing() {
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(
            " Development ".parse::<Environment>().unwrap(),
            Environment::Development
        );
        assert!("staging".parse::<Environment>().is_err());
        assert!(Environment::Development.exposes_error_details());
        assert!(!Environment::Production.exposes_error_details());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.general.database_url = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.environment = Environment::Production;
        config.server.production_origin_patterns = vec!["https://*.*.example.com".to_string()];
        assert!(config.validate().is_err());
    }
}
