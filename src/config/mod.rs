//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::fetch::ClientConfig;
use crate::loader::{LoaderConfig, FALLBACK_FILES};
use crate::models::PlayerId;
use crate::ranking::{DEFAULT_PER_PAGE, MAX_PER_PAGE, MIN_PLAYS_FOR_WIN_RATE};

/// Parse a reload interval such as `90s`, `15m`, `6h` or `1d`.
///
/// A bare number is seconds. Zero and overflowing intervals are rejected.
pub fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    let unit_secs: u64 = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        _ => return None,
    };

    let secs = digits.parse::<u64>().ok()?.checked_mul(unit_secs)?;
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where player data is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// CSV files under `data_dir`
    #[default]
    Dir,
    /// Remote board backend at `source.base_url`
    Http,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Dir => write!(f, "dir"),
            SourceKind::Http => write!(f, "http"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dir" | "local" => Ok(SourceKind::Dir),
            "http" | "remote" => Ok(SourceKind::Http),
            other => Err(format!("unknown source kind: {}", other)),
        }
    }
}

/// Data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Backend root for the `http` source
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("versus-board/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Ranking defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Minimum plays to appear in the win-rate ranking
    #[serde(default = "default_min_plays")]
    pub min_plays_for_win_rate: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_min_plays() -> u64 {
    MIN_PLAYS_FOR_WIN_RATE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_plays_for_win_rate: default_min_plays(),
            per_page: default_per_page(),
        }
    }
}

/// Bulk loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Players fetched at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// File list used when the source cannot list its files
    #[serde(default = "default_fallback_files")]
    pub fallback_files: Vec<String>,
}

fn default_max_concurrency() -> usize {
    8
}

fn default_fallback_files() -> Vec<String> {
    FALLBACK_FILES.iter().map(|f| f.to_string()).collect()
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            fallback_files: default_fallback_files(),
        }
    }
}

/// Name mapping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Mapping used when the source cannot provide one
    #[serde(default)]
    pub fallback: BTreeMap<PlayerId, String>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Rebuild the snapshot periodically, e.g. "10m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_interval: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            reload_interval: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub loader: LoaderSettings,

    #[serde(default)]
    pub names: NamesConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            source: SourceConfig::default(),
            ranking: RankingConfig::default(),
            loader: LoaderSettings::default(),
            names: NamesConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Source timeout must be greater than 0".to_string(),
            ));
        }

        if self.source.kind == SourceKind::Http {
            url::Url::parse(&self.source.base_url).map_err(|e| {
                ConfigError::ValidationError(format!(
                    "Invalid source base_url {}: {}",
                    self.source.base_url, e
                ))
            })?;
        }

        if self.ranking.per_page == 0 || self.ranking.per_page > MAX_PER_PAGE {
            return Err(ConfigError::ValidationError(format!(
                "Ranking per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }

        if self.loader.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "Loader max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if let Some(interval) = &self.server.reload_interval {
            if parse_interval(interval).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid reload_interval: {}",
                    interval
                )));
            }
        }

        Ok(())
    }

    /// Periodic reload interval, if configured.
    pub fn reload_interval(&self) -> Option<Duration> {
        self.server
            .reload_interval
            .as_deref()
            .and_then(parse_interval)
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            max_concurrency: self.loader.max_concurrency,
            fallback_files: self.loader.fallback_files.clone(),
            fallback_names: self.names.fallback.clone(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.source.base_url.clone(),
            timeout: Duration::from_secs(self.source.timeout_seconds),
            user_agent: self.source.user_agent.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.source.kind, SourceKind::Dir);
        assert_eq!(config.ranking.min_plays_for_win_rate, 100);
        assert_eq!(config.ranking.per_page, 10);
        assert_eq!(config.loader.max_concurrency, 8);
        assert_eq!(config.loader.fallback_files.len(), 9);
        assert!(config.names.fallback.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.reload_interval(), None);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.source.timeout_seconds = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_per_page() {
        let mut config = AppConfig::default();
        config.ranking.per_page = 500;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = AppConfig::default();
        config.source.base_url = "nowhere".to_string();
        assert!(config.validate().is_ok());

        config.source.kind = SourceKind::Http;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_reload_interval() {
        let mut config = AppConfig::default();

        config.server.reload_interval = Some("10m".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.reload_interval(), Some(Duration::from_secs(600)));

        config.server.reload_interval = Some("0s".to_string());
        assert!(config.validate().is_err());

        config.server.reload_interval = Some("soon".to_string());
        assert!(config.validate().is_err());

        config.server.reload_interval = Some("1d".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.reload_interval(), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_interval("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_interval("6h"), Some(Duration::from_secs(21_600)));
        assert_eq!(parse_interval("2d"), Some(Duration::from_secs(172_800)));
        assert_eq!(parse_interval(" 120 "), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_interval_rejects() {
        assert_eq!(parse_interval(""), None);
        assert_eq!(parse_interval("h"), None);
        assert_eq!(parse_interval("0m"), None);
        assert_eq!(parse_interval("5w"), None);
        assert_eq!(parse_interval("-5s"), None);
        assert_eq!(parse_interval("213503982334602d"), None);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            data_dir = "/srv/board"

            [source]
            kind = "http"
            base_url = "https://board.example.com"

            [ranking]
            min_plays_for_win_rate = 50

            [names.fallback]
            Y9P7BN4JF = "Kiri"

            [server]
            port = 9000
            reload_interval = "30m"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/board"));
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.ranking.min_plays_for_win_rate, 50);
        assert_eq!(config.ranking.per_page, 10);
        assert_eq!(
            config.names.fallback.get("Y9P7BN4JF").map(String::as_str),
            Some("Kiri")
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.reload_interval(), Some(Duration::from_secs(1800)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();

        let missing = AppConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(missing.server.port, 8080);

        let path = dir.path().join("board.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::ValidationError(_))
        ));

        std::fs::write(&path, "[server\n").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_derived_configs() {
        let mut config = AppConfig::default();
        config.names.fallback.insert("A".into(), "Alpha".to_string());

        let loader = config.loader_config();
        assert_eq!(loader.max_concurrency, 8);
        assert_eq!(loader.fallback_names.len(), 1);

        let client = config.client_config();
        assert_eq!(client.timeout, Duration::from_secs(30));
        assert_eq!(client.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("http".parse::<SourceKind>().unwrap(), SourceKind::Http);
        assert_eq!("DIR".parse::<SourceKind>().unwrap(), SourceKind::Dir);
        assert!("ftp".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.names.fallback.insert("A".into(), "Alpha".to_string());
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(parsed.names.fallback.len(), 1);
    }
}
