use serde::Deserialize;
use std::path::PathBuf;

/// Bridge (remote spreadsheet endpoint) configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BridgeConfig {
    /// Opaque HTTP endpoint entries are pushed to / pulled from
    pub endpoint_url: Option<String>,
}

impl BridgeConfig {
    pub fn is_configured(&self) -> bool {
        self.endpoint_url.is_some()
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: PathBuf,
    /// Bridge configuration
    pub bridge: BridgeConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: home.join(".harvestlog").join("harvestlog.db"),
            bridge: BridgeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        if let Ok(db_path) = std::env::var("HARVESTLOG_DATABASE_PATH") {
            config.database_path = PathBuf::from(db_path);
        }
        if let Ok(url) = std::env::var("HARVESTLOG_BRIDGE_URL") {
            config.bridge.endpoint_url = Some(url);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/harvestlog/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("harvestlog").join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
