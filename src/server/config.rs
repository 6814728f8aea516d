use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::platform::onebot;

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Platform whose account bindings and adapter are used.
    #[serde(default = "default_platform")]
    pub platform: String,

    #[serde(default)]
    pub onebot_api_url: Option<String>,

    #[serde(default)]
    pub onebot_access_token: Option<String>,

    #[serde(default = "default_ownership_check_timeout_secs")]
    pub ownership_check_timeout_secs: u64,

    /// Bearer token bot hosts must present to the filter endpoint. Unset leaves it open.
    #[serde(default)]
    pub bot_access_token: Option<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    platform: Option<String>,
    onebot_api_url: Option<String>,
    onebot_access_token: Option<String>,
    ownership_check_timeout_secs: Option<u64>,
    bot_access_token: Option<String>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_platform() -> String {
    onebot::PLATFORM_NAME.to_string()
}

fn default_ownership_check_timeout_secs() -> u64 {
    10
}

impl PartialServerConfig {
    fn from_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }

    /// Environment layer. Keys are the upper-cased field names (`DATABASE_URL`, ...);
    /// empty values count as unset.
    fn from_env_vars<I>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars.into_iter().filter(|(_, value)| !value.is_empty()))
            .map_err(|e| format!("Failed to load config from environment: {e}"))
    }

    /// Fields set in `self` win over `lower`.
    fn over(self, lower: PartialServerConfig) -> PartialServerConfig {
        PartialServerConfig {
            database_url: self.database_url.or(lower.database_url),
            listen_addr: self.listen_addr.or(lower.listen_addr),
            log_dir: self.log_dir.or(lower.log_dir),
            platform: self.platform.or(lower.platform),
            onebot_api_url: self.onebot_api_url.or(lower.onebot_api_url),
            onebot_access_token: self.onebot_access_token.or(lower.onebot_access_token),
            ownership_check_timeout_secs: self
                .ownership_check_timeout_secs
                .or(lower.ownership_check_timeout_secs),
            bot_access_token: self.bot_access_token.or(lower.bot_access_token),
        }
    }

    fn finish(self) -> Result<ServerConfig, String> {
        Ok(ServerConfig {
            database_url: self.database_url.ok_or("DATABASE_URL is required")?,
            listen_addr: self.listen_addr.unwrap_or_else(default_listen_addr),
            log_dir: self.log_dir.unwrap_or_else(default_log_dir),
            platform: self.platform.unwrap_or_else(default_platform),
            onebot_api_url: self.onebot_api_url,
            onebot_access_token: self.onebot_access_token,
            ownership_check_timeout_secs: self
                .ownership_check_timeout_secs
                .unwrap_or_else(default_ownership_check_timeout_secs),
            bot_access_token: self.bot_access_token,
        })
    }
}

impl ServerConfig {
    /// Loads `.env`, then the optional TOML file, then lets environment variables
    /// override anything the file set.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path) => PartialServerConfig::from_file(Path::new(path))?,
            None => PartialServerConfig::default(),
        };
        let env_config = PartialServerConfig::from_env_vars(env::vars())?;

        env_config.over(file_config).finish()
    }

    pub fn ownership_check_timeout(&self) -> Duration {
        Duration::from_secs(self.ownership_check_timeout_secs)
    }
}
