use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, time::Duration};

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sheet: SheetConfig,
    pub menu_site: MenuSiteConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl SheetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuSiteConfig {
    pub base_url: String,
    pub menu_path: String,
    pub timeout_secs: u64,
}

impl MenuSiteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            cutoff_hour: default_cutoff_hour(),
        }
    }
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_cutoff_hour() -> u8 {
    lunchbook_schedule::DEFAULT_CUTOFF_HOUR
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub password: String,
    pub jwt_secret: String,
    pub session_days: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (LUNCHBOOK__SHEET__URL, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite:lunchbook.db")?
            .set_default("database.max_connections", 5)?
            .set_default("sheet.url", "")?
            .set_default("sheet.timeout_secs", 10)?
            .set_default("menu_site.base_url", "")?
            .set_default("menu_site.menu_path", "/menu")?
            .set_default("menu_site.timeout_secs", 20)?
            .set_default("admin.password", "")?
            .set_default("admin.jwt_secret", "")?
            .set_default("admin.session_days", 7)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("LUNCHBOOK")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }
        if self.sheet.url.is_empty() {
            return Err("Sheet url must be set".to_string());
        }
        if self.menu_site.base_url.is_empty() {
            return Err("Menu site base_url must be set".to_string());
        }
        for (name, secs) in [
            ("sheet", self.sheet.timeout_secs),
            ("menu_site", self.menu_site.timeout_secs),
        ] {
            if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
                return Err(format!(
                    "{name}.timeout_secs must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}"
                ));
            }
        }
        if self.schedule.cutoff_hour > 23 {
            return Err("Schedule cutoff_hour must be between 0 and 23".to_string());
        }
        if self.admin.password.is_empty() {
            return Err("Admin password must be set".to_string());
        }
        if self.admin.jwt_secret.len() < 32 {
            return Err("Admin jwt_secret must be at least 32 characters long".to_string());
        }
        if self.admin.session_days < 1 {
            return Err("Admin session_days must be at least 1".to_string());
        }
        Ok(())
    }
}
