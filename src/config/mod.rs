use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub notifications: NotificationConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

/// Endpoints of the downstream push/SMS/email providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub push_url: String,
    pub sms_url: String,
    pub email_url: String,
    pub api_token: Option<String>,
}

/// Default page size for job listings and history.
///
/// The upstream API never specified one; 20 per page (capped at 100) is the
/// documented default here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./booking-api.db".to_string(),
                max_connections: Some(10),
            },
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            notifications: NotificationConfig {
                push_url: "http://localhost:9200/push".to_string(),
                sms_url: "http://localhost:9200/sms".to_string(),
                email_url: "http://localhost:9200/email".to_string(),
                api_token: None,
            },
            pagination: PaginationConfig {
                default_per_page: 20,
                max_per_page: 100,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
