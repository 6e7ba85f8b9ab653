//! Application configuration: serde model, YAML loading, environment
//! overrides and validation.

use crate::error::{AppError, Result};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token granting the manage-settings capability. With no token
    /// configured, every authorized operation is denied.
    #[serde(default, skip_serializing)]
    pub admin_token: Option<Secret<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_token: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8080
}

/// Load configuration from file (when present) and environment variables.
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);
    validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|_| AppError::ConfigNotFound {
        path: config_path.display().to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
        message: format!("Failed to parse config file: {e}"),
    })
}

fn override_with_env(config: &mut AppConfig) {
    if let Ok(host) = std::env::var("HOST") {
        info!("Overriding server host from environment variable");
        config.server.host = host;
    }

    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse::<u16>() {
            info!("Overriding server port from environment variable: {}", port);
            config.server.port = port;
        } else {
            warn!("Invalid PORT environment variable: {}", port_str);
        }
    }

    if let Ok(token) = std::env::var("ADMIN_TOKEN") {
        info!("Overriding admin token from environment variable");
        config.server.admin_token = Some(Secret::new(token));
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(AppError::config_validation(
            "server port must be non-zero",
            Some("server.port"),
        ));
    }

    if let Some(token) = &config.server.admin_token {
        if token.expose_secret().is_empty() {
            return Err(AppError::config_validation(
                "admin token must not be empty when set",
                Some("server.admin_token"),
            ));
        }
    }

    Ok(())
}
