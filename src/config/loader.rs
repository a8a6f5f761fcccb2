//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {name} environment value '{value}'")]
    Env { name: &'static str, value: String },

    #[error("validation failed: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "))]
    Validation(Vec<ValidationError>),
}

/// Environment overrides recognized by the gateway.
///
/// Kept as an explicit value so override logic is testable without
/// touching process-global environment state.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    /// `PORT` — overrides the port of the listener bind address.
    pub port: Option<String>,
    /// `OCR_NLP_BASE` — overrides the upstream base URL.
    pub backend_base: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT").ok(),
            backend_base: std::env::var("OCR_NLP_BASE").ok(),
        }
    }
}

/// Load, override, and validate the gateway configuration.
///
/// With no file path the defaults are used, so the gateway starts with
/// nothing but environment variables set.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config: GatewayConfig = match path {
        Some(p) => toml::from_str(&fs::read_to_string(p)?)?,
        None => GatewayConfig::default(),
    };

    apply_overrides(&mut config, &EnvOverrides::from_env())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_overrides(config: &mut GatewayConfig, env: &EnvOverrides) -> Result<(), ConfigError> {
    if let Some(port) = &env.port {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            name: "PORT",
            value: port.clone(),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        config.listener.bind_address = format!("{host}:{port}");
    }

    if let Some(base) = &env.backend_base {
        config.upstream.base_url = base.clone();
    }

    Ok(())
}
