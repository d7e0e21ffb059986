mod types;

pub use types::*;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./hls-sink.toml",
        "~/.config/hls-sink/config.toml",
        "/etc/hls-sink/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_body_bytes == 0 {
        anyhow::bail!("server.max_body_bytes must be greater than 0");
    }

    HeaderName::try_from(config.server.url_header.as_str()).with_context(|| {
        format!(
            "server.url_header is not a valid header name: {:?}",
            config.server.url_header
        )
    })?;

    if config.storage.root.as_os_str().is_empty() {
        anyhow::bail!("storage.root cannot be empty");
    }

    if !config.storage.root.exists() {
        tracing::warn!(
            "Storage root does not exist yet, it will be created: {:?}",
            config.storage.root
        );
    }

    Ok(())
}
