mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Default search locations, first match wins.
pub const DEFAULT_PATHS: [&str; 3] = [
    "./probekit.toml",
    "~/.config/probekit/config.toml",
    "/etc/probekit/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    tracing::debug!("Loaded config from {:?}", path);
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.ffprobe.timeout_secs == 0 {
        anyhow::bail!("ffprobe.timeout_secs must be greater than 0");
    }

    if let Some(path) = &config.ffprobe.path {
        if !path.exists() {
            tracing::warn!("Configured ffprobe path does not exist: {:?}", path);
        }
    }

    Ok(())
}
