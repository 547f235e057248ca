mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variables that override secrets from the config file.
pub const ENV_TADDY_API_KEY: &str = "TADDY_API_KEY";
pub const ENV_TADDY_USER_ID: &str = "TADDY_USER_ID";
pub const ENV_PODCHASER_CREDENTIALS: &str = "PODCHASER_CREDENTIALS";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./podvault.toml",
        "~/.config/podvault/config.toml",
        "/etc/podvault/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay provider secrets from the process environment.
pub fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var(ENV_TADDY_API_KEY) {
        config.taddy.api_key = key;
    }
    if let Ok(user) = std::env::var(ENV_TADDY_USER_ID) {
        config.taddy.user_id = user;
    }
    if let Ok(creds) = std::env::var(ENV_PODCHASER_CREDENTIALS) {
        config.podchaser.credentials = creds;
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.cache.fresh_ttl_secs > config.cache.main_ttl_secs {
        anyhow::bail!(
            "cache.fresh_ttl_secs ({}) must not exceed cache.main_ttl_secs ({})",
            config.cache.fresh_ttl_secs,
            config.cache.main_ttl_secs
        );
    }

    if config.itunes.max_calls == 0 || config.itunes.period_secs == 0 {
        anyhow::bail!("itunes.max_calls and itunes.period_secs must be positive");
    }

    if config.refresh.queue_capacity == 0 {
        anyhow::bail!("refresh.queue_capacity must be positive");
    }

    if config.taddy.api_key.is_empty() || config.taddy.user_id.is_empty() {
        tracing::warn!("Taddy api_key or user_id not set; Taddy requests will likely fail");
    }

    if config.podchaser.credentials.trim().is_empty() {
        tracing::warn!(
            "Podchaser credentials not configured; set them as key1:secret1,key2:secret2"
        );
    }

    Ok(())
}
