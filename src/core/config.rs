//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.convo/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiVariant;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConvoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_url: Option<String>,
    pub api_variant: Option<ApiVariant>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub narrow_width: Option<u16>,
    pub toast_ms: Option<u64>,
    pub error_toast_ms: Option<u64>,
    pub show_sidebar: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NARROW_WIDTH: u16 = 100;
pub const DEFAULT_TOAST_MS: u64 = 2000;
pub const DEFAULT_ERROR_TOAST_MS: u64 = 5000;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub api_variant: ApiVariant,
    pub request_timeout: Duration,
    pub toast_ttl: Duration,
    pub error_toast_ttl: Duration,
    pub narrow_width: u16,
    pub show_sidebar: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.convo/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".convo").join("config.toml"))
}

/// Load config from `~/.convo/config.toml`, or from `explicit` when given.
///
/// If the file doesn't exist, generates a commented-out default (home path
/// only) and returns `ConvoConfig::default()`. If it exists but is
/// malformed, returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<ConvoConfig, ConfigError> {
    let path = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ConvoConfig::default());
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file {} not found, using defaults", path.display());
        } else {
            info!("No config file found, generating default at {}", path.display());
            generate_default_config(&path);
        }
        return Ok(ConvoConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<ConvoConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Convo Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_url = "http://localhost:5000"   # Or CONVO_BASE_URL / --base-url
# api_variant = "legacy"               # "legacy" or "rest"; CONVO_API_VARIANT / --variant
# request_timeout_secs = 30            # Or CONVO_REQUEST_TIMEOUT

# [ui]
# narrow_width = 100                   # Below this many columns the sidebar starts collapsed
# toast_ms = 2000                      # How long success notices stay up
# error_toast_ms = 5000                # How long error notices stay up
# show_sidebar = true
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_variant` are from CLI flags (None = not specified).
pub fn resolve(
    config: &ConvoConfig,
    cli_base_url: Option<&str>,
    cli_variant: Option<ApiVariant>,
) -> ResolvedConfig {
    resolve_with_env(config, cli_base_url, cli_variant, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with the environment lookup injected.
pub fn resolve_with_env(
    config: &ConvoConfig,
    cli_base_url: Option<&str>,
    cli_variant: Option<ApiVariant>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| env("CONVO_BASE_URL"))
        .or_else(|| config.general.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Variant: CLI → env → config → default
    let env_variant = env("CONVO_API_VARIANT").and_then(|raw| {
        let parsed = ApiVariant::parse(&raw);
        if parsed.is_none() {
            warn!("Ignoring CONVO_API_VARIANT={:?}: expected legacy or rest", raw);
        }
        parsed
    });
    let api_variant = cli_variant
        .or(env_variant)
        .or(config.general.api_variant)
        .unwrap_or_default();

    // Timeout: env → config → default
    let env_timeout = env("CONVO_REQUEST_TIMEOUT").and_then(|raw| match raw.trim().parse() {
        Ok(secs) => Some(secs),
        Err(_) => {
            warn!("Ignoring CONVO_REQUEST_TIMEOUT={:?}: not a number of seconds", raw);
            None
        }
    });
    let timeout_secs = env_timeout
        .or(config.general.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        .max(1);

    ResolvedConfig {
        base_url,
        api_variant,
        request_timeout: Duration::from_secs(timeout_secs),
        toast_ttl: Duration::from_millis(config.ui.toast_ms.unwrap_or(DEFAULT_TOAST_MS)),
        error_toast_ttl: Duration::from_millis(
            config.ui.error_toast_ms.unwrap_or(DEFAULT_ERROR_TOAST_MS),
        ),
        narrow_width: config.ui.narrow_width.unwrap_or(DEFAULT_NARROW_WIDTH),
        show_sidebar: config.ui.show_sidebar.unwrap_or(true),
    }
}
