//! Configuration loader
//!
//! Loads [`ClientSettings`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `ADTKIT_SAP_URL` is missing, falls back to loading from file
//! 3. Probes the working directory and its ancestors for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `ADTKIT_SAP_URL`: SAP system URL (required for the env source)
//! - `ADTKIT_SAP_CLIENT`: SAP client number
//! - `ADTKIT_REQUEST_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `ADTKIT_LONG_POLL_TIMEOUT_MS`: Long-polling read timeout in milliseconds
//! - `ADTKIT_SESSION_TYPE`: `stateful` or `stateless`
//! - `ADTKIT_TOKEN_SKEW_SECS`: Seconds before expiry at which tokens refresh
//! - `ADTKIT_USER_AGENT`: `User-Agent` of outgoing requests
//!
//! ## File Locations
//! In each directory from the working directory up to the filesystem root,
//! in order: `adtkit.json`, `adtkit.toml`, `config.json`, `config.toml`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use adtkit_domain::{AdtError, ClientSettings, Result, SessionType};

const CONFIG_FILE_NAMES: [&str; 4] = ["adtkit.json", "adtkit.toml", "config.json", "config.toml"];

/// Load settings with automatic fallback strategy
///
/// # Errors
/// Returns `AdtError::Config` if neither source yields valid settings.
pub fn load() -> Result<ClientSettings> {
    match load_from_env() {
        Ok(settings) => {
            tracing::info!("Settings loaded from environment variables");
            Ok(settings)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load settings from `ADTKIT_*` environment variables
///
/// `ADTKIT_SAP_URL` is required; every other variable falls back to the
/// default.
///
/// # Errors
/// Returns `AdtError::Config` if the URL is missing or a value is invalid.
pub fn load_from_env() -> Result<ClientSettings> {
    let defaults = ClientSettings::default();

    let settings = ClientSettings {
        sap_url: Some(env_var("ADTKIT_SAP_URL")?),
        sap_client: optional_env("ADTKIT_SAP_CLIENT"),
        request_timeout_ms: env_parse("ADTKIT_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?,
        long_poll_timeout_ms: env_parse(
            "ADTKIT_LONG_POLL_TIMEOUT_MS",
            defaults.long_poll_timeout_ms,
        )?,
        session_type: optional_env("ADTKIT_SESSION_TYPE")
            .map(|value| SessionType::from_str(&value))
            .transpose()?
            .unwrap_or(defaults.session_type),
        token_skew_secs: env_parse("ADTKIT_TOKEN_SKEW_SECS", defaults.token_skew_secs)?,
        user_agent: optional_env("ADTKIT_USER_AGENT").unwrap_or(defaults.user_agent),
    };

    settings.validate()?;
    Ok(settings)
}

/// Load settings from a file
///
/// If `path` is `None`, probes for config files with
/// [`probe_config_paths`]. Format is detected by file extension.
///
/// # Errors
/// Returns `AdtError::Config` if the file is missing, unreadable, malformed
/// or describes invalid settings.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientSettings> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AdtError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AdtError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading settings from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AdtError::Config(format!("Failed to read config file: {e}")))?;

    let settings = parse_settings(&contents, &config_path)?;
    settings.validate()?;
    Ok(settings)
}

fn parse_settings(contents: &str, path: &Path) -> Result<ClientSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AdtError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AdtError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AdtError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First config file found from the working directory upward.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| AdtError::Config(format!("Missing required environment variable: {key}")))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| AdtError::Config(format!("Invalid value for {key}: {e}"))),
        None => Ok(default),
    }
}
