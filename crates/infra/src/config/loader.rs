//! Configuration loader
//!
//! Loads the suite configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Probes multiple paths for config files (JSON and TOML)
//!
//! ## Environment Variables
//! - `PROJECT_ID`: Project the clusters are ordered in (required)
//! - `AUTH_URL`: Token endpoint (required)
//! - `AUTH_CLIENT_ID`: Service account client id (required)
//! - `AUTH_CLIENT_SECRET`: Service account secret (required)
//! - `AUTH_GRANT`: Grant type, default `client_credentials`
//! - `BASE_URL`: Control-plane base URL, default `https://api.t1.cloud`
//! - `DBAAS_REGION`: `region1` or `region2`, default `region1`
//! - `DBAAS_HTTP_TIMEOUT`: Per-request timeout in seconds
//!
//! ## File Locations
//! The loader probes `dbaas.toml`, `dbaas.json`, `config.toml` and
//! `config.json` in the working directory, its parent and grandparent,
//! then next to the executable. A file may omit `auth.client_secret`; it
//! is then taken from `AUTH_CLIENT_SECRET`.

use std::path::{Path, PathBuf};

use dbaas_domain::{AuthConfig, DbaasError, RegionKey, Result, SuiteConfig};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] = ["dbaas.toml", "dbaas.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `DbaasError::Config` if neither source yields a complete,
/// valid configuration.
pub fn load() -> Result<SuiteConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "dotenv_loaded"),
        Err(e) => tracing::debug!(error = %e, "dotenv_not_loaded"),
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("config_loaded_from_env");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "config_env_incomplete_trying_file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `DbaasError::Config` if required variables are missing or
/// have invalid values.
pub fn load_from_env() -> Result<SuiteConfig> {
    let project_id = env_var("PROJECT_ID")?;
    let mut auth = AuthConfig::new(
        env_var("AUTH_URL")?,
        env_var("AUTH_CLIENT_ID")?,
        env_var("AUTH_CLIENT_SECRET")?,
    );
    if let Some(grant) = optional_env("AUTH_GRANT") {
        auth.grant_type = grant;
    }

    let mut config = SuiteConfig::new(project_id, auth);
    if let Some(base_url) = optional_env("BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(region) = optional_env("DBAAS_REGION") {
        config.region = region.parse::<RegionKey>()?;
    }
    if let Some(timeout) = optional_env("DBAAS_HTTP_TIMEOUT") {
        config.http.timeout_seconds = timeout
            .parse()
            .map_err(|e| DbaasError::Config(format!("Invalid DBAAS_HTTP_TIMEOUT: {e}")))?;
    }

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations via
/// [`probe_config_paths`]. Format is detected by extension.
///
/// # Errors
/// Returns `DbaasError::Config` if the file is missing, malformed or
/// incomplete.
pub fn load_from_file(path: Option<PathBuf>) -> Result<SuiteConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DbaasError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DbaasError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "config_loading_from_file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DbaasError::Config(format!("Failed to read config file: {e}")))?;

    let mut config = parse_config(&contents, &config_path)?;
    if config.auth.client_secret.is_empty() {
        if let Some(secret) = optional_env("AUTH_CLIENT_SECRET") {
            config.auth.client_secret = secret;
        }
    }
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content, by file extension
fn parse_config(contents: &str, path: &Path) -> Result<SuiteConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DbaasError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DbaasError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(DbaasError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Reject configurations the transport could not use
fn validate(config: &SuiteConfig) -> Result<()> {
    if config.project_id.trim().is_empty() {
        return Err(DbaasError::Config("project_id must not be empty".to_string()));
    }
    if config.auth.client_secret.is_empty() {
        return Err(DbaasError::Config("auth client secret is not set".to_string()));
    }
    for (name, value) in [("base_url", &config.base_url), ("auth.url", &config.auth.url)] {
        Url::parse(value).map_err(|e| DbaasError::Config(format!("Invalid {name} '{value}': {e}")))?;
    }
    Ok(())
}

/// Get required environment variable
///
/// # Errors
/// Returns `DbaasError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| DbaasError::Config(format!("Missing required environment variable: {key}")))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
