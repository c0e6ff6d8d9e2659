//! Runtime configuration, read once at startup.
//!
//! The backend base URL comes from `FLASK_URL`. A `.env` file in the working
//! directory may supply the same keys; real environment variables win.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use url::Url;

pub const BASE_URL_VAR: &str = "FLASK_URL";
pub const HTML_SNAPSHOT_VAR: &str = "DASHBOARD_HTML";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingBaseUrl,
    InvalidBaseUrl { value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingBaseUrl => {
                write!(f, "{} is not set (export it or add it to .env)", BASE_URL_VAR)
            }
            ConfigError::InvalidBaseUrl { value, reason } => {
                write!(f, "{}={:?} is not a usable backend URL: {}", BASE_URL_VAR, value, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    pub color: bool,
    pub html_snapshot: Option<String>,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let dotenv = DotEnv::load(".env");
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key)))
    }

    /// Build from an arbitrary key lookup. `from_env` layers the process
    /// environment over `.env`; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(BASE_URL_VAR).ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = normalize_base_url(&raw)?;
        Ok(Self {
            base_url,
            color: lookup("NO_COLOR").map(|v| v.is_empty()).unwrap_or(true),
            html_snapshot: lookup(HTML_SNAPSHOT_VAR).filter(|v| !v.trim().is_empty()),
        })
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            color: false,
            html_snapshot: None,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme {:?}", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Minimal `.env` reader: `KEY=VALUE` lines, `#` comments, optional
/// `export ` prefix and matching quotes around the value.
#[derive(Debug, Default, Clone)]
pub struct DotEnv {
    vars: HashMap<String, String>,
}

impl DotEnv {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(text: &str) -> Self {
        let mut vars = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

fn unquote(value: &str) -> &str {
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
