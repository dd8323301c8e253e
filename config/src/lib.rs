//! Configuration for Cakewalk.
//!
//! Loaded from `~/.cakewalk/config.toml` (or `$CAKEWALK_CONFIG`). Every section
//! is optional; a missing file means defaults everywhere.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! reduced_motion = false
//! prefetch_wish = true
//!
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//!
//! [google]
//! model = "gemini-2.5-flash"
//! ```

use std::{env, path::Path, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

use cakewalk_types::{ApiKey, UiOptions};

/// Environment variables consulted for the Gemini key when the config has none.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Overrides the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "CAKEWALK_CONFIG";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct CakewalkConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub google: Option<GeminiConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for the cake, flame and confetti.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable flicker and confetti motion.
    #[serde(default)]
    pub reduced_motion: bool,
    /// Request a wish as soon as the session starts. Default: true.
    #[serde(default = "default_true")]
    pub prefetch_wish: bool,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

/// Google Gemini request settings.
///
/// ```toml
/// [google]
/// model = "gemini-2.5-flash"
/// base_url = "https://generativelanguage.googleapis.com/v1beta"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct GeminiConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

impl CakewalkConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        let app = self.app.as_ref();
        UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
            reduced_motion: app.is_some_and(|a| a.reduced_motion),
        }
    }

    #[must_use]
    pub fn prefetch_wish(&self) -> bool {
        self.app.as_ref().is_none_or(|a| a.prefetch_wish)
    }

    #[must_use]
    pub fn gemini_model(&self) -> Option<&str> {
        self.google.as_ref().and_then(|g| g.model.as_deref())
    }

    #[must_use]
    pub fn gemini_base_url(&self) -> Option<&str> {
        self.google.as_ref().and_then(|g| g.base_url.as_deref())
    }

    /// Resolve the Gemini key: config (with `${VAR}` expansion) first, then
    /// [`API_KEY_ENV_VARS`] in order.
    #[must_use]
    pub fn gemini_api_key(&self) -> Option<ApiKey> {
        let configured = self
            .api_keys
            .as_ref()
            .and_then(|keys| keys.google.as_deref())
            .map(expand_env_vars)
            .and_then(|raw| ApiKey::new(raw).ok());

        configured.or_else(api_key_from_env)
    }
}

fn api_key_from_env() -> Option<ApiKey> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find_map(|raw| ApiKey::new(raw).ok())
}

pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".cakewalk").join("config.toml"))
}
