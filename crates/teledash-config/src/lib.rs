//! Shared configuration for teledash.
//!
//! TOML profiles, the UI theme preference, and translation to
//! `teledash_core::DashboardConfig`. The CLI layers its flag overrides on
//! top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use teledash_core::{BackoffConfig, DashboardConfig, ReconnectPolicy, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub ui: Ui,

    /// Named bridge profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            ui: Ui::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// UI preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Ui {
    #[serde(default)]
    pub theme: Theme,
}

/// Color theme. Anything other than `light` reads as `dark`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl Serialize for Theme {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// A named bridge profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Bridge base URL (e.g., "http://localhost:1337").
    #[serde(default = "default_bridge")]
    pub bridge: String,

    /// Live telemetry WebSocket path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_path: Option<String>,

    /// Override request timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Reconnect the live stream with backoff after it drops.
    #[serde(default)]
    pub reconnect: bool,

    /// Give up reconnecting after this many attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconnect_max_retries: Option<u32>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            bridge: default_bridge(),
            ws_path: None,
            timeout: None,
            reconnect: false,
            reconnect_max_retries: None,
        }
    }
}

fn default_bridge() -> String {
    DashboardConfig::DEFAULT_BRIDGE_URL.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "teledash", "teledash").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("teledash");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Environment keys the CLI reads as flags; not config keys.
const FLAG_ENV_KEYS: &[&str] = &["profile", "bridge", "output", "timeout", "color"];

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged with `TELEDASH_*` environment variables.
///
/// Nested keys use a double underscore: `TELEDASH_UI__THEME=light`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("TELEDASH_")
                .ignore(FLAG_ENV_KEYS)
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load `path` alone, without environment overrides.
///
/// Used before rewriting the file so `TELEDASH_*` values never get saved.
fn load_file_config(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── UI context ──────────────────────────────────────────────────────

/// Process-wide UI state: read once at startup, changed only through
/// [`toggle_theme`](Self::toggle_theme), persisted on change.
#[derive(Debug, Clone)]
pub struct UiContext {
    theme: Theme,
    path: PathBuf,
}

impl UiContext {
    /// Read the persisted preference from the canonical config file.
    pub fn load() -> Self {
        Self::load_from(config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let theme = load_config_from(&path)
            .map(|cfg| cfg.ui.theme)
            .unwrap_or_default();
        Self { theme, path }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip between dark and light and persist the choice.
    pub fn toggle_theme(&mut self) -> Result<Theme, ConfigError> {
        let mut cfg = load_file_config(&self.path)?;
        let next = self.theme.toggled();
        cfg.ui.theme = next;
        save_config_to(&cfg, &self.path)?;
        self.theme = next;
        Ok(next)
    }
}

// ── Profile → DashboardConfig ───────────────────────────────────────

/// Build a `DashboardConfig` from a profile, no CLI overrides.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    url::Url::parse(&profile.bridge).map_err(|e| ConfigError::Validation {
        field: "bridge".into(),
        reason: format!("invalid URL {:?}: {e}", profile.bridge),
    })?;

    let mut transport = TransportConfig::default();
    if let Some(secs) = profile.timeout.or(defaults.timeout) {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    let reconnect = if profile.reconnect {
        ReconnectPolicy::Backoff(BackoffConfig {
            max_retries: profile.reconnect_max_retries,
            ..BackoffConfig::default()
        })
    } else {
        ReconnectPolicy::Never
    };

    Ok(DashboardConfig {
        bridge_url: profile.bridge.clone(),
        ws_path: profile
            .ws_path
            .clone()
            .unwrap_or_else(|| DashboardConfig::DEFAULT_WS_PATH.into()),
        transport,
        reconnect,
    })
}
