//! CLI configuration: thin wrapper around `teledash_config`.
//!
//! Re-exports the shared types and layers `GlobalOpts` flag overrides
//! (--bridge, --timeout) on top of the active profile.

use std::time::Duration;

use teledash_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use teledash_config::{
    Config, Profile, UiContext, config_path, load_config_or_default, profile_to_dashboard_config,
    save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `DashboardConfig` for this invocation.
///
/// Precedence: flag / env > profile > built-in default. An explicitly named
/// profile that does not exist is an error; a missing default profile is not.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<DashboardConfig, CliError> {
    let name = active_profile_name(global, cfg);

    let mut dashboard = match cfg.profiles.get(&name) {
        Some(profile) => profile_to_dashboard_config(profile, &cfg.defaults)?,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            });
        }
        None => profile_to_dashboard_config(&Profile::default(), &cfg.defaults)?,
    };

    if let Some(ref bridge) = global.bridge {
        url::Url::parse(bridge).map_err(|e| CliError::Validation {
            field: "bridge".into(),
            reason: format!("invalid URL {bridge:?}: {e}"),
        })?;
        dashboard.bridge_url.clone_from(bridge);
    }

    if let Some(secs) = global.timeout {
        dashboard.transport.timeout = Some(Duration::from_secs(secs));
    }

    tracing::debug!(profile = %name, bridge = %dashboard.bridge_url, "resolved bridge config");
    Ok(dashboard)
}

/// Comma-separated profile names, sorted, or "(none)".
pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}
