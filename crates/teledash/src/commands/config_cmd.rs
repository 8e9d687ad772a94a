//! Config subcommand handlers.

use std::collections::HashMap;
use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Select};

use teledash_config::{Defaults, Theme, Ui};
use teledash_core::DashboardConfig;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text, profiles sorted by name.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    if let Some(timeout) = cfg.defaults.timeout {
        let _ = writeln!(out, "timeout = {timeout}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[ui]");
    let _ = writeln!(out, "theme = \"{}\"", cfg.ui.theme);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "bridge = \"{}\"", p.bridge);
        if let Some(ref ws) = p.ws_path {
            let _ = writeln!(out, "ws_path = \"{ws}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        let _ = writeln!(out, "reconnect = {}", p.reconnect);
        if let Some(max) = p.reconnect_max_retries {
            let _ = writeln!(out, "reconnect_max_retries = {max}");
        }
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("teledash configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let bridge: String = Input::new()
                .with_prompt("Bridge URL")
                .default(DashboardConfig::DEFAULT_BRIDGE_URL.into())
                .validate_with(|s: &String| -> Result<(), String> {
                    url::Url::parse(s).map(drop).map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let ws_path: String = Input::new()
                .with_prompt("Live telemetry path")
                .default(DashboardConfig::DEFAULT_WS_PATH.into())
                .interact_text()
                .map_err(prompt_err)?;

            let reconnect = Confirm::new()
                .with_prompt("Reconnect the live stream when it drops?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            let themes = [Theme::Dark, Theme::Light];
            let theme_idx = Select::new()
                .with_prompt("Theme")
                .items(&["dark", "light"])
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                bridge,
                ws_path: (ws_path != DashboardConfig::DEFAULT_WS_PATH).then_some(ws_path),
                timeout: None,
                reconnect,
                reconnect_max_retries: None,
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                ui: Ui {
                    theme: themes.get(theme_idx).copied().unwrap_or_default(),
                },
                profiles,
            };

            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: teledash version");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                config::active_profile_name(global, c)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
