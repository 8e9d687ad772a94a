//! App config command handlers.

use std::fmt::Write as _;

use teledash_core::app_settings::field_values;
use teledash_core::{AppConfig, ConfigDocument, Dashboard, SAVED_MESSAGE};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

// ── Detail view ─────────────────────────────────────────────────────

fn detail(config: &AppConfig, palette: Palette) -> String {
    let mut out = String::new();
    for (field, value) in field_values(config) {
        let name: &'static str = field.into();
        let _ = writeln!(out, "{:<18} {value}", palette.accent(name));
    }
    for (key, value) in &config.extra {
        let _ = writeln!(out, "{:<18} {}", palette.dim(key), palette.dim(&value.to_string()));
    }
    out.trim_end().to_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: SettingsArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let app = dashboard.app_settings().await?;
            let config = app.config();
            let out = output::render_single(
                &global.output,
                &config,
                |c| detail(c, palette),
                |c| format!("{}:{}", c.osc_addr, c.osc_port),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set { assignments } => {
            let app = dashboard.app_settings().await?;
            for raw in &assignments {
                let (name, value) = util::split_assignment(raw)?;
                app.set_field(name, value)
                    .map_err(util::lookup_error("setting", "settings show"))?;
            }
            app.save().await?;
            if !global.quiet {
                eprintln!("{}", palette.ok(SAVED_MESSAGE));
            }
            Ok(())
        }

        SettingsCommand::Import { from_file } => {
            let value = util::read_json_file(&from_file)?;
            let config: AppConfig = serde_json::from_value(value)?;
            if !util::confirm(
                &format!(
                    "Replace the bridge's app config with {}?",
                    from_file.display()
                ),
                global.yes,
            )? {
                return Ok(());
            }
            ConfigDocument::from_value(dashboard.client(), config)
                .save()
                .await?;
            if !global.quiet {
                eprintln!("{}", palette.ok(SAVED_MESSAGE));
            }
            Ok(())
        }
    }
}
