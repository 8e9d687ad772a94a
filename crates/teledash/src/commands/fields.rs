//! Telemetry field command handlers.

use serde::Serialize;
use tabled::Tabled;

use teledash_core::Dashboard;

use crate::cli::{FieldsArgs, FieldsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

#[derive(Serialize)]
struct FieldItem {
    field: String,
    enabled: bool,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Published")]
    enabled: String,
}

pub async fn handle(
    dashboard: &Dashboard,
    args: FieldsArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let fields = dashboard.field_settings().await?;

    match args.command {
        FieldsCommand::List => {
            let items: Vec<FieldItem> = fields
                .entries()
                .into_iter()
                .map(|(field, enabled)| FieldItem { field, enabled })
                .collect();
            let out = output::render_list(
                &global.output,
                &items,
                |i| FieldRow {
                    field: i.field.clone(),
                    enabled: palette.switch(i.enabled),
                },
                |i| i.field.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FieldsCommand::Toggle { fields: names } => {
            let not_found = util::lookup_error("field", "fields list");
            let mut changes = Vec::with_capacity(names.len());
            for name in &names {
                changes.push((name, fields.toggle(name).map_err(&not_found)?));
            }
            fields.save().await?;
            if !global.quiet {
                for (name, enabled) in changes {
                    eprintln!("{} {}", palette.accent(name), palette.switch(enabled));
                }
            }
            Ok(())
        }
    }
}
