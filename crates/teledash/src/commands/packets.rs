//! Packet forwarding command handlers.

use tabled::Tabled;

use teledash_core::{Dashboard, PacketEntry};

use crate::cli::{GlobalOpts, PacketsArgs, PacketsCommand};
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

#[derive(Tabled)]
struct PacketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Packet")]
    label: String,
    #[tabled(rename = "Forwarded")]
    enabled: String,
}

pub async fn handle(
    dashboard: &Dashboard,
    args: PacketsArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let packets = dashboard.packet_settings().await?;
    let not_found = util::lookup_error("packet id", "packets list");

    match args.command {
        PacketsCommand::List => {
            let entries = packets.entries();
            let out = output::render_list(
                &global.output,
                &entries,
                |e: &PacketEntry| PacketRow {
                    id: e.id.clone(),
                    label: e.label.clone(),
                    enabled: palette.switch(e.enabled),
                },
                |e| e.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PacketsCommand::Toggle { ids } => {
            let mut changes = Vec::with_capacity(ids.len());
            for id in &ids {
                let enabled = packets.toggle(id).map_err(&not_found)?;
                changes.push((id, enabled));
            }
            packets.save().await?;
            if !global.quiet {
                for (id, enabled) in changes {
                    eprintln!(
                        "{} {}",
                        palette.accent(&teledash_core::packet_label(id)),
                        palette.switch(enabled)
                    );
                }
            }
            Ok(())
        }

        PacketsCommand::Set { id, state } => {
            packets.set(&id, state.is_on()).map_err(not_found)?;
            packets.save().await?;
            if !global.quiet {
                eprintln!(
                    "{} {}",
                    palette.accent(&teledash_core::packet_label(&id)),
                    palette.switch(state.is_on())
                );
            }
            Ok(())
        }
    }
}
