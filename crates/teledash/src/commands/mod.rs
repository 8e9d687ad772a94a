//! Command dispatch: bridges CLI args -> core settings views -> output formatting.

pub mod config_cmd;
pub mod fields;
pub mod live;
pub mod osc;
pub mod packets;
pub mod restart;
pub mod settings;
pub mod theme;
pub mod util;
pub mod version;

use teledash_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::Palette;

/// Dispatch a bridge-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    match cmd {
        Command::Settings(args) => settings::handle(dashboard, args, global, palette).await,
        Command::Osc(args) => osc::handle(dashboard, args, global, palette).await,
        Command::Packets(args) => packets::handle(dashboard, args, global, palette).await,
        Command::Fields(args) => fields::handle(dashboard, args, global, palette).await,
        Command::Restart(args) => restart::handle(dashboard, args, global, palette).await,
        Command::Live(args) => live::handle(dashboard, args, global, palette).await,
        Command::Version => version::handle(dashboard, global, palette).await,
        // Handled before a bridge connection is built
        Command::Theme(_) | Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
