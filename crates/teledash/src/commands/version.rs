//! Version handler.

use serde::Serialize;

use teledash_core::Dashboard;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Palette};

#[derive(Serialize)]
struct VersionReport {
    client: &'static str,
    bridge: String,
}

pub async fn handle(
    dashboard: &Dashboard,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let bridge = dashboard.version().await?;
    let report = VersionReport {
        client: env!("CARGO_PKG_VERSION"),
        bridge: bridge.version,
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| {
            format!(
                "{:<8} {}\n{:<8} {}",
                palette.accent("client"),
                r.client,
                palette.accent("bridge"),
                r.bridge
            )
        },
        |r| r.bridge.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
