//! Service restart handler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use teledash_core::{Dashboard, ServiceId};

use crate::cli::{GlobalOpts, RestartArgs, ServiceArg};
use crate::error::CliError;
use crate::output::Palette;

impl From<ServiceArg> for ServiceId {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Udp => Self::Udp,
            ServiceArg::Osc => Self::Osc,
            ServiceArg::All => Self::All,
        }
    }
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

pub async fn handle(
    dashboard: &Dashboard,
    args: RestartArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let trigger = dashboard.restart_trigger(args.service.into());
    let service = trigger.service();

    let bar = spinner(format!("Restarting {service}..."), global.quiet);
    let result = trigger.trigger().await;
    bar.finish_and_clear();

    tracing::debug!(status = %trigger.status(), "restart finished");
    match result {
        Ok(()) => {
            if !global.quiet {
                eprintln!("{} {service} restarted", palette.ok("✓"));
            }
            Ok(())
        }
        Err(e) => {
            if !global.quiet {
                eprintln!("{} {service} restart failed", palette.error("✗"));
            }
            Err(e.into())
        }
    }
}
