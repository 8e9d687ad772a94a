mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use teledash_core::Dashboard;

use crate::cli::{Cli, Command};
use crate::config::UiContext;
use crate::error::CliError;
use crate::output::Palette;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // The UI context is read once; only `theme toggle` changes it.
    let mut ui = UiContext::load();

    match cli.command {
        // Local-only commands don't need the bridge
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Theme(args) => commands::theme::handle(args, &mut ui, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "teledash", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config_or_default();
            let dashboard = Dashboard::new(config::resolve(&cli.global, &cfg)?)?;
            let palette = Palette::new(ui.theme(), &cli.global.color);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &dashboard, &cli.global, palette).await
        }
    }
}
