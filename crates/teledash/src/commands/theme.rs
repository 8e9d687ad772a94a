//! Theme handlers. The theme lives in `UiContext`, loaded once at startup.

use serde::Serialize;

use teledash_config::UiContext;

use crate::cli::{GlobalOpts, ThemeArgs, ThemeCommand};
use crate::error::CliError;
use crate::output::{self, Palette};

#[derive(Serialize)]
struct ThemeReport {
    theme: String,
}

pub fn handle(args: ThemeArgs, ui: &mut UiContext, global: &GlobalOpts) -> Result<(), CliError> {
    let theme = match args.command.unwrap_or(ThemeCommand::Show) {
        ThemeCommand::Show => ui.theme(),
        ThemeCommand::Toggle => {
            let next = ui.toggle_theme()?;
            tracing::info!(theme = %next, "theme changed");
            next
        }
    };

    let palette = Palette::new(theme, &global.color);
    let report = ThemeReport {
        theme: theme.to_string(),
    };
    let out = output::render_single(
        &global.output,
        &report,
        |r| palette.accent(&r.theme),
        |r| r.theme.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
