//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Rgb};
use tabled::{Table, Tabled, settings::Style};

use teledash_config::Theme;

use crate::cli::{ColorMode, OutputFormat};

// ── Palette ──────────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

struct Colors {
    accent: Rgb,
    ok: Rgb,
    warn: Rgb,
    error: Rgb,
    dim: Rgb,
}

const DARK: Colors = Colors {
    accent: Rgb(128, 255, 234), // #80ffea
    ok: Rgb(80, 250, 123),      // #50fa7b
    warn: Rgb(241, 250, 140),   // #f1fa8c
    error: Rgb(255, 99, 99),    // #ff6363
    dim: Rgb(189, 193, 207),    // #bdc1cf
};

const LIGHT: Colors = Colors {
    accent: Rgb(0, 122, 204), // #007acc
    ok: Rgb(22, 128, 58),     // #16803a
    warn: Rgb(176, 112, 0),   // #b07000
    error: Rgb(200, 30, 30),  // #c81e1e
    dim: Rgb(96, 100, 112),   // #606470
};

/// Semantic colors for the active theme. A disabled palette returns text unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    theme: Theme,
    enabled: bool,
}

impl Palette {
    pub fn new(theme: Theme, mode: &ColorMode) -> Self {
        Self {
            theme,
            enabled: should_color(mode),
        }
    }

    fn colors(self) -> &'static Colors {
        match self.theme {
            Theme::Dark => &DARK,
            Theme::Light => &LIGHT,
        }
    }

    fn paint(self, text: &str, pick: fn(&Colors) -> Rgb) -> String {
        if self.enabled {
            text.color(pick(self.colors())).to_string()
        } else {
            text.to_owned()
        }
    }

    pub fn accent(self, text: &str) -> String {
        self.paint(text, |c| c.accent)
    }

    pub fn ok(self, text: &str) -> String {
        self.paint(text, |c| c.ok)
    }

    pub fn warn(self, text: &str) -> String {
        self.paint(text, |c| c.warn)
    }

    pub fn error(self, text: &str) -> String {
        self.paint(text, |c| c.error)
    }

    pub fn dim(self, text: &str) -> String {
        self.paint(text, |c| c.dim)
    }

    /// `on` / `off` marker for a boolean setting.
    pub fn switch(self, enabled: bool) -> String {
        if enabled {
            self.ok("on")
        } else {
            self.dim("off")
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are key/value
/// text rather than a `Tabled` row.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: &'static str,
        on: bool,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: "0", on: true }, Item { id: "6", on: false }]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        );
        assert_eq!(out, "0\n6");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        );
        assert_eq!(out, r#"[{"id":"0","on":true},{"id":"6","on":false}]"#);
    }

    #[test]
    fn table_has_header() {
        let out = render_list(
            &OutputFormat::Table,
            &items(),
            |i| ItemRow { id: i.id.into() },
            |i| i.id.into(),
        );
        assert!(out.contains("ID"));
        assert!(out.contains('6'));
    }

    #[test]
    fn disabled_palette_is_plain_text() {
        let palette = Palette::new(Theme::Light, &ColorMode::Never);
        assert_eq!(palette.switch(true), "on");
        assert_eq!(palette.accent("Speed"), "Speed");
    }

    #[test]
    fn enabled_palette_emits_escapes() {
        let palette = Palette::new(Theme::Dark, &ColorMode::Always);
        assert!(palette.ok("on").contains("\u{1b}["));
    }
}
