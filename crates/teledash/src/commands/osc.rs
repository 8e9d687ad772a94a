//! OSC address command handlers.

use serde::Serialize;
use tabled::Tabled;

use teledash_core::{AddressGroup, Dashboard, GroupMember, TriState};

use crate::cli::{GlobalOpts, OscArgs, OscCommand};
use crate::error::CliError;
use crate::output::{self, Palette};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

/// One address with the group it was sorted into.
#[derive(Serialize)]
struct AddressItem {
    group: String,
    #[serde(flatten)]
    member: GroupMember,
}

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Zeros")]
    allow_zero: String,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "")]
    check: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Group")]
    label: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

fn check_mark(state: TriState) -> &'static str {
    match state {
        TriState::Checked => "[x]",
        TriState::Indeterminate => "[-]",
        TriState::Unchecked => "[ ]",
    }
}

fn group_row(group: &AddressGroup, palette: Palette) -> GroupRow {
    let check = check_mark(group.tri_state());
    GroupRow {
        check: match group.tri_state() {
            TriState::Checked => palette.ok(check),
            TriState::Indeterminate => palette.warn(check),
            TriState::Unchecked => palette.dim(check),
        },
        key: group.key.clone(),
        label: group.label.clone(),
        enabled: format!("{}/{}", group.enabled_count(), group.members.len()),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: OscArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let osc = dashboard.osc_settings().await?;
    let not_found = util::lookup_error("OSC address", "osc list");

    match args.command {
        OscCommand::List => {
            let items: Vec<AddressItem> = osc
                .groups()
                .into_iter()
                .flat_map(|g| {
                    let label = g.label;
                    g.members.into_iter().map(move |member| AddressItem {
                        group: label.clone(),
                        member,
                    })
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &items,
                |i| AddressRow {
                    group: i.group.clone(),
                    key: i.member.key.clone(),
                    address: i.member.address.clone(),
                    enabled: palette.switch(i.member.enabled),
                    allow_zero: if i.member.allow_zero {
                        "allowed".into()
                    } else {
                        String::new()
                    },
                },
                |i| i.member.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OscCommand::Groups => {
            let groups = osc.groups();
            let out = output::render_list(
                &global.output,
                &groups,
                |g| group_row(g, palette),
                |g| g.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OscCommand::Toggle { key } => {
            let enabled = osc.toggle(&key).await.map_err(not_found)?;
            if !global.quiet {
                eprintln!("{} {}", palette.accent(&key), palette.switch(enabled));
            }
            Ok(())
        }

        OscCommand::AllowZero { key } => {
            let allowed = osc.toggle_allow_zero(&key).await.map_err(not_found)?;
            if !global.quiet {
                let state = if allowed { "forwarded" } else { "suppressed" };
                eprintln!("{} zero values {state}", palette.accent(&key));
            }
            Ok(())
        }

        OscCommand::Group { group, state } => {
            let touched = osc.set_group(&group, state.is_on()).await?;
            if !global.quiet {
                eprintln!(
                    "{} {} ({touched} addresses)",
                    palette.accent(&group),
                    palette.switch(state.is_on())
                );
            }
            Ok(())
        }
    }
}
