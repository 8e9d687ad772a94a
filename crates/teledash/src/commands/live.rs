//! Live telemetry follower.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use teledash_core::{
    BackoffConfig, CoreError, Dashboard, LiveTelemetry, ReconnectPolicy, TelemetrySnapshot,
};

use crate::cli::{GlobalOpts, LiveArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Palette};

/// One snapshot as a single line.
fn gauge_line(s: &TelemetrySnapshot, palette: Palette) -> String {
    format!(
        "{} {:>3} km/h  {} {:>2}  {} {:>5}  {} {:>3.0}%  {} {:>3.0}%  {} {:>+5.2}",
        palette.dim("spd"),
        s.speed,
        palette.dim("gear"),
        s.gear,
        palette.dim("rpm"),
        s.rpm,
        palette.dim("thr"),
        s.throttle * 100.0,
        palette.dim("brk"),
        s.brake * 100.0,
        palette.dim("str"),
        s.steer,
    )
}

fn render(snapshot: &TelemetrySnapshot, global: &GlobalOpts, palette: Palette) -> String {
    // One object per line keeps json output streamable.
    let format = match global.output {
        OutputFormat::Json => &OutputFormat::JsonCompact,
        ref other => other,
    };
    output::render_single(
        format,
        snapshot,
        |s| gauge_line(s, palette),
        |s| s.speed.to_string(),
    )
}

fn mount(dashboard: &Dashboard, reconnect: bool) -> Result<LiveTelemetry, CliError> {
    if !reconnect {
        return Ok(dashboard.live()?);
    }
    let url = dashboard
        .client()
        .ws_url(&dashboard.config().ws_path)
        .map_err(CoreError::from)?;
    let policy = match dashboard.config().reconnect {
        ReconnectPolicy::Backoff(ref backoff) => ReconnectPolicy::Backoff(backoff.clone()),
        ReconnectPolicy::Never => ReconnectPolicy::Backoff(BackoffConfig::default()),
    };
    Ok(LiveTelemetry::mount(url, policy))
}

async fn stop_after(duration: Option<Duration>) {
    match duration {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: LiveArgs,
    global: &GlobalOpts,
    palette: Palette,
) -> Result<(), CliError> {
    let mut live = mount(dashboard, args.reconnect)?;
    let limit = args.count.unwrap_or(u64::MAX);
    let stop = stop_after(args.duration);
    tokio::pin!(stop);

    if !global.quiet {
        eprintln!("{} (Ctrl-C to stop)", palette.dim("Waiting for telemetry..."));
    }

    let mut received = 0u64;
    let first: Option<Arc<TelemetrySnapshot>> = tokio::select! {
        biased;
        _ = tokio::signal::ctrl_c() => None,
        () = &mut stop => None,
        first = live.first_snapshot() => Some(first?),
    };

    if let Some(snapshot) = first {
        output::print_output(&render(&snapshot, global, palette), global.quiet);
        received += 1;

        while received < limit {
            tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => break,
                () = &mut stop => break,
                next = live.next_snapshot() => match next {
                    Some(snapshot) => {
                        output::print_output(&render(&snapshot, global, palette), global.quiet);
                        received += 1;
                    }
                    None => break,
                },
            }
        }
    }

    live.close();

    if !global.quiet {
        let elapsed = (Utc::now() - live.mounted_at())
            .to_std()
            .unwrap_or_default();
        let elapsed = Duration::from_millis(
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        );
        eprintln!(
            "{}",
            palette.dim(&format!(
                "{received} snapshots in {}, {} undecodable frames dropped",
                humantime::format_duration(elapsed),
                live.dropped_frames()
            ))
        );
    }
    Ok(())
}
