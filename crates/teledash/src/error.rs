//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use teledash_config::ConfigError;
use teledash_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the bridge at {url}")]
    #[diagnostic(
        code(teledash::connection_failed),
        help(
            "Check that the bridge is running and reachable.\n\
             Reason: {reason}\n\
             Try: teledash --bridge http://localhost:1337 version"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(teledash::timeout),
        help("Increase the timeout with --timeout or check the bridge's responsiveness.")
    )]
    Timeout,

    // ── Bridge responses ─────────────────────────────────────────────
    #[error("Bridge returned HTTP {status}")]
    #[diagnostic(code(teledash::http), help("Response body: {body}"))]
    Http { status: u16, body: String },

    #[error("Unexpected response from the bridge: {message}")]
    #[diagnostic(
        code(teledash::decode),
        help("The bridge may be running an incompatible version. Check: teledash version")
    )]
    Decode { message: String },

    #[error("Request failed: {message}")]
    #[diagnostic(code(teledash::fetch))]
    Fetch { message: String },

    #[error("Restart of {service} is already in progress")]
    #[diagnostic(code(teledash::busy))]
    Busy { service: String },

    #[error("No telemetry received")]
    #[diagnostic(
        code(teledash::no_telemetry),
        help("The stream closed before any snapshot arrived. Is a game sending data?")
    )]
    NoTelemetry,

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(teledash::not_found),
        help("Run: teledash {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(teledash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(teledash::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: teledash config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(teledash::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(teledash::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::Http { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            CoreError::Fetch { message } => CliError::Fetch { message },
            CoreError::Http { status, body } => CliError::Http { status, body },
            CoreError::Decode { message } => CliError::Decode { message },
            CoreError::NotLoaded { .. } => CliError::NoTelemetry,
            CoreError::UnknownKey { key } => CliError::NotFound {
                resource_type: "key".into(),
                identifier: key,
                list_command: "osc list".into(),
            },
            CoreError::UnknownGroup { group } => CliError::NotFound {
                resource_type: "group".into(),
                identifier: group,
                list_command: "osc groups".into(),
            },
            CoreError::Validation { field, message } => CliError::Validation {
                field,
                reason: message,
            },
            CoreError::TriggerBusy { service } => CliError::Busy { service },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://localhost:1337/".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout, exit_code::TIMEOUT),
            (
                CoreError::UnknownKey { key: "Boost".into() },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Validation {
                    field: "udp_port".into(),
                    message: "must be 1-65535".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Http {
                    status: 500,
                    body: String::new(),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }
}
