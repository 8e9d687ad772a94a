// ── Core error types ──
//
// User-facing errors from teledash-core. The `From<teledash_api::Error>`
// impl folds the transport taxonomy (fetch / HTTP / decode) into these
// variants; everything else is a domain error raised by this crate.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the bridge at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the bridge timed out")]
    Timeout,

    #[error("Request failed: {message}")]
    Fetch { message: String },

    // ── Bridge responses ─────────────────────────────────────────────
    #[error("Bridge returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response from the bridge: {message}")]
    Decode { message: String },

    // ── Domain errors ────────────────────────────────────────────────
    #[error("No {what} received")]
    NotLoaded { what: String },

    #[error("Unknown key: {key}")]
    UnknownKey { key: String },

    #[error("Unknown group: {group}")]
    UnknownGroup { group: String },

    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Restart of {service} already in progress")]
    TriggerBusy { service: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

/// Placeholder when the failing request carries no URL.
const UNKNOWN_URL: &str = "<unknown>";

impl From<teledash_api::Error> for CoreError {
    fn from(err: teledash_api::Error) -> Self {
        match err {
            teledash_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| UNKNOWN_URL.into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Fetch {
                        message: e.to_string(),
                    }
                }
            }
            teledash_api::Error::Http { status, body } => CoreError::Http { status, body },
            teledash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            teledash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            teledash_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            teledash_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: UNKNOWN_URL.into(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            teledash_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: UNKNOWN_URL.into(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_survives_conversion() {
        let err: CoreError = teledash_api::Error::Http {
            status: 500,
            body: "udp listener failed".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Http { status: 500, .. }));
    }

    #[test]
    fn decode_errors_drop_the_body() {
        let err: CoreError = teledash_api::Error::Deserialization {
            message: "expected value at line 1".into(),
            body: "<html>".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Unexpected response from the bridge: expected value at line 1"
        );
    }

    #[test]
    fn websocket_failures_never_render_an_empty_url() {
        let err: CoreError = teledash_api::Error::WebSocketConnect("refused".into()).into();
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert!(!err.to_string().contains("at :"), "{err}");
    }

    #[test]
    fn tls_setup_failure_is_a_config_error() {
        let err: CoreError = teledash_api::Error::Tls("no roots".into()).into();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
