//! Shared helpers for command handlers.

use std::path::Path;

use teledash_core::CoreError;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Turn an unknown-key lookup into a not-found error naming the right list command.
pub fn lookup_error(
    resource_type: &'static str,
    list_command: &'static str,
) -> impl Fn(CoreError) -> CliError {
    move |err| match err {
        CoreError::UnknownKey { key } => CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: key,
            list_command: list_command.into(),
        },
        other => other.into(),
    }
}

/// Split a `FIELD=VALUE` argument.
pub fn split_assignment(raw: &str) -> Result<(&str, &str), CliError> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| CliError::Validation {
            field: raw.into(),
            reason: "expected FIELD=VALUE".into(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(
            split_assignment("osc_addr=10.0.0.2").unwrap(),
            ("osc_addr", "10.0.0.2")
        );
        assert_eq!(split_assignment("x=a=b").unwrap(), ("x", "a=b"));
        assert!(split_assignment("udp_port").is_err());
        assert!(split_assignment("=5").is_err());
    }

    #[test]
    fn unknown_key_becomes_not_found() {
        let err = lookup_error("packet", "packets list")(CoreError::UnknownKey { key: "99".into() });
        assert!(matches!(
            err,
            CliError::NotFound { ref list_command, .. } if list_command == "packets list"
        ));
    }
}
