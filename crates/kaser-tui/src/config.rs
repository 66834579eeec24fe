//! Session configuration from environment variables.
//!
//! - `KASER_BACKUP_SUFFIX`: suffix appended to the file name for the backup (default `.bak`)
//! - `KASER_ATOMIC_SAVE`: `0`, `false`, `no` or `off` writes the file in place instead of
//!   through a temporary file

use kaser_editor::{SaveOptions, SessionConfig};
use std::env;
use tracing::warn;

pub const BACKUP_SUFFIX_VAR: &str = "KASER_BACKUP_SUFFIX";
pub const ATOMIC_SAVE_VAR: &str = "KASER_ATOMIC_SAVE";

/// Read the configuration from the process environment.
pub fn from_env() -> SessionConfig {
    from_vars(|name| env::var(name).ok())
}

/// Build the configuration from a variable lookup.
pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> SessionConfig {
    let mut save = SaveOptions::default();

    if let Some(suffix) = var(BACKUP_SUFFIX_VAR)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        if suffix.contains(['/', '\\']) {
            warn!(%suffix, "backup suffix may not contain path separators, ignoring");
        } else {
            save.backup_suffix = suffix;
        }
    }

    if let Some(value) = var(ATOMIC_SAVE_VAR) {
        match parse_flag(&value) {
            Some(atomic) => save.atomic = atomic,
            None => warn!(%value, "unrecognised {ATOMIC_SAVE_VAR} value, keeping default"),
        }
    }

    SessionConfig {
        save,
        ..SessionConfig::default()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> SessionConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(config(&[]), SessionConfig::default());
    }

    #[test]
    fn backup_suffix_is_trimmed_and_validated() {
        assert_eq!(
            config(&[(BACKUP_SUFFIX_VAR, " .orig ")]).save.backup_suffix,
            ".orig"
        );
        assert_eq!(config(&[(BACKUP_SUFFIX_VAR, "  ")]).save.backup_suffix, ".bak");
        assert_eq!(
            config(&[(BACKUP_SUFFIX_VAR, "/../x")]).save.backup_suffix,
            ".bak"
        );
    }

    #[test]
    fn atomic_flag_accepts_common_spellings() {
        assert!(!config(&[(ATOMIC_SAVE_VAR, "0")]).save.atomic);
        assert!(!config(&[(ATOMIC_SAVE_VAR, "False")]).save.atomic);
        assert!(config(&[(ATOMIC_SAVE_VAR, "on")]).save.atomic);
        assert!(config(&[(ATOMIC_SAVE_VAR, "maybe")]).save.atomic);
    }
}
