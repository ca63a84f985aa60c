//! Configuration types.

use std::path::PathBuf;

/// Engine configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path to the JSON rule document.
    pub rules_path: PathBuf,
    /// Path to the stored message records (JSON array).
    pub messages_path: PathBuf,
    /// Log deltas instead of calling a remote mailbox.
    pub dry_run: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("./rules.json"),
            messages_path: PathBuf::from("./messages.json"),
            dry_run: true,
        }
    }
}

impl EngineConfig {
    /// Build from `MAILRULES_*` environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            rules_path: std::env::var("MAILRULES_RULES")
                .map(PathBuf::from)
                .unwrap_or(defaults.rules_path),
            messages_path: std::env::var("MAILRULES_MESSAGES")
                .map(PathBuf::from)
                .unwrap_or(defaults.messages_path),
            dry_run: std::env::var("MAILRULES_DRY_RUN")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(defaults.dry_run),
        }
    }
}
