//! Error types for the rule engine.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Label error: {0}")]
    Label(#[from] LabelError),

    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Rule document load errors.
///
/// These are fatal: a pass never starts with a malformed rule document.
/// Unknown *field* and *predicate* names are not load errors — they
/// deserialize to `Unknown` variants and soft-fail to `false` at
/// evaluation time.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse rule document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid rule '{rule}': {reason}")]
    Invalid { rule: String, reason: String },
}

/// Message source errors.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse message records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A label name could not be resolved or created remotely.
///
/// Local to one action: the action is skipped and the rest of the pass
/// continues.
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not resolve label '{name}': {reason}")]
pub struct LabelError {
    pub name: String,
    pub reason: String,
    /// Whether the caller may retry this resolution later.
    pub retryable: bool,
}

/// A remote label mutation failed.
///
/// Local to one message/action: the message's label state is rolled back
/// and the pass continues.
#[derive(Debug, Clone, thiserror::Error)]
#[error("remote apply failed: {reason}")]
pub struct ApplyError {
    pub reason: String,
    /// Whether the caller may retry the attempted delta later.
    pub retryable: bool,
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
