//! File-backed message source.
//!
//! The stored-message schema matches what a mailbox sync job persists; the
//! binary and tests read it from a JSON array so a full pass runs without
//! any remote transport wired in.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::engine::traits::MessageSource;
use crate::error::SourceError;
use crate::message::Message;

/// Reads the ordered message sequence from a JSON file.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MessageSource for JsonFileSource {
    async fn fetch_all(&self) -> Result<Vec<Message>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
