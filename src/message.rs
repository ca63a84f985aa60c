//! Stored email records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The label Gmail-style mailboxes use for unread messages.
pub const UNREAD: &str = "UNREAD";

/// Immutable view of one stored email record.
///
/// Header fields are optional — a record synced without a `To` header simply
/// has no recipient, and string predicates on a missing field evaluate
/// false. `labels` is a set: no duplicates, and "no labels" is the empty
/// set rather than a null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
}

impl Message {
    /// Whether the record carries the `UNREAD` label.
    pub fn is_unread(&self) -> bool {
        self.labels.contains(UNREAD)
    }
}
