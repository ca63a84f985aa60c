//! Collaborator capabilities injected into the engine.
//!
//! The engine never talks to a concrete transport. A real implementation
//! wraps the remote mailbox API (and its credential handling); tests plug
//! in fakes. Ordering matters: actions for one message are awaited
//! sequentially, so later actions see earlier label state.

use async_trait::async_trait;

use crate::engine::reconcile::LabelDelta;
use crate::error::{ApplyError, LabelError, SourceError};
use crate::message::Message;

/// Remote mailbox mutation capability.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Resolve a label name to its identifier, creating the label remotely
    /// if it does not exist yet.
    async fn get_or_create_label(&self, name: &str) -> Result<String, LabelError>;

    /// Apply a label delta to one message.
    async fn apply(&self, message_id: &str, delta: &LabelDelta) -> Result<(), ApplyError>;
}

/// Yields the ordered sequence of stored messages for one pass.
///
/// Iteration is finite and restartable between passes, not mid-pass.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Message>, SourceError>;
}
