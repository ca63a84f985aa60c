//! Label reconciliation.
//!
//! Turns a message's current label set plus a rule's action list into the
//! minimal add/remove delta and the resulting label set. Pure apart from
//! label-name resolution, which goes through the injected [`Mailbox`];
//! no remote mutation happens here.

use std::collections::BTreeSet;
use std::fmt;

use tracing::warn;

use crate::engine::traits::Mailbox;
use crate::error::LabelError;
use crate::message::UNREAD;
use crate::rules::model::{Action, ActionKind};

/// Minimal set of label mutations moving a message from its current state
/// to the state the actions imply. `add` and `remove` are always disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl LabelDelta {
    /// An empty delta means the message is already in the desired state
    /// and no remote call is needed.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

impl fmt::Display for LabelDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }
        let mut first = true;
        for label in &self.add {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "+{label}")?;
            first = false;
        }
        for label in &self.remove {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "-{label}")?;
            first = false;
        }
        Ok(())
    }
}

/// Result of reconciling one action list against one label set.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub delta: LabelDelta,
    /// `(current - remove) ∪ add` — the caller installs this only after a
    /// successful remote apply.
    pub new_labels: BTreeSet<String>,
    /// Label names that could not be resolved; their actions were skipped.
    pub unresolved: Vec<LabelError>,
}

/// Walk the action list in order against a working copy of the label set.
///
/// The delta is derived afterwards as the set difference between the final
/// and initial label sets, so when a later action undoes an earlier one the
/// last action wins and `add`/`remove` stay disjoint by construction. An
/// unresolved label skips only its own action; the rest of the list still
/// applies.
pub async fn reconcile(
    current: &BTreeSet<String>,
    actions: &[Action],
    mailbox: &dyn Mailbox,
) -> ReconcileOutcome {
    let mut working = current.clone();
    let mut unresolved = Vec::new();

    for action in actions {
        match action.kind {
            ActionKind::MarkAsRead => {
                working.remove(UNREAD);
            }
            ActionKind::MarkAsUnread => {
                working.insert(UNREAD.to_string());
            }
            ActionKind::MoveMessage => {
                // Guaranteed non-empty by load-time validation.
                let Some(name) = action.value.as_deref() else {
                    continue;
                };
                match mailbox.get_or_create_label(name).await {
                    Ok(id) => {
                        working.insert(id);
                    }
                    Err(err) => {
                        warn!(
                            label = %err.name,
                            reason = %err.reason,
                            retryable = err.retryable,
                            "Label resolution failed, skipping action"
                        );
                        unresolved.push(err);
                    }
                }
            }
        }
    }

    let delta = LabelDelta {
        add: working.difference(current).cloned().collect(),
        remove: current.difference(&working).cloned().collect(),
    };
    debug_assert!(delta.add.is_disjoint(&delta.remove));

    ReconcileOutcome {
        delta,
        new_labels: working,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::ApplyError;

    /// Fake mailbox with a configurable label directory.
    struct FakeMailbox {
        /// name → id for labels that already exist remotely.
        known: Mutex<HashMap<String, String>>,
        /// Label names whose creation fails.
        broken: Vec<String>,
        created: Mutex<Vec<String>>,
    }

    impl FakeMailbox {
        fn new(known: &[(&str, &str)]) -> Self {
            Self {
                known: Mutex::new(
                    known
                        .iter()
                        .map(|(n, i)| (n.to_string(), i.to_string()))
                        .collect(),
                ),
                broken: Vec::new(),
                created: Mutex::new(Vec::new()),
            }
        }

        fn with_broken(mut self, name: &str) -> Self {
            self.broken.push(name.to_string());
            self
        }
    }

    #[async_trait]
    impl Mailbox for FakeMailbox {
        async fn get_or_create_label(&self, name: &str) -> Result<String, LabelError> {
            if self.broken.iter().any(|b| b == name) {
                return Err(LabelError {
                    name: name.to_string(),
                    reason: "remote create failed".into(),
                    retryable: true,
                });
            }
            let mut known = self.known.lock().unwrap();
            if let Some(id) = known.get(name) {
                return Ok(id.clone());
            }
            let id = format!("Label_{}", known.len() + 1);
            known.insert(name.to_string(), id.clone());
            self.created.lock().unwrap().push(name.to_string());
            Ok(id)
        }

        async fn apply(&self, _message_id: &str, _delta: &LabelDelta) -> Result<(), ApplyError> {
            Ok(())
        }
    }

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn action(kind: ActionKind, value: Option<&str>) -> Action {
        Action {
            kind,
            value: value.map(String::from),
        }
    }

    #[tokio::test]
    async fn mark_as_read_removes_unread_only_when_present() {
        let mailbox = FakeMailbox::new(&[]);
        let current = labels(&["UNREAD", "IMPORTANT"]);
        let outcome = reconcile(
            &current,
            &[action(ActionKind::MarkAsRead, None)],
            &mailbox,
        )
        .await;

        assert_eq!(outcome.delta.remove, labels(&["UNREAD"]));
        assert!(outcome.delta.add.is_empty());
        assert_eq!(outcome.new_labels, labels(&["IMPORTANT"]));

        // Second application from the new state: nothing left to do.
        let again = reconcile(
            &outcome.new_labels,
            &[action(ActionKind::MarkAsRead, None)],
            &mailbox,
        )
        .await;
        assert!(again.delta.is_empty());
        assert_eq!(again.new_labels, labels(&["IMPORTANT"]));
    }

    #[tokio::test]
    async fn mark_as_unread_adds_only_when_absent() {
        let mailbox = FakeMailbox::new(&[]);
        let current = labels(&["IMPORTANT"]);
        let outcome = reconcile(
            &current,
            &[action(ActionKind::MarkAsUnread, None)],
            &mailbox,
        )
        .await;
        assert_eq!(outcome.delta.add, labels(&["UNREAD"]));
        assert!(outcome.delta.remove.is_empty());

        let already = reconcile(
            &labels(&["UNREAD"]),
            &[action(ActionKind::MarkAsUnread, None)],
            &mailbox,
        )
        .await;
        assert!(already.delta.is_empty());
    }

    #[tokio::test]
    async fn move_message_creates_missing_label() {
        let mailbox = FakeMailbox::new(&[]);
        let current = labels(&["INBOX"]);
        let outcome = reconcile(
            &current,
            &[action(ActionKind::MoveMessage, Some("Archive"))],
            &mailbox,
        )
        .await;

        assert_eq!(outcome.delta.add, labels(&["Label_1"]));
        assert!(outcome.unresolved.is_empty());
        assert_eq!(
            mailbox.created.lock().unwrap().as_slice(),
            &["Archive".to_string()]
        );
    }

    #[tokio::test]
    async fn move_message_reuses_existing_label_id() {
        let mailbox = FakeMailbox::new(&[("Receipts", "Label_9")]);
        let outcome = reconcile(
            &labels(&[]),
            &[action(ActionKind::MoveMessage, Some("Receipts"))],
            &mailbox,
        )
        .await;
        assert_eq!(outcome.delta.add, labels(&["Label_9"]));
        assert!(mailbox.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn move_message_already_labeled_is_empty_delta() {
        let mailbox = FakeMailbox::new(&[("Receipts", "Label_9")]);
        let outcome = reconcile(
            &labels(&["Label_9"]),
            &[action(ActionKind::MoveMessage, Some("Receipts"))],
            &mailbox,
        )
        .await;
        assert!(outcome.delta.is_empty());
    }

    #[tokio::test]
    async fn unresolved_label_skips_only_its_own_action() {
        let mailbox = FakeMailbox::new(&[]).with_broken("Doomed");
        let current = labels(&["UNREAD"]);
        let outcome = reconcile(
            &current,
            &[
                action(ActionKind::MoveMessage, Some("Doomed")),
                action(ActionKind::MarkAsRead, None),
            ],
            &mailbox,
        )
        .await;

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].name, "Doomed");
        // The mark-as-read still took effect.
        assert_eq!(outcome.delta.remove, labels(&["UNREAD"]));
        assert!(outcome.delta.add.is_empty());
    }

    #[tokio::test]
    async fn last_action_wins_per_label() {
        let mailbox = FakeMailbox::new(&[]);
        // Starts without UNREAD; unread-then-read nets out to nothing.
        let outcome = reconcile(
            &labels(&["INBOX"]),
            &[
                action(ActionKind::MarkAsUnread, None),
                action(ActionKind::MarkAsRead, None),
            ],
            &mailbox,
        )
        .await;
        assert!(outcome.delta.is_empty());
        assert_eq!(outcome.new_labels, labels(&["INBOX"]));

        // Starts with UNREAD; read-then-unread also nets out to nothing.
        let outcome = reconcile(
            &labels(&["UNREAD"]),
            &[
                action(ActionKind::MarkAsRead, None),
                action(ActionKind::MarkAsUnread, None),
            ],
            &mailbox,
        )
        .await;
        assert!(outcome.delta.is_empty());
        assert_eq!(outcome.new_labels, labels(&["UNREAD"]));
    }

    #[tokio::test]
    async fn add_and_remove_are_always_disjoint() {
        let mailbox = FakeMailbox::new(&[]);
        let outcome = reconcile(
            &labels(&["UNREAD", "INBOX"]),
            &[
                action(ActionKind::MarkAsRead, None),
                action(ActionKind::MoveMessage, Some("Archive")),
                action(ActionKind::MarkAsUnread, None),
                action(ActionKind::MarkAsRead, None),
            ],
            &mailbox,
        )
        .await;
        assert!(outcome.delta.add.is_disjoint(&outcome.delta.remove));
    }

    #[tokio::test]
    async fn reconciliation_is_idempotent() {
        let mailbox = FakeMailbox::new(&[]);
        let actions = vec![
            action(ActionKind::MarkAsRead, None),
            action(ActionKind::MoveMessage, Some("Archive")),
        ];
        let start = labels(&["UNREAD", "INBOX"]);

        let first = reconcile(&start, &actions, &mailbox).await;
        assert!(!first.delta.is_empty());

        let second = reconcile(&first.new_labels, &actions, &mailbox).await;
        assert!(second.delta.is_empty());
        assert_eq!(second.new_labels, first.new_labels);
    }

    #[test]
    fn delta_display_formats_signs() {
        let delta = LabelDelta {
            add: labels(&["Archive"]),
            remove: labels(&["UNREAD"]),
        };
        assert_eq!(delta.to_string(), "+Archive -UNREAD");
        assert_eq!(LabelDelta::default().to_string(), "(empty)");
    }
}
