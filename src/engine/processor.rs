//! Batch processor — drives one pass of all messages against the rule set.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::engine::reconcile::{LabelDelta, reconcile};
use crate::engine::traits::Mailbox;
use crate::error::{ApplyError, LabelError};
use crate::message::Message;
use crate::rules::eval::evaluate_rule;
use crate::rules::model::RuleSet;

/// An unresolved label, recorded for end-of-pass reporting.
#[derive(Debug, Clone)]
pub struct UnresolvedLabel {
    pub message_id: String,
    pub rule: String,
    pub error: LabelError,
}

/// A failed remote apply, with the attempted delta so the caller can retry.
#[derive(Debug, Clone)]
pub struct ApplyFailure {
    pub message_id: String,
    pub rule: String,
    pub delta: LabelDelta,
    pub error: ApplyError,
}

/// Accumulated counters and failures for one pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Messages walked.
    pub scanned: usize,
    /// Rule matches across all messages.
    pub matched: usize,
    /// Remote updates issued and acknowledged.
    pub applied: usize,
    /// Matches whose delta was empty (message already in desired state).
    pub skipped_empty: usize,
    pub unresolved: Vec<UnresolvedLabel>,
    pub apply_failures: Vec<ApplyFailure>,
}

/// Final label state of one processed message, for the caller to persist.
#[derive(Debug, Clone)]
pub struct ProcessedMessage {
    pub id: String,
    pub labels: BTreeSet<String>,
}

/// Result of one full pass.
#[derive(Debug)]
pub struct PassOutcome {
    pub messages: Vec<ProcessedMessage>,
    pub report: PassReport,
}

/// Drives the pass: evaluate every rule per message in stored order,
/// reconcile matched rules' actions against the message's current in-memory
/// label state, and call the mailbox only for non-empty deltas.
pub struct BatchProcessor {
    rules: RuleSet,
    mailbox: Arc<dyn Mailbox>,
}

impl BatchProcessor {
    pub fn new(rules: RuleSet, mailbox: Arc<dyn Mailbox>) -> Self {
        Self { rules, mailbox }
    }

    /// Run one pass with the current wall clock as the reference time.
    pub async fn run_pass(&self, messages: Vec<Message>) -> PassOutcome {
        self.run_pass_at(messages, Utc::now()).await
    }

    /// Run one pass with an injected reference time.
    ///
    /// `now` is captured once for the whole pass, so every date predicate
    /// sees the same threshold regardless of how long the pass takes.
    pub async fn run_pass_at(&self, messages: Vec<Message>, now: DateTime<Utc>) -> PassOutcome {
        info!(
            messages = messages.len(),
            rules = self.rules.len(),
            "Starting rule pass"
        );

        let mut report = PassReport::default();
        let mut processed = Vec::with_capacity(messages.len());

        for message in messages {
            let labels = self.process_message(&message, now, &mut report).await;
            report.scanned += 1;
            processed.push(ProcessedMessage {
                id: message.id,
                labels,
            });
        }

        info!(
            scanned = report.scanned,
            matched = report.matched,
            applied = report.applied,
            unresolved = report.unresolved.len(),
            failures = report.apply_failures.len(),
            "Rule pass complete"
        );

        PassOutcome {
            messages: processed,
            report,
        }
    }

    /// Evaluate every rule against one message and apply matched actions.
    ///
    /// Returns the message's final label state. Label changes made by an
    /// earlier matched rule are visible to later rules in the same pass;
    /// a failed apply rolls the state back to its pre-call value.
    async fn process_message(
        &self,
        message: &Message,
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) -> BTreeSet<String> {
        let mut labels = message.labels.clone();

        for rule in self.rules.iter() {
            if !evaluate_rule(rule, message, now) {
                continue;
            }
            report.matched += 1;
            debug!(id = %message.id, rule = %rule.name, "Rule matched");

            let outcome = reconcile(&labels, &rule.actions, self.mailbox.as_ref()).await;
            for error in outcome.unresolved {
                report.unresolved.push(UnresolvedLabel {
                    message_id: message.id.clone(),
                    rule: rule.name.clone(),
                    error,
                });
            }

            if outcome.delta.is_empty() {
                debug!(id = %message.id, rule = %rule.name, "Already in desired state");
                report.skipped_empty += 1;
                continue;
            }

            match self.mailbox.apply(&message.id, &outcome.delta).await {
                Ok(()) => {
                    info!(
                        id = %message.id,
                        rule = %rule.name,
                        delta = %outcome.delta,
                        "Applied label update"
                    );
                    labels = outcome.new_labels;
                    report.applied += 1;
                }
                Err(error) => {
                    warn!(
                        id = %message.id,
                        rule = %rule.name,
                        delta = %outcome.delta,
                        error = %error,
                        "Remote apply failed, keeping previous label state"
                    );
                    report.apply_failures.push(ApplyFailure {
                        message_id: message.id.clone(),
                        rule: rule.name.clone(),
                        delta: outcome.delta,
                        error,
                    });
                }
            }
        }

        labels
    }
}
