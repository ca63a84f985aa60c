//! Rule document model.
//!
//! Wire format (JSON):
//!
//! ```json
//! {
//!   "rules": [
//!     {
//!       "name": "Archive stale newsletters",
//!       "predicate": "All",
//!       "conditions": [
//!         { "field": "Sender", "predicate": "contains", "value": "newsletter" },
//!         { "field": "Received Date", "predicate": "less_than", "value": 7 }
//!       ],
//!       "actions": [
//!         { "action": "mark_as_read" },
//!         { "action": "move_message", "value": "Newsletters" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown field or predicate names deserialize to `Unknown` and evaluate
//! false, so rule files written for a newer schema still load. Unknown
//! aggregator or action names are hard load errors.

use std::path::Path;

use serde::Deserialize;

use crate::error::RuleError;

/// Which message attribute a condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Field {
    Sender,
    Recipient,
    Subject,
    Body,
    #[serde(rename = "Received Date")]
    ReceivedDate,
    /// Forward-compat arm: any unrecognized field name lands here and the
    /// condition evaluates false.
    #[serde(other)]
    Unknown,
}

/// Comparison operator applied to one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Contains,
    DoesNotContain,
    Equals,
    DoesNotEqual,
    LessThan,
    GreaterThan,
    /// Forward-compat arm: unrecognized predicates evaluate false.
    #[serde(other)]
    Unknown,
}

/// Calendar unit for relative date offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    Days,
    Weeks,
    Months,
    Years,
}

/// Condition operand.
///
/// Untagged: a bare integer is an exact 24-hour day count, an object is a
/// calendar-aware offset, anything else is a string operand.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Days(i64),
    Relative { amount: u32, unit: DateUnit },
    Text(String),
}

/// One predicate against one message attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub field: Field,
    pub predicate: Predicate,
    pub value: ConditionValue,
}

/// How a rule combines its condition verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Aggregator {
    All,
    Any,
}

/// What a matched rule does to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    MarkAsRead,
    MarkAsUnread,
    MoveMessage,
}

/// A single action; `value` is the target label name for `move_message`.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    #[serde(rename = "action")]
    pub kind: ActionKind,
    #[serde(default)]
    pub value: Option<String>,
}

/// A named predicate-and-action pair.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub name: String,
    #[serde(rename = "predicate")]
    pub aggregator: Aggregator,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl Rule {
    /// Load-time validation. Violations are fatal before any message is
    /// processed.
    fn validate(&self) -> Result<(), RuleError> {
        if self.conditions.is_empty() {
            return Err(RuleError::Invalid {
                rule: self.name.clone(),
                reason: "a rule needs at least one condition".into(),
            });
        }
        if self.actions.is_empty() {
            return Err(RuleError::Invalid {
                rule: self.name.clone(),
                reason: "a rule needs at least one action".into(),
            });
        }
        for action in &self.actions {
            if action.kind == ActionKind::MoveMessage
                && action.value.as_deref().is_none_or(str::is_empty)
            {
                return Err(RuleError::Invalid {
                    rule: self.name.clone(),
                    reason: "move_message requires a label name in 'value'".into(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered, immutable collection of rules for one pass.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse and validate a rule document.
    pub fn from_json(raw: &str) -> Result<Self, RuleError> {
        let set: RuleSet = serde_json::from_str(raw)?;
        for rule in &set.rules {
            rule.validate()?;
        }
        Ok(set)
    }

    /// Load a rule document from disk.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
