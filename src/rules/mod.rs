//! Declarative rule document: model, loading, and evaluation.
//!
//! A rule document is loaded once per pass and treated as read-only:
//! 1. `RuleSet::load()` — parse + validate (malformed documents fail here)
//! 2. `eval::evaluate_rule()` — pure boolean verdict per message

pub mod eval;
pub mod model;
