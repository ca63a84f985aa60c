//! Batch pass execution.
//!
//! One pass walks every stored message against the full rule set:
//! 1. `rules::eval::evaluate_rule()` — boolean verdict per rule
//! 2. `reconcile::reconcile()` — action list → minimal label delta
//! 3. `Mailbox::apply()` — remote mutation, only for non-empty deltas
//!
//! Per-message failures accumulate into the pass report; nothing mid-pass
//! aborts except a malformed rule document at load time.

pub mod processor;
pub mod reconcile;
pub mod traits;
