//! Mail Rules — declarative mailbox rule engine.
//!
//! Evaluates a JSON rule document against stored email records and computes
//! the minimal set of remote label mutations per message. Remote transport,
//! auth, and persistence stay behind the capability traits in
//! [`engine::traits`].

pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod rules;
pub mod source;
