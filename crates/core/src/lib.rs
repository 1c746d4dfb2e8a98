//! Domain logic for the account lifecycle worker.
//!
//! This crate has no database or runtime dependencies. Everything that reads
//! or writes storage lives in `roster-db` and `roster-worker`; the types here
//! only describe accounts, the facts gathered about them, and the decisions
//! taken from those facts.

pub mod lifecycle;
pub mod roles;
pub mod types;
