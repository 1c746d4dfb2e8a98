//! Account lifecycle worker.
//!
//! Loads the student population on a schedule, evaluates it with
//! `roster-core`, and suspends or deletes accounts through an
//! [`applier::ActionApplier`].

pub mod applier;
pub mod config;
pub mod job;
