//! Repository traits and their SQLite implementations.
//!
//! Each use-case service talks to storage only through the trait in its module, so the
//! services can be exercised against any backend that honours the same contract.

pub mod appointment;
pub mod patient;
pub mod staff;
