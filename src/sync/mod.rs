//! Incremental sync planning

pub mod planner;

pub use planner::{expected_count, plan};
