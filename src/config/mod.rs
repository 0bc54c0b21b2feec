//! Configuration module for index updates and searches
//!
//! This module provides the `XkcdConfig` struct and its builder with
//! validation and sensible defaults.

pub mod builder;
pub mod getters;
pub mod types;

pub use builder::XkcdConfigBuilder;
pub use types::{ConfigError, XkcdConfig, default_index_dir};
