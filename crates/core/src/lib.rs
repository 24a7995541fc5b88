//! Core types and configuration for the periodic system.
//!
//! This crate provides shared types used across all other crates:
//! - Temporal types (month periods, granularities)
//! - Raw and canonical tables
//! - Currency, security type and symbol identity
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod table;
pub mod types;

pub use config::{Config, NormalizerConfig};
pub use error::{Error, Result};
pub use table::*;
pub use types::*;
