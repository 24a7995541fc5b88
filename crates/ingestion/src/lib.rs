//! Data ingestion and normalization for the periodic system.
//!
//! This crate handles:
//! - Date parsing and month assignment
//! - Latest-observation deduplication of daily feeds
//! - Exclusion of incomplete trailing months
//! - Decade label filtering

pub mod decade;
pub mod normalizer;

pub use normalizer::{NormalizeStats, PeriodNormalizer};
