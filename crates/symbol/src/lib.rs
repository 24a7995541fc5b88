//! Financial symbols and bounded tables for the periodic system.
//!
//! This crate provides:
//! - Raw-value suppliers (closures, fixed tables, JSON files)
//! - Financial symbols with on-demand normalization
//! - Range-filtered, currency-tagged data tables

pub mod data_table;
pub mod supplier;
pub mod symbol;

pub use data_table::DataTable;
pub use supplier::{JsonFileValues, StaticValues, ValuesSupplier};
pub use symbol::FinancialSymbol;
