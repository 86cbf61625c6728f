//! Shared foundation for the ambre association-rule miner.
//!
//! This crate provides the types shared across the am-core and
//! am-bundle crates:
//! - The engine-wide error type with stable codes and categories
//! - Construction and derivation options with validation
//! - Output record types emitted by derivation and prediction

pub mod error;
pub mod options;
pub mod records;

pub use error::{Error, ErrorCategory, Result};
pub use options::{IndexOptions, ItemsetQuery, PredictOptions, RuleQuery};
pub use records::{IndexStats, ItemsetRecord, Prediction, RuleRecord};
