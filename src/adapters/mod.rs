//! Adapters layer: Concrete implementations of ports.
//!
//! - `logistic`: standardized logistic regression scorer
//! - `fs`: JSON/CSV artifact storage on the local filesystem

pub mod fs;
pub mod logistic;

// Re-export storage error for lib.rs
pub use fs::StorageError;
