//! Civic Triage Core
//!
//! Types and error handling shared across the triage crates.
//!
//! This crate provides:
//! - The closed department and priority vocabularies
//! - The prediction value handed back to the embedding application
//! - The labeled training sample format
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Department, DepartmentSource, Prediction, Priority, TrainingSample};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Department, DepartmentSource, Prediction, Priority, TrainingSample};
}
