//! Error types for the Mower ROI crate.
//!
//! The calculation engine itself is total and never fails.  Errors
//! only arise at its edges: loading an equipment catalog and accepting
//! a lead.

use thiserror::Error;

/// Reasons an equipment catalog could not be used.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no model `{0}`")]
    MissingModel(String),

    #[error("model `{model}` has invalid coverage {value}")]
    InvalidCoverage { model: String, value: f64 },

    #[error("price `{field}` is invalid: {value}")]
    InvalidPrice { field: String, value: f64 },
}

/// Reasons a lead submission was rejected.
#[derive(Error, Debug)]
pub enum LeadError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid email address `{0}`")]
    InvalidEmail(String),

    #[error("lead delivery failed: {0}")]
    Delivery(String),
}
