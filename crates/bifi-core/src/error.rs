//! Unified error type for the bifi crates
//!
//! Every fallible operation in the workspace returns [`BifiResult`]. Validation
//! failures abort a run before any row is computed; numeric edge cases such as
//! a zero front irradiance are not errors and surface as `NaN`/`Inf` values.
//!
//! # Example
//!
//! ```ignore
//! use bifi_core::{BifiError, BifiResult};
//!
//! fn check(meas: &[f64], model: &[f64]) -> BifiResult<()> {
//!     if meas.len() != model.len() {
//!         return Err(BifiError::shape("measured vs modeled", meas.len(), model.len()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Unified error type for all bifi operations.
#[derive(Error, Debug)]
pub enum BifiError {
    /// Neither a delimited file nor in-memory results were supplied
    #[error("no input provided: pass either a delimited file or in-memory results")]
    NoInputProvided,

    /// Paired inputs do not line up
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Filtering left nothing to compute on
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A required CEC coefficient is missing or not numeric
    #[error("invalid module parameters: {0}")]
    InvalidModuleParams(String),

    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Numerical solver failures
    #[error("Solver error: {0}")]
    Solver(String),
}

/// Convenience type alias for Results using BifiError.
pub type BifiResult<T> = Result<T, BifiError>;

impl BifiError {
    /// Build a [`BifiError::ShapeMismatch`] for two lengths that should agree.
    pub fn shape(context: impl Into<String>, expected: usize, found: usize) -> Self {
        BifiError::ShapeMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

impl From<serde_json::Error> for BifiError {
    fn from(err: serde_json::Error) -> Self {
        BifiError::Parse(err.to_string())
    }
}
