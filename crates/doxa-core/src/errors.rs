//! Errors raised by the shared vocabulary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A qualified name was empty or had a blank `::` segment.
    #[error("'{name}' is not a qualified name: {reason}")]
    InvalidName { name: String, reason: String },
}
