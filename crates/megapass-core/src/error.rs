//! Error types for the MegaPass core

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core operations
///
/// All of these are recoverable; the presentation layer decides what the
/// user sees. None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// User-supplied credential failed the format check
    #[error("Invalid credential format: expected Mega followed by {expected} digits and '*'")]
    InvalidFormat { expected: usize },

    /// Generation retry budget exceeded
    #[error("Credential space exhausted: no unused {digits}-digit value available this month")]
    CredentialSpaceExhausted { digits: usize },

    /// Network name must be non-empty
    #[error("Network name cannot be empty")]
    EmptyNetworkName,

    /// Copy or reveal requested with no credential recorded for today
    #[error("No credential recorded for today")]
    NoCredentialToday,

    /// Persistence gateway failure
    #[error("Persistence error: {0}")]
    Persistence(String),
}
