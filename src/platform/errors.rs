//! # Platform Errors
//!
//! Failures reported by host collaborators.

use thiserror::Error;

pub type PlatformResult<T> = Result<T, PlatformError>;

#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The host could not serve the call
    #[error("Host platform unavailable: {0}")]
    Unavailable(String),

    /// Seed data could not be loaded
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}
