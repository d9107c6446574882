//! recensio-common — Shared types and errors used across all Recensio crates.

pub mod error;
pub mod paper;

// Re-export commonly used types
pub use error::{RecensioError, Result};
pub use paper::{FeedSource, Paper};
