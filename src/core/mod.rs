//! Core utilities and common types for voteguard.

pub mod error;
pub mod types;

pub use error::{DecisionError, DecisionFailure, Result, VoterError};
pub use types::*;
