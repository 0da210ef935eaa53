//! Access Module
//!
//! Voter-based access decisions:
//! - Voter trait and the single-voter voting protocol
//! - Affirmative, consensus and unanimous decision strategies
//! - Engine configuration and call context

pub mod config;
pub mod context;
pub mod engine;
pub mod verdict;
pub mod voter;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EngineConfig, EngineSettings, Strategy, StrategySetting};
pub use context::{CancellationToken, VoteContext};
pub use engine::{Decision, DecisionEngine, DecisionEngineBuilder};
pub use verdict::{Reason, Tally, Verdict};
pub use voter::{vote, Ballot, FnVoter, VoteOutcome, Voter};
