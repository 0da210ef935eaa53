//! # voteguard - Voter-based access decisions
//!
//! Combines the votes of independent voters into one grant/deny decision:
//! - **Voters**: one policy rule each, asked about one attribute at a time
//! - **Strategies**: affirmative, consensus or unanimous aggregation
//! - **Reasons**: every explanation a voter gave, kept even when a voter fails
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use voteguard::access::{Ballot, DecisionEngine, FnVoter, Strategy, VoteContext, Voter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let owner: Arc<dyn Voter<str>> = Arc::new(FnVoter::for_attributes(
//!         "owner",
//!         &["edit"],
//!         |_, user: &str| Ok(if user == "alice" { Ballot::grant() } else { Ballot::deny() }),
//!     ));
//!
//!     let engine = DecisionEngine::builder()
//!         .voter(owner)
//!         .strategy(Strategy::Unanimous)
//!         .build();
//!
//!     let decision = engine
//!         .decide(&VoteContext::new(), &["edit"], "alice")
//!         .await
//!         .unwrap();
//!     assert!(decision.granted);
//! }
//! ```

pub mod access;
pub mod core;
pub mod monitoring;

pub use crate::access::{Decision, DecisionEngine, Strategy, Verdict, VoteContext, Voter};
pub use crate::core::error::{DecisionError, DecisionFailure, Result, VoterError};
