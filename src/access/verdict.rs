//! Verdicts, reasons and tallies.

use serde::{Deserialize, Serialize};

/// One voter's opinion for one voting round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Access granted
    Granted,
    /// Access denied
    Denied,
    /// The voter supported none of the attributes
    #[default]
    Abstain,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Granted => write!(f, "granted"),
            Verdict::Denied => write!(f, "denied"),
            Verdict::Abstain => write!(f, "abstain"),
        }
    }
}

/// Explanation a voter attached to its vote on one attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    /// Name of the voter that produced the message
    pub voter: String,
    /// Position of the voter in the engine configuration
    pub voter_index: usize,
    /// Attribute being voted on
    pub attribute: String,
    /// Human-readable message
    pub message: String,
}

impl Reason {
    /// Create a new reason.
    pub fn new(voter: &str, voter_index: usize, attribute: &str, message: &str) -> Self {
        Self {
            voter: voter.to_string(),
            voter_index,
            attribute: attribute.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}#{}] {}: {}", self.voter, self.voter_index, self.attribute, self.message)
    }
}

/// Verdict counts folded during one decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Granted verdicts
    pub granted: usize,
    /// Denied verdicts
    pub denied: usize,
    /// Abstentions
    pub abstained: usize,
}

impl Tally {
    /// Count one verdict.
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Granted => self.granted += 1,
            Verdict::Denied => self.denied += 1,
            Verdict::Abstain => self.abstained += 1,
        }
    }

    /// Total verdicts counted.
    pub fn total(&self) -> usize {
        self.granted + self.denied + self.abstained
    }

    /// True if nothing was granted or denied.
    pub fn all_abstained(&self) -> bool {
        self.granted == 0 && self.denied == 0
    }
}
