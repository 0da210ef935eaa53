//! Access decision engine.
//!
//! Runs the configured voters in order and folds their verdicts with one of
//! three strategies:
//!
//! - **Affirmative**: the first grant wins. Otherwise any denial denies,
//!   and an all-abstain round falls back to `allow_if_all_abstain`.
//! - **Consensus**: every voter is consulted and the majority wins. Ties
//!   with at least one grant use `allow_if_equal_granted_denied`.
//! - **Unanimous**: each voter votes on each attribute separately. The
//!   first denial denies; otherwise at least one grant is required.
//!
//! The first voter error aborts the decision. The reasons collected up to
//! and including the failing call are returned with the error.

use crate::access::config::{EngineConfig, EngineSettings, Strategy};
use crate::access::context::VoteContext;
use crate::access::verdict::{Reason, Tally, Verdict};
use crate::access::voter::{vote, Voter};
use crate::core::{DecisionFailure, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a successful decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether access is granted
    pub granted: bool,
    /// Every non-empty reason, in evaluation order
    pub reasons: Vec<Reason>,
    /// Verdicts folded before the decision was reached
    pub tally: Tally,
}

/// Voter-based access decision engine.
pub struct DecisionEngine<S: ?Sized + Sync> {
    voters: Vec<Arc<dyn Voter<S>>>,
    config: EngineConfig,
}

impl<S: ?Sized + Sync> DecisionEngine<S> {
    /// Create an engine from voters (in evaluation order) and a config.
    pub fn new(voters: Vec<Arc<dyn Voter<S>>>, config: EngineConfig) -> Self {
        Self { voters, config }
    }

    /// Create an engine from serialized settings.
    ///
    /// Fails with `InvalidStrategy` if the strategy is not recognized.
    pub fn from_settings(voters: Vec<Arc<dyn Voter<S>>>, settings: EngineSettings) -> Result<Self> {
        let config = settings.into_config()?;
        Ok(Self::new(voters, config))
    }

    /// Unanimous engine that allows access when every voter abstains.
    pub fn with_default_policy(voters: Vec<Arc<dyn Voter<S>>>) -> Self {
        Self::new(
            voters,
            EngineConfig::new(Strategy::Unanimous).with_allow_if_all_abstain(true),
        )
    }

    /// Start building an engine.
    pub fn builder() -> DecisionEngineBuilder<S> {
        DecisionEngineBuilder::default()
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the strategy.
    pub fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    /// Get the voters in evaluation order.
    pub fn voters(&self) -> &[Arc<dyn Voter<S>>] {
        &self.voters
    }

    /// Decide whether `subject` is granted `attributes`.
    ///
    /// Voters are consulted one at a time in configured order; `ctx` is
    /// passed unchanged to each of them.
    #[tracing::instrument(
        name = "decide",
        skip_all,
        fields(
            strategy = %self.config.strategy,
            request_id = %ctx.request_id,
            attributes = attributes.len()
        )
    )]
    pub async fn decide<A>(
        &self,
        ctx: &VoteContext,
        attributes: &[A],
        subject: &S,
    ) -> std::result::Result<Decision, DecisionFailure>
    where
        A: AsRef<str> + Sync,
    {
        let result = match self.config.strategy {
            Strategy::Affirmative => self.decide_affirmative(ctx, attributes, subject).await,
            Strategy::Consensus => self.decide_consensus(ctx, attributes, subject).await,
            Strategy::Unanimous => self.decide_unanimous(ctx, attributes, subject).await,
        };

        match &result {
            Ok(decision) => tracing::debug!(
                granted = decision.granted,
                granted_votes = decision.tally.granted,
                denied_votes = decision.tally.denied,
                reasons = decision.reasons.len(),
                "decision reached"
            ),
            Err(failure) => tracing::warn!(
                error = %failure.error,
                reasons = failure.reasons.len(),
                "decision failed"
            ),
        }

        result
    }

    /// Blocking variant of [`decide`](Self::decide) for callers without a runtime.
    ///
    /// Voters that need a tokio reactor must not be used here.
    pub fn decide_blocking<A>(
        &self,
        ctx: &VoteContext,
        attributes: &[A],
        subject: &S,
    ) -> std::result::Result<Decision, DecisionFailure>
    where
        A: AsRef<str> + Sync,
    {
        futures::executor::block_on(self.decide(ctx, attributes, subject))
    }

    async fn decide_affirmative<A>(
        &self,
        ctx: &VoteContext,
        attributes: &[A],
        subject: &S,
    ) -> std::result::Result<Decision, DecisionFailure>
    where
        A: AsRef<str> + Sync,
    {
        let mut reasons = Vec::new();
        let mut tally = Tally::default();

        for (index, voter) in self.voters.iter().enumerate() {
            let verdict =
                consult(voter.as_ref(), index, ctx, attributes, subject, &mut reasons).await?;
            tally.record(verdict);

            if verdict == Verdict::Granted {
                tracing::debug!(voter = voter.name(), "granted, skipping remaining voters");
                return Ok(Decision {
                    granted: true,
                    reasons,
                    tally,
                });
            }
        }

        let granted = if tally.denied > 0 {
            false
        } else {
            self.config.allow_if_all_abstain
        };

        Ok(Decision {
            granted,
            reasons,
            tally,
        })
    }

    async fn decide_consensus<A>(
        &self,
        ctx: &VoteContext,
        attributes: &[A],
        subject: &S,
    ) -> std::result::Result<Decision, DecisionFailure>
    where
        A: AsRef<str> + Sync,
    {
        let mut reasons = Vec::new();
        let mut tally = Tally::default();

        for (index, voter) in self.voters.iter().enumerate() {
            let verdict =
                consult(voter.as_ref(), index, ctx, attributes, subject, &mut reasons).await?;
            tally.record(verdict);
        }

        let granted = if tally.granted > tally.denied {
            true
        } else if tally.denied > tally.granted {
            false
        } else if tally.granted > 0 {
            self.config.allow_if_equal_granted_denied
        } else {
            self.config.allow_if_all_abstain
        };

        Ok(Decision {
            granted,
            reasons,
            tally,
        })
    }

    async fn decide_unanimous<A>(
        &self,
        ctx: &VoteContext,
        attributes: &[A],
        subject: &S,
    ) -> std::result::Result<Decision, DecisionFailure>
    where
        A: AsRef<str> + Sync,
    {
        let mut reasons = Vec::new();
        let mut tally = Tally::default();

        for (index, voter) in self.voters.iter().enumerate() {
            for attribute in attributes {
                let single = std::slice::from_ref(attribute);
                let verdict =
                    consult(voter.as_ref(), index, ctx, single, subject, &mut reasons).await?;
                tally.record(verdict);

                if verdict == Verdict::Denied {
                    tracing::debug!(
                        voter = voter.name(),
                        attribute = attribute.as_ref(),
                        "denied, unanimity broken"
                    );
                    return Ok(Decision {
                        granted: false,
                        reasons,
                        tally,
                    });
                }
            }
        }

        let granted = if tally.granted > 0 {
            true
        } else {
            self.config.allow_if_all_abstain
        };

        Ok(Decision {
            granted,
            reasons,
            tally,
        })
    }
}

/// Run one voter, append its reasons and turn a voter error into a failure
/// carrying everything collected so far.
async fn consult<S, A>(
    voter: &dyn Voter<S>,
    index: usize,
    ctx: &VoteContext,
    attributes: &[A],
    subject: &S,
    reasons: &mut Vec<Reason>,
) -> std::result::Result<Verdict, DecisionFailure>
where
    S: ?Sized + Sync,
    A: AsRef<str> + Sync,
{
    let outcome = vote(voter, index, ctx, attributes, subject).await;
    reasons.extend(outcome.reasons);

    if let Some(error) = outcome.error {
        tracing::warn!(voter = voter.name(), voter_index = index, error = %error, "voter failed");
        return Err(DecisionFailure::with_reasons(error, std::mem::take(reasons)));
    }

    tracing::debug!(voter = voter.name(), voter_index = index, verdict = %outcome.verdict, "vote");
    Ok(outcome.verdict)
}

impl<S: ?Sized + Sync> Clone for DecisionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            voters: self.voters.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: ?Sized + Sync> std::fmt::Debug for DecisionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.voters.iter().map(|v| v.name()).collect();
        f.debug_struct("DecisionEngine")
            .field("voters", &names)
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`DecisionEngine`].
pub struct DecisionEngineBuilder<S: ?Sized + Sync> {
    voters: Vec<Arc<dyn Voter<S>>>,
    config: EngineConfig,
}

impl<S: ?Sized + Sync> DecisionEngineBuilder<S> {
    /// Append a voter.
    pub fn voter(mut self, voter: Arc<dyn Voter<S>>) -> Self {
        self.voters.push(voter);
        self
    }

    /// Append several voters.
    pub fn voters(mut self, voters: impl IntoIterator<Item = Arc<dyn Voter<S>>>) -> Self {
        self.voters.extend(voters);
        self
    }

    /// Set the whole config.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Set the all-abstain decision.
    pub fn allow_if_all_abstain(mut self, allow: bool) -> Self {
        self.config.allow_if_all_abstain = allow;
        self
    }

    /// Set the consensus tie decision.
    pub fn allow_if_equal_granted_denied(mut self, allow: bool) -> Self {
        self.config.allow_if_equal_granted_denied = allow;
        self
    }

    /// Build the engine.
    pub fn build(self) -> DecisionEngine<S> {
        DecisionEngine::new(self.voters, self.config)
    }
}

impl<S: ?Sized + Sync> Default for DecisionEngineBuilder<S> {
    fn default() -> Self {
        Self {
            voters: Vec::new(),
            config: EngineConfig::default(),
        }
    }
}
