//! Voter trait and the single-voter voting protocol.
//!
//! A voter looks at one attribute at a time. [`vote`] folds a voter's
//! answers for a list of attributes into one [`Verdict`]:
//!
//! - attributes the voter does not support are skipped;
//! - a supported attribute provisionally denies, then grants if the voter says so;
//! - the first error stops the fold.
//!
//! The verdict reflects only the last supported attribute. A grant on an
//! earlier attribute is overwritten by a later denial in the same call.

use crate::access::context::VoteContext;
use crate::access::verdict::{Reason, Verdict};
use crate::core::{DecisionError, VoterError};
use async_trait::async_trait;

/// A voter's answer for one attribute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ballot {
    /// Whether the attribute is granted
    pub granted: bool,
    /// Optional explanation, recorded when non-empty
    pub reason: Option<String>,
}

impl Ballot {
    /// Grant the attribute.
    pub fn grant() -> Self {
        Self {
            granted: true,
            reason: None,
        }
    }

    /// Deny the attribute.
    pub fn deny() -> Self {
        Self {
            granted: false,
            reason: None,
        }
    }

    /// Attach an explanation.
    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}

/// A unit of policy logic.
///
/// `S` is the subject type; the engine never interprets it.
#[async_trait]
pub trait Voter<S: ?Sized + Sync>: Send + Sync {
    /// Name recorded in reasons and logs.
    fn name(&self) -> &str;

    /// Whether this voter has an opinion on `attribute`.
    ///
    /// Must be free of side effects.
    fn supports(&self, attribute: &str, subject: &S) -> bool;

    /// Vote on one supported attribute.
    ///
    /// Implementations doing I/O should honor `ctx` cancellation.
    async fn vote_on_attribute(
        &self,
        ctx: &VoteContext,
        attribute: &str,
        subject: &S,
    ) -> Result<Ballot, VoterError>;
}

/// Result of running one voter over a list of attributes.
#[derive(Debug, Default)]
pub struct VoteOutcome {
    /// Verdict at the point the fold stopped
    pub verdict: Verdict,
    /// Reasons collected, in evaluation order
    pub reasons: Vec<Reason>,
    /// The first voter failure, if any
    pub error: Option<DecisionError>,
}

/// Run `voter` over `attributes` in order.
///
/// `voter_index` is the voter's position in the engine and is only used
/// to label reasons.
pub async fn vote<V, S, A>(
    voter: &V,
    voter_index: usize,
    ctx: &VoteContext,
    attributes: &[A],
    subject: &S,
) -> VoteOutcome
where
    V: Voter<S> + ?Sized,
    S: ?Sized + Sync,
    A: AsRef<str> + Sync,
{
    let mut outcome = VoteOutcome::default();

    for attribute in attributes {
        let attribute = attribute.as_ref();
        if !voter.supports(attribute, subject) {
            tracing::trace!(voter = voter.name(), attribute, "attribute not supported");
            continue;
        }

        outcome.verdict = Verdict::Denied;

        match voter.vote_on_attribute(ctx, attribute, subject).await {
            Ok(ballot) => {
                if let Some(message) = ballot.reason.as_deref().filter(|m| !m.is_empty()) {
                    outcome
                        .reasons
                        .push(Reason::new(voter.name(), voter_index, attribute, message));
                }
                if ballot.granted {
                    outcome.verdict = Verdict::Granted;
                }
            }
            Err(err) => {
                if let Some(message) = err.reason().filter(|m| !m.is_empty()) {
                    outcome
                        .reasons
                        .push(Reason::new(voter.name(), voter_index, attribute, message));
                }
                outcome.error = Some(DecisionError::VoterFailure {
                    voter: voter.name().to_string(),
                    attribute: attribute.to_string(),
                    source: err,
                });
                return outcome;
            }
        }
    }

    outcome
}

/// A voter built from two closures.
///
/// Checks the context for cancellation before each vote.
pub struct FnVoter<S: ?Sized> {
    name: String,
    supports: Box<dyn Fn(&str, &S) -> bool + Send + Sync>,
    decide: Box<dyn Fn(&str, &S) -> Result<Ballot, VoterError> + Send + Sync>,
}

impl<S: ?Sized> FnVoter<S> {
    /// Create a voter from a support predicate and a decision function.
    pub fn new<P, D>(name: &str, supports: P, decide: D) -> Self
    where
        P: Fn(&str, &S) -> bool + Send + Sync + 'static,
        D: Fn(&str, &S) -> Result<Ballot, VoterError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            supports: Box::new(supports),
            decide: Box::new(decide),
        }
    }

    /// Create a voter that supports exactly the listed attributes.
    pub fn for_attributes<D>(name: &str, attributes: &[&str], decide: D) -> Self
    where
        D: Fn(&str, &S) -> Result<Ballot, VoterError> + Send + Sync + 'static,
    {
        let attributes: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
        Self::new(
            name,
            move |attribute, _| attributes.iter().any(|a| a == attribute),
            decide,
        )
    }
}

impl<S: ?Sized> std::fmt::Debug for FnVoter<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnVoter").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<S: ?Sized + Sync> Voter<S> for FnVoter<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, attribute: &str, subject: &S) -> bool {
        (self.supports)(attribute, subject)
    }

    async fn vote_on_attribute(
        &self,
        ctx: &VoteContext,
        attribute: &str,
        subject: &S,
    ) -> Result<Ballot, VoterError> {
        ctx.check()?;
        (self.decide)(attribute, subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::testing::{Script, ScriptedVoter};

    #[tokio::test]
    async fn test_no_supported_attribute_abstains() {
        let voter = ScriptedVoter::new("v").on("other", Script::Grant);
        let outcome = vote(&voter, 0, &VoteContext::new(), &["a", "b"], &()).await;

        assert_eq!(outcome.verdict, Verdict::Abstain);
        assert!(outcome.reasons.is_empty());
        assert!(outcome.error.is_none());
        assert_eq!(voter.calls(), 0);
    }

    #[tokio::test]
    async fn test_single_grant() {
        let voter = ScriptedVoter::new("v").on("a", Script::Grant);
        let outcome = vote(&voter, 0, &VoteContext::new(), &["a"], &()).await;
        assert_eq!(outcome.verdict, Verdict::Granted);
    }

    #[tokio::test]
    async fn test_last_supported_attribute_wins() {
        let voter = ScriptedVoter::new("v")
            .on("a", Script::Grant)
            .on("b", Script::Deny);
        let outcome = vote(&voter, 0, &VoteContext::new(), &["a", "b"], &()).await;

        assert_eq!(outcome.verdict, Verdict::Denied);
        assert_eq!(voter.calls(), 2);
    }

    #[tokio::test]
    async fn test_later_grant_overrides_earlier_denial() {
        let voter = ScriptedVoter::new("v")
            .on("a", Script::Deny)
            .on("b", Script::Grant);
        let outcome = vote(&voter, 0, &VoteContext::new(), &["a", "b"], &()).await;
        assert_eq!(outcome.verdict, Verdict::Granted);
    }

    #[tokio::test]
    async fn test_unsupported_attribute_does_not_reset_verdict() {
        let voter = ScriptedVoter::new("v").on("a", Script::Grant);
        let outcome = vote(&voter, 0, &VoteContext::new(), &["a", "zzz"], &()).await;
        assert_eq!(outcome.verdict, Verdict::Granted);
    }

    #[tokio::test]
    async fn test_error_returns_provisional_denial_and_stops() {
        let voter = ScriptedVoter::new("v")
            .on("a", Script::Grant)
            .on("b", Script::FailWithReason("lookup failed"))
            .on("c", Script::Grant);
        let outcome = vote(&voter, 3, &VoteContext::new(), &["a", "b", "c"], &()).await;

        assert_eq!(outcome.verdict, Verdict::Denied);
        assert_eq!(voter.calls(), 2);
        assert_eq!(outcome.reasons, vec![Reason::new("v", 3, "b", "lookup failed")]);
        assert!(matches!(
            outcome.error,
            Some(DecisionError::VoterFailure { ref attribute, .. }) if attribute == "b"
        ));
    }

    #[tokio::test]
    async fn test_empty_reason_is_not_recorded() {
        let voter = ScriptedVoter::new("v")
            .on("a", Script::GrantWithReason(""))
            .on("b", Script::DenyWithReason("not owner"));
        let outcome = vote(&voter, 1, &VoteContext::new(), &["a", "b"], &()).await;

        assert_eq!(outcome.reasons, vec![Reason::new("v", 1, "b", "not owner")]);
    }

    #[tokio::test]
    async fn test_fn_voter() {
        let voter: FnVoter<str> = FnVoter::for_attributes("owner", &["edit"], |_, subject| {
            if subject == "alice" {
                Ok(Ballot::grant())
            } else {
                Ok(Ballot::deny().with_reason("not the owner"))
            }
        });
        let ctx = VoteContext::new();

        assert!(!voter.supports("view", "alice"));
        assert_eq!(vote(&voter, 0, &ctx, &["edit"], "alice").await.verdict, Verdict::Granted);

        let outcome = vote(&voter, 0, &ctx, &["edit"], "bob").await;
        assert_eq!(outcome.verdict, Verdict::Denied);
        assert_eq!(outcome.reasons[0].message, "not the owner");
    }

    #[tokio::test]
    async fn test_fn_voter_honors_cancellation() {
        let voter: FnVoter<()> = FnVoter::new("any", |_, _| true, |_, _| Ok(Ballot::grant()));
        let ctx = VoteContext::new();
        ctx.cancellation().cancel();

        let outcome = vote(&voter, 0, &ctx, &["a"], &()).await;
        assert_eq!(outcome.verdict, Verdict::Denied);
        match outcome.error {
            Some(DecisionError::VoterFailure { source, .. }) => assert!(source.is_cancellation()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
