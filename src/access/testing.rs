//! Scripted voters for tests.

use crate::access::config::EngineConfig;
use crate::access::context::VoteContext;
use crate::access::engine::DecisionEngine;
use crate::access::voter::{Ballot, Voter};
use crate::core::VoterError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// What a scripted voter answers for one attribute.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Script {
    Grant,
    Deny,
    GrantWithReason(&'static str),
    DenyWithReason(&'static str),
    Fail,
    FailWithReason(&'static str),
}

/// Shared, ordered record of `voter:attribute` calls.
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

/// Voter answering from a fixed script; attributes without a script are unsupported.
pub(crate) struct ScriptedVoter {
    name: String,
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
    log: Option<CallLog>,
}

impl ScriptedVoter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scripts: HashMap::new(),
            calls: AtomicUsize::new(0),
            log: None,
        }
    }

    pub(crate) fn on(mut self, attribute: &str, script: Script) -> Self {
        self.scripts.insert(attribute.to_string(), script);
        self
    }

    pub(crate) fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Number of `vote_on_attribute` calls received.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: ?Sized + Sync> Voter<S> for ScriptedVoter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, attribute: &str, _subject: &S) -> bool {
        self.scripts.contains_key(attribute)
    }

    async fn vote_on_attribute(
        &self,
        _ctx: &VoteContext,
        attribute: &str,
        _subject: &S,
    ) -> Result<Ballot, VoterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(log) = &self.log {
            log.lock().unwrap().push(format!("{}:{}", self.name, attribute));
        }

        match self.scripts.get(attribute).copied() {
            Some(Script::Grant) => Ok(Ballot::grant()),
            Some(Script::Deny) | None => Ok(Ballot::deny()),
            Some(Script::GrantWithReason(reason)) => Ok(Ballot::grant().with_reason(reason)),
            Some(Script::DenyWithReason(reason)) => Ok(Ballot::deny().with_reason(reason)),
            Some(Script::Fail) => Err(VoterError::failed("scripted failure")),
            Some(Script::FailWithReason(reason)) => {
                Err(VoterError::failed("scripted failure").with_reason(reason))
            }
        }
    }
}

/// Build an engine over `()` subjects from scripted voters.
pub(crate) fn scripted_engine(
    config: EngineConfig,
    voters: &[Arc<ScriptedVoter>],
) -> DecisionEngine<()> {
    let voters = voters
        .iter()
        .map(|v| v.clone() as Arc<dyn Voter<()>>)
        .collect();
    DecisionEngine::new(voters, config)
}

pub(crate) fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn log_entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
