//! Call context passed to voters.
//!
//! The engine hands the same context to every voter call without looking
//! at it. Voters that perform I/O use it to honor cancellation and deadlines.

use crate::core::{now, Timestamp, VoterError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Cooperative cancellation signal shared between a caller and its voters.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Create a new token (not cancelled).
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Wait until cancellation is requested.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Context for one decision.
#[derive(Clone, Debug)]
pub struct VoteContext {
    /// Correlation ID for logs
    pub request_id: Uuid,
    /// Caller supplied values
    pub metadata: HashMap<String, serde_json::Value>,
    cancellation: CancellationToken,
    deadline: Option<Timestamp>,
}

impl VoteContext {
    /// Create a context with a fresh request ID, no deadline and its own token.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            metadata: HashMap::new(),
            cancellation: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Share an existing cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Set an absolute deadline.
    pub fn with_deadline(mut self, deadline: Timestamp) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(self, timeout: chrono::Duration) -> Self {
        self.with_deadline(now() + timeout)
    }

    /// Set the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Add a metadata value.
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Get a metadata value.
    pub fn get_metadata<T: for<'de> serde::Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.metadata
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Whether the caller cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail with a cancellation-shaped error if the caller gave up.
    pub fn check(&self) -> Result<(), VoterError> {
        if self.cancellation.is_cancelled() {
            return Err(VoterError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if now() >= deadline => Err(VoterError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

impl Default for VoteContext {
    fn default() -> Self {
        Self::new()
    }
}
