//! Cancellation and deadline tokens threaded through triggers.

use crate::runtime::error::TriggerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How the trigger context hands the caller's token to reentrant triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationMode {
    /// Reentrant triggers observe the token of the trigger that invoked the
    /// callback.
    #[default]
    Propagate,
    /// Reentrant triggers get a fresh unbounded token; outer cancellation
    /// does not reach them.
    Detach,
}

/// Cancellation flag plus optional deadline.
///
/// Clones share the flag. The default token can never be cancelled and has
/// no deadline.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Option<Arc<AtomicBool>>,
    deadline: Option<DateTime<Utc>>,
}

impl Cancellation {
    /// A token that is never cancelled.
    pub fn none() -> Self {
        Self::default()
    }

    /// A token that can be cancelled through any of its clones.
    pub fn new() -> Self {
        Self {
            flag: Some(Arc::new(AtomicBool::new(false))),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the deadline relative to now. Timeouts too large for `chrono`
    /// leave the token without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d))
        {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Request cancellation. No-op on a [`Cancellation::none`] token.
    pub fn cancel(&self) {
        if let Some(flag) = &self.flag {
            flag.store(true, Ordering::Release);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Utc::now() >= deadline)
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = self.deadline?;
        Some(
            deadline
                .signed_duration_since(Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    pub(crate) fn check(&self, event: &str) -> Result<(), TriggerError> {
        if self.is_cancelled() {
            return Err(TriggerError::Cancelled {
                event: event.to_string(),
            });
        }
        if self.is_expired() {
            return Err(TriggerError::DeadlineExceeded {
                event: event.to_string(),
            });
        }
        Ok(())
    }
}
