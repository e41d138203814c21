//! Cancellation context carried through every store call
//!
//! A `Context` combines a shared cancel flag with an optional deadline.
//! Backends check it before issuing a statement and while a statement runs;
//! once the context is done they stop and report `StoreError::ContextCanceled`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::storage::{StoreError, StoreResult};

/// Why a context stopped accepting work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Canceled explicitly through a [`Canceler`]
    Canceled,
    /// The deadline passed
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Canceled => f.write_str("canceled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Caller-owned cancellation and deadline signal.
///
/// Cloning a context shares its cancel flag, so canceling any clone (or a
/// [`Canceler`] taken from it) stops all of them.
#[derive(Debug, Clone, Default)]
pub struct Context {
    canceled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never done unless canceled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A fresh context that expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// Derive a context sharing this cancel flag with a deadline `timeout` from now.
    ///
    /// The earlier of the existing and the new deadline wins.
    pub fn timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derive a context sharing this cancel flag with the given deadline.
    ///
    /// The earlier of the existing and the new deadline wins.
    pub fn deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        };
        Self {
            canceled: Arc::clone(&self.canceled),
            deadline: Some(deadline),
        }
    }

    /// Deadline, if any
    pub fn expires_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Handle that cancels this context from another thread.
    pub fn canceler(&self) -> Canceler {
        Canceler {
            canceled: Arc::clone(&self.canceled),
        }
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Reason the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<CancelReason> {
        if self.canceled.load(Ordering::SeqCst) {
            return Some(CancelReason::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Fail with `ContextCanceled` once the context is done.
    pub fn check(&self) -> StoreResult<()> {
        match self.err() {
            Some(reason) => Err(StoreError::ContextCanceled(reason)),
            None => Ok(()),
        }
    }
}

/// Cancels the [`Context`] it was taken from
#[derive(Debug, Clone)]
pub struct Canceler {
    canceled: Arc<AtomicBool>,
}

impl Canceler {
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }
}
