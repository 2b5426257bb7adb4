//! Per-question countdown.
//!
//! [`arm`] splits a deadline into a [`Countdown`] handle, kept by whoever can
//! answer the question, and an [`Expiry`] future, awaited by whoever drives
//! the clock. The expiry resolves exactly once: `Cancelled` if the handle was
//! cancelled (or dropped) first, `Expired` if the full duration elapsed.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

/// How an [`Expiry`] resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The duration elapsed before anyone answered.
    Expired,
    /// The countdown was cancelled by an explicit submission.
    Cancelled,
}

/// Start a countdown of `duration`.
pub fn arm(duration: Duration) -> (Countdown, Expiry) {
    let (tx, rx) = oneshot::channel();
    let deadline = Instant::now() + duration;
    (
        Countdown {
            duration,
            deadline,
            cancel: Some(tx),
        },
        Expiry {
            deadline,
            cancelled: rx,
        },
    )
}

/// Owner side of a running countdown.
#[derive(Debug)]
pub struct Countdown {
    duration: Duration,
    deadline: Instant,
    cancel: Option<oneshot::Sender<()>>,
}

impl Countdown {
    /// Full length of the countdown.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time left before expiry; zero once elapsed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_elapsed(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Stop the countdown. Returns `true` the first time it is called.
    pub fn cancel(&mut self) -> bool {
        match self.cancel.take() {
            Some(tx) => {
                // The receiver may already be gone; that is not an error.
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }
}

/// Waiting side of a running countdown.
#[derive(Debug)]
pub struct Expiry {
    deadline: Instant,
    cancelled: oneshot::Receiver<()>,
}

impl Expiry {
    /// Wait until the countdown expires or is cancelled.
    pub async fn wait(self) -> Resolution {
        let Expiry {
            deadline,
            cancelled,
        } = self;
        tokio::select! {
            biased;
            _ = cancelled => Resolution::Cancelled,
            _ = tokio::time::sleep_until(deadline) => Resolution::Expired,
        }
    }
}
