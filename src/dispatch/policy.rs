use std::num::NonZeroU32;
use std::time::Duration;

use tokio::time::Instant;

/// Pause between two result polls of the same worker.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a worker's result is waited for, as configured.
///
/// With neither `max_attempts` nor `deadline` set, polling only ends when the
/// result is ready or shutdown is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: Option<NonZeroU32>,
    /// Wall clock budget for the whole batch, measured from its start.
    pub deadline: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            deadline: None,
        }
    }
}

impl PollSettings {
    /// Fix the deadline relative to `started`.
    #[must_use]
    pub fn policy_from(&self, started: Instant) -> PollPolicy {
        PollPolicy {
            interval: self.interval,
            max_attempts: self.max_attempts,
            deadline: self
                .deadline
                .and_then(|budget| started.checked_add(budget)),
        }
    }
}

/// Poll bounds shared by every worker task of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<NonZeroU32>,
    pub deadline: Option<Instant>,
}

impl PollPolicy {
    #[must_use]
    pub const fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn attempts_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts
            .is_some_and(|max_attempts| attempts >= max_attempts.get())
    }

    /// Resolve when the deadline passes; never without one.
    pub(super) async fn deadline_reached(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}
