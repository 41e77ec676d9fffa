use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlReturningError;

/// How a statement reacts to `SQLITE_BUSY`.
///
/// `Unbounded` retries the identical call immediately until it stops being
/// busy; callers that need bounded latency pick `Bounded` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetryPolicy {
    #[default]
    Unbounded,
    Bounded { max_retries: u32, backoff_ms: u64 },
}

impl RetryPolicy {
    #[must_use]
    pub fn bounded(max_retries: u32, backoff: Duration) -> Self {
        RetryPolicy::Bounded {
            max_retries,
            backoff_ms: u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Run `op`, repeating it while it reports busy.
    ///
    /// # Errors
    /// Returns the first non-busy error from `op`, or
    /// `SqlReturningError::BusyRetriesExhausted` once a bounded policy gives up.
    pub fn run<T, F>(self, mut op: F) -> Result<T, SqlReturningError>
    where
        F: FnMut() -> Result<T, SqlReturningError>,
    {
        let mut retries: u32 = 0;
        loop {
            match op() {
                Err(err) if err.is_busy() => {
                    retries = retries.saturating_add(1);
                    match self {
                        RetryPolicy::Unbounded => {
                            tracing::trace!(retries, "database busy, retrying");
                        }
                        RetryPolicy::Bounded {
                            max_retries,
                            backoff_ms,
                        } => {
                            if retries > max_retries {
                                tracing::warn!(retries, "database busy, giving up");
                                return Err(SqlReturningError::BusyRetriesExhausted {
                                    attempts: retries,
                                });
                            }
                            tracing::warn!(retries, max_retries, "database busy, backing off");
                            thread::sleep(Duration::from_millis(backoff_ms));
                        }
                    }
                }
                other => return other,
            }
        }
    }
}

/// Per-call execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecOptions {
    /// Overrides the connection's busy-retry policy for this call.
    pub retry: Option<RetryPolicy>,
}

impl ExecOptions {
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub fn resolve_retry(self, connection_default: RetryPolicy) -> RetryPolicy {
        self.retry.unwrap_or(connection_default)
    }
}
