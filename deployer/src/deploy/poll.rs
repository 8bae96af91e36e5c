//! Bounded polling with a fixed delay

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Number of checks, at least one is always made
    pub max_attempts: u32,

    /// Pause between two checks
    pub delay: Duration,
}

impl PollPolicy {
    /// Wait for the service to come back after a restart
    pub const RESTART: PollPolicy = PollPolicy {
        max_attempts: 12,
        delay: Duration::from_secs(5),
    };

    /// Wait for pending configuration changes to be applied
    pub const CONVERGENCE: PollPolicy = PollPolicy {
        max_attempts: 24,
        delay: Duration::from_secs(5),
    };

    /// Worst-case time spent sleeping
    pub fn max_wait(&self) -> Duration {
        self.delay * self.max_attempts.max(1).saturating_sub(1)
    }
}

/// Result of a polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T, E> {
    /// The done condition was met
    Done(T),

    /// All attempts were used, carries the last observation
    TimedOut(T),

    /// A check failed; polling stopped immediately
    Aborted(E),

    /// The token was cancelled before the loop finished
    Cancelled,
}

/// Run `check` until `is_done` accepts its result or the attempts run out.
///
/// No sleep follows the last attempt. A failed check is not retried.
pub async fn poll_until<T, E, C, CF, D, S, SF>(
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut check: C,
    is_done: D,
    sleep_fn: S,
) -> PollResult<T, E>
where
    C: FnMut() -> CF,
    CF: Future<Output = Result<T, E>>,
    D: Fn(&T) -> bool,
    S: Fn(Duration) -> SF,
    SF: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);

    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return PollResult::Cancelled;
        }

        let result = match check().await {
            Ok(result) => result,
            Err(e) => return PollResult::Aborted(e),
        };

        if is_done(&result) {
            debug!("Poll condition met after {} attempt(s)", attempt);
            return PollResult::Done(result);
        }

        if attempt >= max_attempts {
            return PollResult::TimedOut(result);
        }

        debug!("Attempt {}/{} not done, retrying in {:?}", attempt, max_attempts, policy.delay);
        tokio::select! {
            _ = cancel.cancelled() => return PollResult::Cancelled,
            _ = sleep_fn(policy.delay) => {}
        }
        attempt += 1;
    }
}
