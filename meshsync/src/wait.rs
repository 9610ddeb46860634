use std::{future::Future, time::Duration};

use tokio::time::{self, Instant};

use crate::{
    context::CallContext,
    error::{Error, Result},
};

/// Interval between readiness checks.
pub const READINESS_INTERVAL: Duration = Duration::from_secs(5);
/// Wall-clock ceiling of a readiness wait, independent of the caller's deadline.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: READINESS_INTERVAL,
            timeout: READINESS_TIMEOUT,
        }
    }
}

/// Repeats `predicate` every `policy.interval` until it returns `true`.
///
/// Fails with [`Error::Timeout`] once `policy.timeout` elapsed, even while a
/// check is still pending, and with [`Error::Cancelled`] as soon as `ctx`
/// finishes, whichever comes first. A failing predicate ends the wait with
/// its error.
pub async fn poll_until<F, Fut>(
    ctx: &CallContext,
    policy: PollPolicy,
    what: &str,
    mut predicate: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let op = format!("wait for {}", what);
    let ceiling = Instant::now() + policy.timeout;
    let timed_out = || Error::Timeout {
        what: what.to_owned(),
        after: policy.timeout,
    };
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let satisfied = tokio::select! {
            biased;
            satisfied = ctx.run(&op, predicate()) => satisfied?,
            _ = time::sleep_until(ceiling) => return Err(timed_out()),
        };
        if satisfied {
            tracing::debug!("{} satisfied after {} checks", what, attempt);
            return Ok(());
        }
        let now = Instant::now();
        if now >= ceiling {
            return Err(timed_out());
        }
        tracing::debug!("{} not satisfied yet (check {}), retrying", what, attempt);
        ctx.sleep(&op, policy.interval.min(ceiling - now)).await?;
    }
}
