use std::{future::Future, time::Duration};

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    client::ClientError,
    error::{CancelReason, Error, Result},
};

/// Caller supplied cancellation signal and optional deadline.
///
/// Every control plane and downstream call made by this crate goes through
/// [`CallContext::run`], so a cancelled context stops the operation at the
/// next blocking call. Nothing already created is rolled back.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        CallContext {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Handle that cancels this context, e.g. from a signal handler.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Reason the context is done, if it already is.
    pub fn state(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.token.cancelled() => CancelReason::Cancelled,
                _ = time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            },
        }
    }

    /// Runs `fut` unless the context finishes first.
    pub async fn run<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(reason) = self.state() {
            return Err(cancelled(op, reason));
        }
        tokio::select! {
            biased;
            reason = self.done() => Err(cancelled(op, reason)),
            result = fut => result,
        }
    }

    /// Runs a control plane call, attaching `op` to its failure.
    pub async fn call<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.run(op, async { fut.await.map_err(|err| Error::from_client(op, err)) })
            .await
    }

    /// Sleeps for `duration`, waking early with an error if the context finishes.
    pub async fn sleep(&self, op: &str, duration: Duration) -> Result<()> {
        self.run(op, async {
            time::sleep(duration).await;
            Ok(())
        })
        .await
    }
}

fn cancelled(op: &str, reason: CancelReason) -> Error {
    Error::Cancelled {
        op: op.to_owned(),
        reason,
    }
}
