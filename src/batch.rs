#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Runs one action per work item with a fixed number of actions in flight.
//!
//! Items start in the order given. Each item's callback fires as soon as its
//! own action settles, so completion order follows action latency, not
//! submission order. A failing or timed-out item never affects its siblings.

use crate::config::{DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_CONCURRENCY};
use crate::{Result, VimHelpError};
use futures_util::future;
use futures_util::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    const fn with_success(self) -> Self {
        Self {
            succeeded: self.succeeded.saturating_add(1),
            failed: self.failed,
        }
    }

    const fn with_failure(self) -> Self {
        Self {
            succeeded: self.succeeded,
            failed: self.failed.saturating_add(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchRunner {
    concurrency: usize,
    action_timeout: Option<Duration>,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONCURRENCY,
            Some(Duration::from_millis(DEFAULT_ACTION_TIMEOUT_MS)),
        )
    }
}

impl BatchRunner {
    /// A concurrency of zero is treated as one.
    #[must_use]
    pub fn new(concurrency: usize, action_timeout: Option<Duration>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            action_timeout,
        }
    }

    #[must_use]
    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    #[must_use]
    pub const fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout
    }

    /// Runs `action` for every item, at most `concurrency` at a time.
    ///
    /// Exactly one of `on_success`/`on_failure` is called per item, with that
    /// item's own identifier. Resolves once every item has settled.
    pub async fn run<R, A, Fut, S, F>(
        &self,
        items: &[String],
        action: A,
        mut on_success: S,
        mut on_failure: F,
    ) -> BatchSummary
    where
        A: Fn(String) -> Fut,
        Fut: Future<Output = Result<R>>,
        S: FnMut(&str, R),
        F: FnMut(&str, VimHelpError),
    {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "batch",
            %batch_id,
            items = items.len(),
            concurrency = self.concurrency
        );
        let queue = items.to_vec();
        let timeout = self.action_timeout;
        let action = &action;

        async move {
            let summary = stream::iter(queue)
                .map(|name| async move {
                    let outcome = settle(timeout, &name, action(name.clone())).await;
                    (name, outcome)
                })
                .buffer_unordered(self.concurrency)
                .fold(BatchSummary::default(), |summary, (name, outcome)| {
                    let next = match outcome {
                        Ok(value) => {
                            debug!("item {} succeeded", name);
                            on_success(&name, value);
                            summary.with_success()
                        }
                        Err(err) => {
                            debug!("item {} failed: {}", name, err);
                            on_failure(&name, err);
                            summary.with_failure()
                        }
                    };
                    future::ready(next)
                })
                .await;

            info!(
                "batch finished: {} succeeded, {} failed",
                summary.succeeded, summary.failed
            );
            summary
        }
        .instrument(span)
        .await
    }
}

async fn settle<R, Fut>(timeout: Option<Duration>, name: &str, action: Fut) -> Result<R>
where
    Fut: Future<Output = Result<R>>,
{
    match timeout {
        None => action.await,
        Some(limit) => tokio::time::timeout(limit, action).await.unwrap_or_else(|_| {
            Err(VimHelpError::Timeout {
                operation: format!("action for {name}"),
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })
        }),
    }
}
