use crate::modules::scores::core::merge::merge;
use crate::modules::scores::core::score_table::ScoreTable;
use crate::modules::scores::core::vote::VoteBatch;
use crate::modules::scores::use_cases::submit_votes::backoff::{RetryPolicy, Sleeper};
use crate::shared::infrastructure::versioned_store::{StoreError, VersionedStore};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitVotesError {
    #[error("score table still contended after {attempts} attempts")]
    ContentionExhausted { attempts: u32 },

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("deadline exceeded during attempt {attempts}")]
    DeadlineExceeded { attempts: u32 },
}

/// Runs `fut` unless the deadline has already passed or passes while it is pending.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        None => Some(fut.await),
        Some(at) if Instant::now() >= at => None,
        Some(at) => tokio::time::timeout_at(at, fut).await.ok(),
    }
}

/// Applies vote batches to the shared score table with optimistic concurrency.
///
/// Each attempt reads a fresh snapshot, merges the whole batch into it and
/// writes the result conditioned on the version that was read. Conflicts are
/// retried with linear backoff until the policy's budget is spent. Storage
/// failures end the loop immediately.
pub struct RetryCoordinator<TStore, TSleeper>
where
    TStore: VersionedStore<ScoreTable> + ?Sized,
    TSleeper: Sleeper + ?Sized,
{
    store: Arc<TStore>,
    sleeper: Arc<TSleeper>,
    policy: RetryPolicy,
}

impl<TStore, TSleeper> RetryCoordinator<TStore, TSleeper>
where
    TStore: VersionedStore<ScoreTable> + ?Sized,
    TSleeper: Sleeper + ?Sized,
{
    pub fn new(store: Arc<TStore>, sleeper: Arc<TSleeper>, policy: RetryPolicy) -> Self {
        Self {
            store,
            sleeper,
            policy,
        }
    }

    #[tracing::instrument(skip_all, fields(votes = batch.len()))]
    pub async fn handle(
        &self,
        batch: &VoteBatch,
        deadline: Option<Instant>,
    ) -> Result<ScoreTable, SubmitVotesError> {
        let mut attempt = 1;
        loop {
            tracing::debug!(attempt, "reading score table");
            let snapshot = within(deadline, self.store.read())
                .await
                .ok_or(SubmitVotesError::DeadlineExceeded { attempts: attempt })?
                .inspect_err(|e| tracing::error!(attempt, error = %e, "read failed"))?;

            let merged = merge(&snapshot.document, batch);

            let committed = within(
                deadline,
                self.store
                    .conditional_write(&merged, snapshot.version.as_ref()),
            )
            .await
            .ok_or(SubmitVotesError::DeadlineExceeded { attempts: attempt })?;

            match committed {
                Ok(version) => {
                    tracing::debug!(attempt, %version, "votes committed");
                    return Ok(merged);
                }
                Err(conflict) if conflict.is_conflict() => {
                    let Some(delay) = self.policy.delay_after(attempt) else {
                        tracing::warn!(attempt, "retry budget exhausted");
                        return Err(SubmitVotesError::ContentionExhausted { attempts: attempt });
                    };
                    tracing::warn!(
                        attempt,
                        ?delay,
                        error = %conflict,
                        "write conflicted, retrying"
                    );
                    within(deadline, self.sleeper.sleep(delay))
                        .await
                        .ok_or(SubmitVotesError::DeadlineExceeded { attempts: attempt })?;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "write failed");
                    return Err(e.into());
                }
            }
        }
    }
}
