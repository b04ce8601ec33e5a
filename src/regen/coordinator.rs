use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::compose::page::EncodedPage;
use crate::foundation::error::{WeftError, WeftResult};
use crate::regen::staleness::{Revalidate, is_stale};
use crate::regen::store::{ArtifactMetadata, ContentKey, ContentStore};

/// Regeneration state of one content key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// Published output is within its staleness interval.
    Fresh,
    /// Published output is past its interval (or absent).
    Stale,
    /// A regeneration task is in flight for the key.
    Regenerating,
}

/// Proof of a successful publication.
#[derive(Clone, Copy, Debug)]
pub struct PublishReceipt {
    /// Timestamp recorded in the published metadata.
    pub generated_at: SystemTime,
}

/// The bytes and staleness policy a regeneration job produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegenArtifact {
    /// Wire bytes to publish.
    pub bytes: Vec<u8>,
    /// Interval the new artifact is published under.
    pub revalidate: Revalidate,
}

impl RegenArtifact {
    /// Build an artifact from an encoded page.
    pub fn from_page(page: EncodedPage, revalidate: Revalidate) -> Self {
        Self {
            bytes: page.wire.into_bytes(),
            revalidate,
        }
    }
}

/// Outcome shared by every caller attached to one regeneration task.
pub type RegenOutcome = Result<PublishReceipt, Arc<WeftError>>;

type SharedOutcome = Shared<BoxFuture<'static, RegenOutcome>>;

/// Coordinates background regeneration with at-most-one-in-flight per key.
///
/// The in-flight map is process-resident only; a restart loses it and may at
/// worst run one duplicate regeneration per key, which publication atomicity
/// makes benign.
pub struct RegenCoordinator<S: ContentStore> {
    store: Arc<S>,
    in_flight: Arc<DashMap<ContentKey, SharedOutcome>>,
}

impl<S: ContentStore> RegenCoordinator<S> {
    /// Create a coordinator over a content store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// The underlying content store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Trigger regeneration of `key`, or attach to the task already running.
    ///
    /// The first caller for a key spawns a task that runs `build` (the same
    /// compose+encode path as the initial build), publishes artifact then
    /// metadata atomically, and stamps the generation time. Late callers get
    /// the same outcome. The task runs to completion even if every caller
    /// stops waiting, and its in-flight entry is removed on completion
    /// regardless of outcome. Failures are logged; the previously published
    /// artifact stays authoritative.
    pub async fn trigger<F, Fut>(&self, key: &ContentKey, build: F) -> RegenOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = WeftResult<RegenArtifact>> + Send + 'static,
    {
        // Check-and-insert is one atomic step on the shard; no suspension
        // point sits between the lookup and the insert.
        let shared = match self.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let fut = build();
                let store = Arc::clone(&self.store);
                let in_flight = Arc::clone(&self.in_flight);
                let key = key.clone();
                let handle = tokio::spawn(async move {
                    let outcome = run_regen(store.as_ref(), &key, fut).await;
                    in_flight.remove(&key);
                    outcome
                });
                let shared: SharedOutcome = async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(Arc::new(WeftError::store(format!(
                            "regeneration task aborted: {e}"
                        )))),
                    }
                }
                .boxed()
                .shared();
                entry.insert(shared.clone());
                shared
            }
        };
        shared.await
    }

    /// Current regeneration state of `key` at `now`.
    pub fn state(&self, key: &ContentKey, now: SystemTime) -> WeftResult<TaskState> {
        if self.in_flight.contains_key(key) {
            return Ok(TaskState::Regenerating);
        }
        match self.store.read_metadata(key)? {
            None => Ok(TaskState::Stale),
            Some(meta) => {
                if is_stale(meta.generated_at(), meta.revalidate, now) {
                    Ok(TaskState::Stale)
                } else {
                    Ok(TaskState::Fresh)
                }
            }
        }
    }
}

async fn run_regen<S: ContentStore>(
    store: &S,
    key: &ContentKey,
    fut: impl Future<Output = WeftResult<RegenArtifact>>,
) -> RegenOutcome {
    let artifact = match fut.await {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "regeneration build failed; prior artifact remains");
            return Err(Arc::new(e));
        }
    };

    let generated_at = SystemTime::now();
    let meta = ArtifactMetadata::new(generated_at, artifact.revalidate);
    let published = store
        .write_artifact_atomic(key, &artifact.bytes)
        .and_then(|()| store.write_metadata_atomic(key, &meta));
    if let Err(e) = published {
        tracing::warn!(key = %key, error = %e, "regeneration publish failed; prior artifact remains");
        return Err(Arc::new(e));
    }

    tracing::debug!(key = %key, bytes = artifact.bytes.len(), "published regenerated artifact");
    Ok(PublishReceipt { generated_at })
}

#[cfg(test)]
#[path = "../../tests/unit/regen/coordinator.rs"]
mod tests;
