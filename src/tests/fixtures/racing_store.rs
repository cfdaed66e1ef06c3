// A store where a rival client commits its own batch in between our read and
// our first conditional write, so that write is guaranteed to lose the race.

use crate::modules::scores::core::merge::merge;
use crate::modules::scores::core::score_table::ScoreTable;
use crate::modules::scores::core::vote::VoteBatch;
use crate::shared::infrastructure::versioned_store::in_memory::InMemoryVersionedStore;
use crate::shared::infrastructure::versioned_store::{
    Snapshot, StoreError, VersionToken, VersionedStore,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

pub struct RacingStore {
    inner: InMemoryVersionedStore<ScoreTable>,
    rival: Mutex<Option<VoteBatch>>,
}

impl RacingStore {
    pub fn new(rival: VoteBatch) -> Self {
        Self {
            inner: InMemoryVersionedStore::new(),
            rival: Mutex::new(Some(rival)),
        }
    }

    pub fn inner(&self) -> &InMemoryVersionedStore<ScoreTable> {
        &self.inner
    }
}

#[async_trait]
impl VersionedStore<ScoreTable> for RacingStore {
    async fn read(&self) -> Result<Snapshot<ScoreTable>, StoreError> {
        self.inner.read().await
    }

    async fn conditional_write(
        &self,
        document: &ScoreTable,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        if let Some(rival) = self.rival.lock().await.take() {
            let snapshot = self.inner.read().await?;
            self.inner
                .conditional_write(&merge(&snapshot.document, &rival), snapshot.version.as_ref())
                .await?;
        }
        self.inner.conditional_write(document, expected).await
    }
}
