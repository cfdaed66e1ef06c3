use crate::modules::scores::core::score_table::ScoreTable;
use crate::shared::infrastructure::versioned_store::{StoreError, VersionedStore};
use serde::Serialize;
use std::sync::Arc;

/// Per-item totals with the rounded percentage split shown to voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemBreakdown {
    pub item: String,
    pub left: u64,
    pub right: u64,
    pub total: u64,
    pub left_percentage: u8,
    pub right_percentage: u8,
}

/// Read side of the score table. Never writes and never exposes versions.
pub struct GetScoresHandler<TStore>
where
    TStore: VersionedStore<ScoreTable> + ?Sized,
{
    store: Arc<TStore>,
}

impl<TStore> GetScoresHandler<TStore>
where
    TStore: VersionedStore<ScoreTable> + ?Sized,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<ScoreTable, StoreError> {
        Ok(self.store.read().await?.document)
    }

    pub async fn item(&self, item: &str) -> Result<Option<ItemBreakdown>, StoreError> {
        let table = self.all().await?;
        Ok(table.get(item).map(|score| {
            let (left_percentage, right_percentage) = score.split();
            ItemBreakdown {
                item: item.to_string(),
                left: score.left,
                right: score.right,
                total: score.total(),
                left_percentage,
                right_percentage,
            }
        }))
    }
}
