use crate::modules::scores::core::score_table::ScoreTable;
use crate::modules::scores::core::vote::{Choice, VoteBatch};

/// Apply every vote in `batch` on top of `current` and return the new table.
///
/// `current` must be the snapshot read in the same attempt; the caller re-applies
/// the whole batch to a fresh snapshot on every retry.
pub fn merge(current: &ScoreTable, batch: &VoteBatch) -> ScoreTable {
    let mut next = current.clone();
    for vote in batch.votes() {
        let score = next.entry_mut(&vote.item);
        match vote.choice {
            Choice::Left => score.left = score.left.saturating_add(1),
            Choice::Right => score.right = score.right.saturating_add(1),
        }
    }
    next
}
