use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote totals for a single item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
    pub left: u64,
    pub right: u64,
}

impl ItemScore {
    pub fn new(left: u64, right: u64) -> Self {
        Self { left, right }
    }

    pub fn total(&self) -> u64 {
        self.left.saturating_add(self.right)
    }

    /// Rounded `(left, right)` percentages. An item nobody voted on splits 50/50.
    pub fn split(&self) -> (u8, u8) {
        let total = self.total();
        if total == 0 {
            return (50, 50);
        }
        let left = ((self.left as f64 / total as f64) * 100.0).round() as u8;
        (left, 100 - left)
    }
}

/// All item scores, read and written as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    items: BTreeMap<String, ItemScore>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: &str) -> Option<&ItemScore> {
        self.items.get(item)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn entry_mut(&mut self, item: &str) -> &mut ItemScore {
        self.items.entry(item.to_string()).or_default()
    }
}

impl<S: Into<String>> FromIterator<(S, ItemScore)> for ScoreTable {
    fn from_iter<T: IntoIterator<Item = (S, ItemScore)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
