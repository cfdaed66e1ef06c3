use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a vote batch must contain at least one vote")]
    EmptyBatch,

    #[error("vote #{index} has an empty item")]
    EmptyItem { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub item: String,
    pub choice: Choice,
}

impl Vote {
    pub fn new(item: impl Into<String>, choice: Choice) -> Self {
        Self {
            item: item.into(),
            choice,
        }
    }
}

/// One client session's votes. Never empty and every item is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteBatch {
    votes: Vec<Vote>,
}

impl VoteBatch {
    pub fn new(votes: Vec<Vote>) -> Result<Self, ValidationError> {
        if votes.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if let Some(index) = votes.iter().position(|v| v.item.is_empty()) {
            return Err(ValidationError::EmptyItem { index });
        }
        Ok(Self { votes })
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
