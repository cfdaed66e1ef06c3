// Port for a single-document store with optimistic concurrency.
//
// A store holds at most one document. Every successful write replaces the
// document as a whole and issues a fresh VersionToken. Writers pass the token
// they observed on read; the store rejects the write with a Conflict when the
// persisted revision has moved on since.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque revision marker issued by a store. Only equality is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn display_version(version: &Option<VersionToken>) -> String {
    version
        .as_ref()
        .map_or_else(|| "<absent>".to_string(), ToString::to_string)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error(
        "version conflict: expected {}, actual {}",
        display_version(.expected),
        display_version(.actual)
    )]
    Conflict {
        expected: Option<VersionToken>,
        actual: Option<VersionToken>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Immutable copy of the stored document and the revision it was read at.
/// `version` is `None` when nothing has been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<Doc> {
    pub document: Doc,
    pub version: Option<VersionToken>,
}

#[async_trait]
pub trait VersionedStore<Doc>: Send + Sync
where
    Doc: Clone + Default + Send + Sync + 'static,
{
    /// Current document and version, or `Doc::default()` and `None` if nothing was ever written.
    async fn read(&self) -> Result<Snapshot<Doc>, StoreError>;

    /// Replace the document if the persisted version still equals `expected`.
    /// `expected == None` means "create only if absent".
    async fn conditional_write(
        &self,
        document: &Doc,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError>;
}

pub mod in_memory;
pub mod json_file;
