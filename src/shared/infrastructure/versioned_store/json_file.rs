// Versioned store persisting the document as one pretty-printed JSON file.
//
// On-disk shape: {"version": "<uuid v7>", "written_at": <unix millis>, "document": ...}
//
// A file holding only the bare document (the format written before versioning)
// is still readable. Its version is a uuid v5 of the file bytes, so a
// conditional write against it works and rewrites the file in the versioned shape.
//
// Every write goes to its own temp file which is then renamed over the
// document, so readers only ever observe a complete revision. The
// compare-and-swap is serialized by an async mutex, which makes it atomic for
// every writer sharing this instance. Separate processes must not share one path.

use crate::shared::infrastructure::versioned_store::{
    Snapshot, StoreError, VersionToken, VersionedStore,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Deserialize)]
struct StoredDocument<Doc> {
    version: VersionToken,
    document: Doc,
}

#[derive(Serialize)]
struct OutgoingDocument<'a, Doc> {
    version: &'a VersionToken,
    written_at: i64,
    document: &'a Doc,
}

pub struct JsonFileVersionedStore<Doc> {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
    _document: PhantomData<fn() -> Doc>,
}

fn backend(path: &Path, action: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("{action} {}: {err}", path.display()))
}

fn unversioned_token(bytes: &[u8]) -> VersionToken {
    VersionToken::new(format!(
        "unversioned-{}",
        Uuid::new_v5(&Uuid::NAMESPACE_OID, bytes)
    ))
}

/// Sibling of `path` named `<file>.<uuid>.tmp`, unique per write.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", Uuid::now_v7()));
    path.with_file_name(name)
}

async fn replace(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| backend(path, "failed to create directory for", e))?;
    }
    let temp = temp_path(path);
    let written = async {
        let mut file = tokio::fs::File::create(&temp)
            .await
            .map_err(|e| backend(&temp, "failed to create", e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| backend(&temp, "failed to write", e))?;
        file.sync_all()
            .await
            .map_err(|e| backend(&temp, "failed to sync", e))?;
        drop(file);
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| backend(path, "failed to replace", e))
    }
    .await;
    if written.is_err() {
        match tokio::fs::remove_file(&temp).await {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                tracing::warn!(temp = %temp.display(), error = %e, "could not remove temp file")
            }
            _ => {}
        }
    }
    written
}

impl<Doc> JsonFileVersionedStore<Doc> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
            _document: PhantomData,
        }
    }
}

impl<Doc: DeserializeOwned> JsonFileVersionedStore<Doc> {
    async fn load(&self) -> Result<Option<StoredDocument<Doc>>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(backend(&self.path, "failed to read", e)),
        };
        match serde_json::from_slice::<StoredDocument<Doc>>(&bytes) {
            Ok(stored) => Ok(Some(stored)),
            Err(err) => {
                let document = serde_json::from_slice::<Doc>(&bytes)
                    .map_err(|_| backend(&self.path, "failed to parse", err))?;
                Ok(Some(StoredDocument {
                    version: unversioned_token(&bytes),
                    document,
                }))
            }
        }
    }
}

#[async_trait::async_trait]
impl<Doc> VersionedStore<Doc> for JsonFileVersionedStore<Doc>
where
    Doc: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read(&self) -> Result<Snapshot<Doc>, StoreError> {
        Ok(match self.load().await? {
            Some(stored) => Snapshot {
                document: stored.document,
                version: Some(stored.version),
            },
            None => Snapshot {
                document: Doc::default(),
                version: None,
            },
        })
    }

    async fn conditional_write(
        &self,
        document: &Doc,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let guard = self.write_lock.clone().lock_owned().await;

        let actual = self.load().await?.map(|stored| stored.version);
        if actual.as_ref() != expected {
            return Err(StoreError::Conflict {
                expected: expected.cloned(),
                actual,
            });
        }

        let version = VersionToken::new(Uuid::now_v7().to_string());
        let bytes = serde_json::to_vec_pretty(&OutgoingDocument {
            version: &version,
            written_at: Utc::now().timestamp_millis(),
            document,
        })
        .map_err(|e| backend(&self.path, "failed to encode", e))?;

        // The file I/O outlives a dropped caller, so the lock goes with it.
        let path = self.path.clone();
        tokio::spawn(async move {
            let _guard = guard;
            replace(&path, &bytes).await
        })
        .await
        .map_err(|e| backend(&self.path, "write task failed for", e))??;

        tracing::debug!(path = %self.path.display(), %version, "document written");
        Ok(version)
    }
}
