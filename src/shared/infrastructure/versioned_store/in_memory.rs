use crate::shared::infrastructure::versioned_store::{
    Snapshot, StoreError, VersionToken, VersionedStore,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Outcome forced onto the next `conditional_write`, consumed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteFault {
    Conflict,
    Backend(String),
}

struct Stored<Doc> {
    document: Doc,
    version: VersionToken,
}

/// Process-local store. Also serves as the test double for the retry loop:
/// writes can be delayed, forced to conflict or fail, and calls are counted.
pub struct InMemoryVersionedStore<Doc> {
    inner: RwLock<Option<Stored<Doc>>>,
    next_version: AtomicU64,
    offline: bool,
    delay_write_ms: AtomicU64,
    always_conflict: AtomicBool,
    faults: Mutex<VecDeque<WriteFault>>,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl<Doc> Default for InMemoryVersionedStore<Doc> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(None),
            next_version: AtomicU64::new(1),
            offline: false,
            delay_write_ms: AtomicU64::new(0),
            always_conflict: AtomicBool::new(false),
            faults: Mutex::new(VecDeque::new()),
            read_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }
}

impl<Doc> InMemoryVersionedStore<Doc> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    pub fn set_delay_write_ms(&self, ms: u64) {
        self.delay_write_ms.store(ms, Ordering::SeqCst);
    }

    pub fn always_conflict(&self) {
        self.always_conflict.store(true, Ordering::SeqCst);
    }

    pub async fn inject_write_faults(&self, faults: impl IntoIterator<Item = WriteFault>) {
        self.faults.lock().await.extend(faults);
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn issue_version(&self) -> VersionToken {
        let n = self.next_version.fetch_add(1, Ordering::SeqCst);
        VersionToken::new(format!("mem-{n}"))
    }
}

#[async_trait::async_trait]
impl<Doc> VersionedStore<Doc> for InMemoryVersionedStore<Doc>
where
    Doc: Clone + Default + Send + Sync + 'static,
{
    async fn read(&self) -> Result<Snapshot<Doc>, StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(StoreError::Backend("versioned store offline".into()));
        }
        let guard = self.inner.read().await;
        Ok(match guard.as_ref() {
            Some(stored) => Snapshot {
                document: stored.document.clone(),
                version: Some(stored.version.clone()),
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
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(StoreError::Backend("versioned store offline".into()));
        }
        let delay = self.delay_write_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let mut guard = self.inner.write().await;
        let actual = guard.as_ref().map(|stored| stored.version.clone());

        let fault = self.faults.lock().await.pop_front();
        match fault {
            Some(WriteFault::Backend(reason)) => return Err(StoreError::Backend(reason)),
            Some(WriteFault::Conflict) => {
                return Err(StoreError::Conflict {
                    expected: expected.cloned(),
                    actual,
                });
            }
            None => {}
        }
        if self.always_conflict.load(Ordering::SeqCst) || actual.as_ref() != expected {
            return Err(StoreError::Conflict {
                expected: expected.cloned(),
                actual,
            });
        }

        let version = self.issue_version();
        *guard = Some(Stored {
            document: document.clone(),
            version: version.clone(),
        });
        Ok(version)
    }
}
