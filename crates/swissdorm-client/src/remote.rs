//! The remote document store, seen through the narrow contract the cached
//! repositories consume.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use swissdorm_shared::{Profile, RentalListing, Review};

use crate::error::RepositoryError;

/// A domain aggregate stored as one remote document.
pub trait Document: Clone + Send + Sync + 'static {
    fn document_id(&self) -> &str;
    fn owner_id(&self) -> &str;
}

impl Document for Profile {
    fn document_id(&self) -> &str {
        &self.owner_id
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Document for Review {
    fn document_id(&self) -> &str {
        &self.uid
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

impl Document for RentalListing {
    fn document_id(&self) -> &str {
        &self.uid
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// One remote collection of documents of type `T`.
///
/// Implementations own the wire protocol, authentication and timeouts.
#[async_trait]
pub trait RemoteDocuments<T: Document>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<T>, RepositoryError>;

    /// `Ok(None)` when no document has this id.
    async fn fetch_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError>;

    async fn create(&self, document: &T) -> Result<(), RepositoryError>;

    async fn update(&self, document: &T) -> Result<(), RepositoryError>;

    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// In-memory document collection for tests and offline development.
#[derive(Debug)]
pub struct MemoryDocuments<T> {
    documents: Mutex<BTreeMap<String, T>>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl<T: Document> Default for MemoryDocuments<T> {
    fn default() -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            offline: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }
}

impl<T: Document> MemoryDocuments<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = T>) -> Self {
        let remote = Self::default();
        for document in documents {
            remote.seed(document);
        }
        remote
    }

    /// Insert a document without counting it as a write.
    pub fn seed(&self, document: T) {
        self.stored()
            .insert(document.document_id().to_string(), document);
    }

    /// While offline every call fails with [`RepositoryError::Remote`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.stored().get(id).cloned()
    }

    fn stored(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, T>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Remote("remote store unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: Document> RemoteDocuments<T> for MemoryDocuments<T> {
    async fn fetch_all(&self) -> Result<Vec<T>, RepositoryError> {
        self.check_online()?;
        Ok(self.stored().values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        self.check_online()?;
        Ok(self.get(id))
    }

    async fn create(&self, document: &T) -> Result<(), RepositoryError> {
        self.check_online()?;
        self.seed(document.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, document: &T) -> Result<(), RepositoryError> {
        self.check_online()?;
        let mut stored = self.stored();
        let slot = stored
            .get_mut(document.document_id())
            .ok_or_else(|| RepositoryError::NotFound(document.document_id().to_string()))?;
        *slot = document.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.check_online()?;
        self.stored().remove(id);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
