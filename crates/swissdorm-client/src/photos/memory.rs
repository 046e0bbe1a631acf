use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use swissdorm_shared::Photo;

use super::{CloudPhotoRepository, PhotoRepository};
use crate::error::PhotoError;

/// In-memory photo backend for tests and local development.
///
/// Counts calls, can be told to fail, and can add latency to every call so
/// overlapping operations become observable.
#[derive(Debug, Default)]
pub struct MemoryPhotoRepository {
    photos: Mutex<BTreeMap<String, Photo>>,
    base_url: String,
    latency: Option<Duration>,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    fail_retrieves: AtomicBool,
}

impl MemoryPhotoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Photos resolved through [`CloudPhotoRepository::resolve`] get
    /// `{base_url}/{file_name}` as their display uri.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_retrieves(&self, fail: bool) {
        self.fail_retrieves.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.stored().contains_key(file_name)
    }

    pub fn len(&self) -> usize {
        self.stored().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed a photo without counting it as an upload.
    pub fn insert(&self, photo: Photo) {
        self.stored().insert(photo.file_name.clone(), photo);
    }

    fn stored(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Photo>> {
        self.photos
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PhotoRepository for MemoryPhotoRepository {
    async fn retrieve_photo(&self, uid: &str) -> Result<Photo, PhotoError> {
        self.pause().await;
        if self.fail_retrieves.load(Ordering::SeqCst) {
            return Err(PhotoError::Backend(format!("retrieve of {uid} refused")));
        }
        self.stored()
            .get(uid)
            .cloned()
            .ok_or_else(|| PhotoError::NotFound(uid.to_string()))
    }

    async fn upload_photo(&self, photo: &Photo) -> Result<(), PhotoError> {
        self.pause().await;
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(PhotoError::Backend(format!(
                "upload of {} refused",
                photo.file_name
            )));
        }
        self.stored().insert(photo.file_name.clone(), photo.clone());
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_photo(&self, uid: &str) -> Result<bool, PhotoError> {
        self.pause().await;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(PhotoError::Backend(format!("delete of {uid} refused")));
        }
        let removed = self.stored().remove(uid).is_some();
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(removed)
    }
}

#[async_trait]
impl CloudPhotoRepository for MemoryPhotoRepository {
    async fn resolve(&self, file_name: &str) -> Result<Photo, PhotoError> {
        let stored = self.retrieve_photo(file_name).await?;
        if self.base_url.is_empty() {
            return Ok(stored);
        }
        Ok(Photo {
            uri: format!("{}/{}", self.base_url.trim_end_matches('/'), file_name),
            file_name: stored.file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> Photo {
        Photo::new(format!("file:///picked/{name}"), name).unwrap()
    }

    #[tokio::test]
    async fn upload_same_filename_does_not_duplicate() {
        let repo = MemoryPhotoRepository::new();
        repo.upload_photo(&photo("a.jpg")).await.unwrap();
        repo.upload_photo(&photo("a.jpg")).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.upload_count(), 2);
    }

    #[tokio::test]
    async fn failing_upload_stores_nothing() {
        let repo = MemoryPhotoRepository::new();
        repo.set_fail_uploads(true);
        assert!(repo.upload_photo(&photo("a.jpg")).await.is_err());
        assert!(repo.is_empty());
        assert_eq!(repo.upload_count(), 0);
    }

    #[tokio::test]
    async fn resolve_builds_display_uri() {
        let repo = MemoryPhotoRepository::with_base_url("https://cdn.example/photos/");
        repo.insert(photo("a.jpg"));
        let resolved = repo.resolve("a.jpg").await.unwrap();
        assert_eq!(resolved.uri, "https://cdn.example/photos/a.jpg");
        assert!(matches!(
            repo.resolve("missing.jpg").await,
            Err(PhotoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let repo = MemoryPhotoRepository::new();
        repo.insert(photo("a.jpg"));
        assert!(repo.delete_photo("a.jpg").await.unwrap());
        assert!(!repo.delete_photo("a.jpg").await.unwrap());
        assert_eq!(repo.delete_count(), 2);
    }
}
