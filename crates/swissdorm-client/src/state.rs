//! Process-wide client state.
//!
//! [`AppState`] is opened once at startup and owns the shared cache database
//! and the photo backends.  Everything else (repositories, photo managers)
//! is built from it on demand with its collaborators passed in explicitly.

use std::sync::Arc;

use swissdorm_shared::{Profile, RentalListing, Review};
use swissdorm_store::LocalCache;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::photos::{CloudPhotoRepository, FsPhotoRepository, PhotoManager, PhotoRepository};
use crate::remote::RemoteDocuments;
use crate::repository::CachedRepository;

pub struct AppState {
    pub config: ClientConfig,
    cache: LocalCache,
    local_photos: Arc<dyn PhotoRepository>,
    cloud_photos: Arc<dyn CloudPhotoRepository>,
}

impl AppState {
    /// Open the cache database and the local photo directory named by
    /// `config`.
    pub async fn open(
        config: ClientConfig,
        cloud_photos: Arc<dyn CloudPhotoRepository>,
    ) -> Result<Self, ClientError> {
        let cache = match &config.database_path {
            Some(path) => LocalCache::open_at(path).await?,
            None => LocalCache::open_default().await?,
        };
        let local_photos = Arc::new(FsPhotoRepository::new(config.photo_dir.clone()).await?);

        info!(
            photo_dir = %config.photo_dir.display(),
            "client state opened"
        );
        Ok(Self::from_parts(config, cache, local_photos, cloud_photos))
    }

    pub fn from_parts(
        config: ClientConfig,
        cache: LocalCache,
        local_photos: Arc<dyn PhotoRepository>,
        cloud_photos: Arc<dyn CloudPhotoRepository>,
    ) -> Self {
        Self {
            config,
            cache,
            local_photos,
            cloud_photos,
        }
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// A fresh photo working set for one form.
    pub fn photo_manager(&self) -> PhotoManager {
        PhotoManager::new(
            Arc::clone(&self.local_photos),
            Arc::clone(&self.cloud_photos),
        )
    }

    pub fn profiles(&self, remote: Arc<dyn RemoteDocuments<Profile>>) -> CachedRepository<Profile> {
        CachedRepository::new(remote, Arc::new(self.cache.profiles()))
    }

    pub fn reviews(&self, remote: Arc<dyn RemoteDocuments<Review>>) -> CachedRepository<Review> {
        CachedRepository::new(remote, Arc::new(self.cache.reviews()))
    }

    pub fn listings(
        &self,
        remote: Arc<dyn RemoteDocuments<RentalListing>>,
    ) -> CachedRepository<RentalListing> {
        CachedRepository::new(remote, Arc::new(self.cache.listings()))
    }

    /// Forget the signed-in user's cached profile.
    pub async fn end_session(&self) -> Result<(), ClientError> {
        let removed = self.cache.profiles().delete_all().await?;
        info!(removed, "session ended");
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.cache.close().await?;
        Ok(())
    }
}
