//! Photo storage backends and the per-form photo lifecycle.
//!
//! A form (new listing, review, profile picture) works on a set of picked
//! photos.  Freshly picked images are staged in a device-local backend;
//! [`PhotoManager::commit_changes`] pushes them to the cloud backend.  The
//! manager only ever talks to the [`PhotoRepository`] and
//! [`CloudPhotoRepository`] traits.

mod fs;
mod locks;
mod manager;
mod memory;

pub use fs::FsPhotoRepository;
pub use locks::{KeyGuard, KeyedLocks};
pub use manager::{PhotoManager, PhotoOrigin};
pub use memory::MemoryPhotoRepository;

use async_trait::async_trait;
use swissdorm_shared::Photo;

use crate::error::PhotoError;

/// A store of photo blobs addressed by filename.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// Fetch the photo stored under `uid` (its filename).
    async fn retrieve_photo(&self, uid: &str) -> Result<Photo, PhotoError>;

    /// Store `photo` under its filename, replacing any previous blob with the
    /// same filename.
    async fn upload_photo(&self, photo: &Photo) -> Result<(), PhotoError>;

    /// Returns `false` when nothing was stored under `uid`.
    async fn delete_photo(&self, uid: &str) -> Result<bool, PhotoError>;
}

/// Durable remote photo storage.
#[async_trait]
pub trait CloudPhotoRepository: PhotoRepository {
    /// Turn a stored filename into a photo whose `uri` can be displayed.
    async fn resolve(&self, file_name: &str) -> Result<Photo, PhotoError>;
}
