//! Working set of photos for one in-progress form.
//!
//! Every mutation of a given photo (keyed by its `uri`) runs under a
//! per-photo lock, so overlapping add/remove calls on the same photo are
//! applied in the order they were issued.  State only changes after the
//! backend call it depends on has succeeded: a failed or cancelled call
//! leaves the picked list exactly as it was.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{join_all, try_join_all};
use swissdorm_shared::Photo;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{CloudPhotoRepository, KeyedLocks, PhotoRepository};
use crate::error::PhotoError;

/// Which backend a picked photo came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOrigin {
    /// Picked on this device and staged in the local backend.
    Local,
    /// Loaded from cloud storage (an existing listing or review).
    Cloud,
}

#[derive(Debug, Clone)]
struct PickedPhoto {
    photo: Photo,
    origin: PhotoOrigin,
    /// Present in cloud storage under `photo.file_name`.
    committed: bool,
}

#[derive(Debug, Default)]
struct State {
    picked: Vec<PickedPhoto>,
    selected: Option<Photo>,
    /// Filenames removed from the form that still exist in the cloud.
    pending_cloud_deletions: Vec<String>,
}

impl State {
    fn position(&self, uri: &str) -> Option<usize> {
        self.picked.iter().position(|p| p.photo.uri == uri)
    }

    fn snapshot(&self) -> Vec<Photo> {
        self.picked.iter().map(|p| p.photo.clone()).collect()
    }
}

pub struct PhotoManager {
    local: Arc<dyn PhotoRepository>,
    cloud: Arc<dyn CloudPhotoRepository>,
    state: Mutex<State>,
    locks: KeyedLocks,
    photos_tx: watch::Sender<Vec<Photo>>,
}

impl PhotoManager {
    pub fn new(local: Arc<dyn PhotoRepository>, cloud: Arc<dyn CloudPhotoRepository>) -> Self {
        Self::with_photos(local, cloud, PhotoOrigin::Local, Vec::new())
    }

    /// Start from an already picked set of photos.  Cloud-origin photos are
    /// treated as committed.
    pub fn with_photos(
        local: Arc<dyn PhotoRepository>,
        cloud: Arc<dyn CloudPhotoRepository>,
        origin: PhotoOrigin,
        photos: Vec<Photo>,
    ) -> Self {
        let state = State {
            picked: photos
                .into_iter()
                .map(|photo| PickedPhoto {
                    photo,
                    origin,
                    committed: origin == PhotoOrigin::Cloud,
                })
                .collect(),
            ..State::default()
        };
        let (photos_tx, _) = watch::channel(state.snapshot());
        Self {
            local,
            cloud,
            state: Mutex::new(state),
            locks: KeyedLocks::new(),
            photos_tx,
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Current picked photos, in the order they were added.
    pub fn photos(&self) -> Vec<Photo> {
        self.state().snapshot()
    }

    /// Receive the picked list every time it changes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Photo>> {
        self.photos_tx.subscribe()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.state().position(uri).is_some()
    }

    pub fn origin(&self, uri: &str) -> Option<PhotoOrigin> {
        let state = self.state();
        state.position(uri).map(|i| state.picked[i].origin)
    }

    pub fn is_committed(&self, uri: &str) -> bool {
        let state = self.state();
        state
            .position(uri)
            .map(|i| state.picked[i].committed)
            .unwrap_or(false)
    }

    pub fn pending_cloud_deletions(&self) -> Vec<String> {
        self.state().pending_cloud_deletions.clone()
    }

    // ------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------

    /// Mark a picked photo as the one shown full screen.  Returns `None` and
    /// leaves the selection untouched if `uri` is not picked.
    pub fn select(&self, uri: &str) -> Option<Photo> {
        let mut state = self.state();
        let photo = state.position(uri).map(|i| state.picked[i].photo.clone())?;
        state.selected = Some(photo.clone());
        Some(photo)
    }

    pub fn selected(&self) -> Option<Photo> {
        self.state().selected.clone()
    }

    pub fn clear_selection(&self) {
        self.state().selected = None;
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Stage `photo` in the local backend, then append it to the picked list.
    ///
    /// Adding a photo that is already picked does nothing.
    pub async fn add_photo(&self, photo: Photo) -> Result<(), PhotoError> {
        let _guard = self.locks.acquire(&photo.uri).await;

        if self.contains(&photo.uri) {
            debug!(uri = %photo.uri, "photo already picked");
            return Ok(());
        }

        if let Err(e) = self.local.upload_photo(&photo).await {
            warn!(file_name = %photo.file_name, error = %e, "local photo upload failed");
            return Err(e);
        }

        debug!(file_name = %photo.file_name, "photo picked");
        self.update(|state| {
            // Picked again before the commit: its cloud copy must survive.
            state
                .pending_cloud_deletions
                .retain(|name| name != &photo.file_name);
            state.picked.push(PickedPhoto {
                photo,
                origin: PhotoOrigin::Local,
                committed: false,
            });
        });
        Ok(())
    }

    /// Drop the photo with this `uri` from the picked list, deleting its
    /// staged copy first when `remove_from_local` is set.
    ///
    /// Unknown uris are ignored without touching any backend.  Removing a
    /// photo that exists in the cloud schedules its cloud deletion for the
    /// next [`commit_changes`](Self::commit_changes).
    pub async fn remove_photo(&self, uri: &str, remove_from_local: bool) -> Result<(), PhotoError> {
        let _guard = self.locks.acquire(uri).await;

        let Some(entry) = self.find(uri) else {
            debug!(uri, "remove of unpicked photo ignored");
            return Ok(());
        };

        if remove_from_local {
            if let Err(e) = self.local.delete_photo(&entry.photo.file_name).await {
                warn!(file_name = %entry.photo.file_name, error = %e, "local photo delete failed");
                return Err(e);
            }
        }

        self.update(|state| {
            if let Some(i) = state.position(uri) {
                let removed = state.picked.remove(i);
                if removed.committed {
                    state.pending_cloud_deletions.push(removed.photo.file_name);
                }
            }
            if state.selected.as_ref().is_some_and(|p| p.uri == uri) {
                state.selected = None;
            }
        });
        debug!(uri, "photo removed");
        Ok(())
    }

    /// Replace the picked list with the photos stored in the cloud under
    /// `file_names`, keeping their order.
    ///
    /// Nothing changes if any filename fails to resolve.
    pub async fn initialize(&self, file_names: &[String]) -> Result<(), PhotoError> {
        let resolved = try_join_all(file_names.iter().map(|name| self.cloud.resolve(name))).await?;

        info!(count = resolved.len(), "photo set initialized from cloud");
        self.update(|state| {
            *state = State {
                picked: resolved
                    .into_iter()
                    .map(|photo| PickedPhoto {
                        photo,
                        origin: PhotoOrigin::Cloud,
                        committed: true,
                    })
                    .collect(),
                ..State::default()
            };
        });
        Ok(())
    }

    /// Upload every uncommitted picked photo to the cloud, then delete the
    /// cloud copies of photos removed since the last commit.
    ///
    /// Photos already in the cloud are not uploaded again.  Failures are
    /// collected into [`PhotoError::Incomplete`]; failed photos stay picked
    /// and uncommitted so calling this again retries only them.
    pub async fn commit_changes(&self) -> Result<(), PhotoError> {
        let to_upload: Vec<Photo> = {
            let state = self.state();
            state
                .picked
                .iter()
                .filter(|p| !p.committed)
                .map(|p| p.photo.clone())
                .collect()
        };

        let uploads = join_all(to_upload.iter().map(|photo| self.commit_one(photo))).await;
        let mut failed: Vec<String> = uploads.into_iter().flatten().collect();
        let uploaded = to_upload.len() - failed.len();

        let to_delete = self.pending_cloud_deletions();
        let deletions = join_all(to_delete.iter().map(|name| async move {
            match self.cloud.delete_photo(name).await {
                Ok(_) => Ok(name.clone()),
                Err(e) => {
                    warn!(file_name = %name, error = %e, "cloud photo delete failed");
                    Err(name.clone())
                }
            }
        }))
        .await;

        let deleted: Vec<String> = deletions
            .into_iter()
            .filter_map(|r| match r {
                Ok(name) => Some(name),
                Err(name) => {
                    failed.push(name);
                    None
                }
            })
            .collect();
        if !deleted.is_empty() {
            self.update(|state| {
                state
                    .pending_cloud_deletions
                    .retain(|name| !deleted.contains(name));
            });
        }

        info!(
            uploaded,
            deleted = deleted.len(),
            failed = failed.len(),
            "photo changes committed"
        );

        if failed.is_empty() {
            Ok(())
        } else {
            Err(PhotoError::Incomplete {
                operation: "commit",
                failed,
            })
        }
    }

    /// Upload one photo under its lock.  Returns the filename on failure.
    async fn commit_one(&self, photo: &Photo) -> Option<String> {
        let _guard = self.locks.acquire(&photo.uri).await;

        // Removed or committed by someone else while we waited.
        match self.find(&photo.uri) {
            Some(entry) if !entry.committed => {}
            _ => return None,
        }

        if let Err(e) = self.cloud.upload_photo(photo).await {
            warn!(file_name = %photo.file_name, error = %e, "cloud photo upload failed");
            return Some(photo.file_name.clone());
        }

        self.update(|state| {
            if let Some(i) = state.position(&photo.uri) {
                state.picked[i].committed = true;
            }
        });
        None
    }

    /// Delete every picked photo from the backend(s) holding it, along with
    /// any pending cloud deletions, and clear the form.
    ///
    /// Photos whose deletion fails stay picked and are reported in
    /// [`PhotoError::Incomplete`].
    pub async fn delete_all(&self) -> Result<(), PhotoError> {
        let picked: Vec<PickedPhoto> = self.state().picked.clone();

        let results = join_all(picked.iter().map(|entry| self.delete_one(entry))).await;
        let failed: Vec<String> = results.into_iter().flatten().collect();

        let pending = self.pending_cloud_deletions();
        let mut pending_failed = Vec::new();
        for name in &pending {
            if let Err(e) = self.cloud.delete_photo(name).await {
                warn!(file_name = %name, error = %e, "cloud photo delete failed");
                pending_failed.push(name.clone());
            }
        }

        self.update(|state| {
            state
                .picked
                .retain(|p| failed.contains(&p.photo.file_name));
            state.pending_cloud_deletions = pending_failed.clone();
            state.selected = None;
        });

        let mut all_failed = failed;
        all_failed.extend(pending_failed);
        info!(
            deleted = (picked.len() + pending.len()).saturating_sub(all_failed.len()),
            failed = all_failed.len(),
            "deleted all photos"
        );

        if all_failed.is_empty() {
            Ok(())
        } else {
            Err(PhotoError::Incomplete {
                operation: "delete",
                failed: all_failed,
            })
        }
    }

    async fn delete_one(&self, entry: &PickedPhoto) -> Option<String> {
        let _guard = self.locks.acquire(&entry.photo.uri).await;
        let name = &entry.photo.file_name;

        let result = match (entry.origin, entry.committed) {
            (PhotoOrigin::Local, false) => self.local.delete_photo(name).await,
            (PhotoOrigin::Local, true) => match self.local.delete_photo(name).await {
                Ok(_) => self.cloud.delete_photo(name).await,
                Err(e) => Err(e),
            },
            (PhotoOrigin::Cloud, _) => self.cloud.delete_photo(name).await,
        };

        match result {
            Ok(_) => None,
            Err(e) => {
                warn!(file_name = %name, error = %e, "photo delete failed");
                Some(name.clone())
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn state(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find(&self, uri: &str) -> Option<PickedPhoto> {
        let state = self.state();
        state.position(uri).map(|i| state.picked[i].clone())
    }

    /// Apply `f` and publish the resulting picked list.
    fn update(&self, f: impl FnOnce(&mut State)) {
        let snapshot = {
            let mut state = self.state();
            f(&mut state);
            state.snapshot()
        };
        self.photos_tx.send_replace(snapshot);
    }
}
