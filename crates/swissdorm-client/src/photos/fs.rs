use std::path::{Path, PathBuf};

use async_trait::async_trait;
use swissdorm_shared::Photo;
use tokio::fs;
use tracing::{debug, info};

use super::PhotoRepository;
use crate::error::PhotoError;

const FILE_SCHEME: &str = "file://";

/// Device-local staging area for picked photos.
///
/// Uploading copies the bytes behind `photo.uri` into the staging directory
/// under `photo.file_name`.  Retrieved photos point at the staged copy.
#[derive(Debug, Clone)]
pub struct FsPhotoRepository {
    base_path: PathBuf,
}

impl FsPhotoRepository {
    pub async fn new(base_path: PathBuf) -> Result<Self, PhotoError> {
        fs::create_dir_all(&base_path).await?;
        info!(path = %base_path.display(), "local photo store initialized");
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve `file_name` inside the staging directory, refusing anything
    /// that is not a single plain path component.
    fn safe_path(&self, file_name: &str) -> Result<PathBuf, PhotoError> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(name)), None) => Ok(self.base_path.join(name)),
            _ => Err(PhotoError::InvalidName(file_name.to_string())),
        }
    }
}

fn source_path(uri: &str) -> &Path {
    Path::new(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
}

#[async_trait]
impl PhotoRepository for FsPhotoRepository {
    async fn retrieve_photo(&self, uid: &str) -> Result<Photo, PhotoError> {
        let path = self.safe_path(uid)?;
        if !fs::try_exists(&path).await? {
            return Err(PhotoError::NotFound(uid.to_string()));
        }
        Ok(Photo {
            uri: format!("{FILE_SCHEME}{}", path.display()),
            file_name: uid.to_string(),
        })
    }

    async fn upload_photo(&self, photo: &Photo) -> Result<(), PhotoError> {
        let dest = self.safe_path(&photo.file_name)?;
        let src = source_path(&photo.uri);
        if src == dest {
            return Ok(());
        }

        let size = fs::copy(src, &dest).await?;
        debug!(file_name = %photo.file_name, size, "staged photo locally");
        Ok(())
    }

    async fn delete_photo(&self, uid: &str) -> Result<bool, PhotoError> {
        let path = self.safe_path(uid)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(file_name = %uid, "deleted staged photo");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
