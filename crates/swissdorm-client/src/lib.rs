//! # swissdorm-client
//!
//! Client-side plumbing shared by every form and screen: the photo lifecycle
//! for in-progress forms, the photo backends, and remote-first repositories
//! backed by the local cache in `swissdorm-store`.

pub mod config;
pub mod error;
pub mod logging;
pub mod photos;
pub mod remote;
pub mod repository;
pub mod state;

pub use config::ClientConfig;
pub use error::{ClientError, PhotoError, RepositoryError};
pub use photos::{
    CloudPhotoRepository, FsPhotoRepository, MemoryPhotoRepository, PhotoManager, PhotoOrigin,
    PhotoRepository,
};
pub use remote::{Document, MemoryDocuments, RemoteDocuments};
pub use repository::{CachedRepository, DomainCache};
pub use state::AppState;
