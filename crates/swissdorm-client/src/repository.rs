//! Write-through repositories: the remote store is authoritative, the local
//! cache mirrors whatever was last read or written and serves reads while the
//! remote is unreachable.

use std::sync::Arc;

use async_trait::async_trait;
use swissdorm_shared::{Profile, RentalListing, Review, Vote};
use swissdorm_store::{
    ProfileDao, ProfileRecord, RentalListingDao, RentalListingRecord, ReviewDao, ReviewRecord,
    StoreError,
};
use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::photos::KeyedLocks;
use crate::remote::{Document, RemoteDocuments};

/// Domain-level view of one cache table.
#[async_trait]
pub trait DomainCache<T: Document>: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<T>, StoreError>;
    async fn load_all(&self) -> Result<Vec<T>, StoreError>;
    async fn load_by_owner(&self, owner_id: &str) -> Result<Vec<T>, StoreError>;
    async fn store(&self, value: &T) -> Result<(), StoreError>;
    /// Make the cached set exactly `values`.
    async fn replace_all(&self, values: &[T]) -> Result<(), StoreError>;
    async fn evict(&self, id: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl DomainCache<Review> for ReviewDao {
    async fn load(&self, id: &str) -> Result<Option<Review>, StoreError> {
        Ok(self.get_by_id(id).await?.map(|r| r.to_domain()))
    }

    async fn load_all(&self) -> Result<Vec<Review>, StoreError> {
        Ok(self.get_all().await?.iter().map(Review::from).collect())
    }

    async fn load_by_owner(&self, owner_id: &str) -> Result<Vec<Review>, StoreError> {
        Ok(self
            .get_all_by_owner(owner_id)
            .await?
            .iter()
            .map(Review::from)
            .collect())
    }

    async fn store(&self, value: &Review) -> Result<(), StoreError> {
        self.insert(ReviewRecord::try_from_domain(value)?).await
    }

    async fn replace_all(&self, values: &[Review]) -> Result<(), StoreError> {
        let records = values
            .iter()
            .map(ReviewRecord::try_from_domain)
            .collect::<Result<Vec<_>, StoreError>>()?;
        ReviewDao::replace_all(self, records).await
    }

    async fn evict(&self, id: &str) -> Result<bool, StoreError> {
        self.delete_by_id(id).await
    }
}

#[async_trait]
impl DomainCache<RentalListing> for RentalListingDao {
    async fn load(&self, id: &str) -> Result<Option<RentalListing>, StoreError> {
        Ok(self.get_by_id(id).await?.map(|r| r.to_domain()))
    }

    async fn load_all(&self) -> Result<Vec<RentalListing>, StoreError> {
        Ok(self.get_all().await?.iter().map(RentalListing::from).collect())
    }

    async fn load_by_owner(&self, owner_id: &str) -> Result<Vec<RentalListing>, StoreError> {
        Ok(self
            .get_all_by_owner(owner_id)
            .await?
            .iter()
            .map(RentalListing::from)
            .collect())
    }

    async fn store(&self, value: &RentalListing) -> Result<(), StoreError> {
        self.insert(RentalListingRecord::try_from_domain(value)?).await
    }

    async fn replace_all(&self, values: &[RentalListing]) -> Result<(), StoreError> {
        let records = values
            .iter()
            .map(RentalListingRecord::try_from_domain)
            .collect::<Result<Vec<_>, StoreError>>()?;
        RentalListingDao::replace_all(self, records).await
    }

    async fn evict(&self, id: &str) -> Result<bool, StoreError> {
        self.delete_by_id(id).await
    }
}

/// The profile table holds only the signed-in user's profile, so storing a
/// profile replaces whatever row was there and bulk reads are not cached.
#[async_trait]
impl DomainCache<Profile> for ProfileDao {
    async fn load(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.get_by_id(id).await?.map(|r| r.to_domain()))
    }

    async fn load_all(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.get_all().await?.iter().map(Profile::from).collect())
    }

    async fn load_by_owner(&self, owner_id: &str) -> Result<Vec<Profile>, StoreError> {
        Ok(self.load(owner_id).await?.into_iter().collect())
    }

    async fn store(&self, value: &Profile) -> Result<(), StoreError> {
        self.replace(ProfileRecord::from_domain(value)).await
    }

    async fn replace_all(&self, _values: &[Profile]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn evict(&self, id: &str) -> Result<bool, StoreError> {
        self.delete_by_id(id).await
    }
}

/// Remote-first repository with a local write-through cache.
pub struct CachedRepository<T: Document> {
    remote: Arc<dyn RemoteDocuments<T>>,
    cache: Arc<dyn DomainCache<T>>,
    locks: KeyedLocks,
}

impl<T: Document> Clone for CachedRepository<T> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            cache: Arc::clone(&self.cache),
            locks: self.locks.clone(),
        }
    }
}

impl<T: Document> CachedRepository<T> {
    pub fn new(remote: Arc<dyn RemoteDocuments<T>>, cache: Arc<dyn DomainCache<T>>) -> Self {
        Self {
            remote,
            cache,
            locks: KeyedLocks::new(),
        }
    }

    /// All documents, refreshed from the remote when it is reachable.
    ///
    /// A successful fetch replaces the cached set, so documents deleted
    /// remotely drop out of the cache too.
    pub async fn get_all(&self) -> Result<Vec<T>, RepositoryError> {
        match self.remote.fetch_all().await {
            Ok(documents) => {
                self.cache.replace_all(&documents).await?;
                debug!(count = documents.len(), "refreshed cache from remote");
                Ok(documents)
            }
            Err(e) => {
                warn!(error = %e, "remote fetch failed, serving cached documents");
                Ok(self.cache.load_all().await?)
            }
        }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>, RepositoryError> {
        match self.remote.fetch_by_id(id).await {
            Ok(Some(document)) => {
                self.cache.store(&document).await?;
                Ok(Some(document))
            }
            Ok(None) => {
                // Deleted remotely; drop the stale copy.
                self.cache.evict(id).await?;
                Ok(None)
            }
            Err(e) => {
                warn!(id, error = %e, "remote fetch failed, serving cached document");
                Ok(self.cache.load(id).await?)
            }
        }
    }

    /// Documents owned by `owner_id`, read from the cache after a refresh
    /// attempt.
    pub async fn get_all_by_owner(&self, owner_id: &str) -> Result<Vec<T>, RepositoryError> {
        self.get_all().await?;
        Ok(self.cache.load_by_owner(owner_id).await?)
    }

    pub async fn create(&self, document: &T) -> Result<(), RepositoryError> {
        let _guard = self.locks.acquire(document.document_id()).await;
        self.remote.create(document).await?;
        self.cache.store(document).await?;
        Ok(())
    }

    pub async fn update(&self, document: &T) -> Result<(), RepositoryError> {
        let _guard = self.locks.acquire(document.document_id()).await;
        self.remote.update(document).await?;
        self.cache.store(document).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let _guard = self.locks.acquire(id).await;
        self.remote.delete(id).await?;
        self.cache.evict(id).await?;
        Ok(())
    }
}

impl CachedRepository<Review> {
    /// Record `user_id`'s vote on a review.
    ///
    /// The vote is applied to the latest remote copy, or to the cached copy
    /// when the remote is unreachable.  The cache is updated first so readers
    /// see the vote at once; if the remote rejects the update the cached copy
    /// is restored.
    pub async fn vote(
        &self,
        review_id: &str,
        user_id: &str,
        vote: Vote,
    ) -> Result<Review, RepositoryError> {
        let _guard = self.locks.acquire(review_id).await;

        let current = match self.remote.fetch_by_id(review_id).await {
            Ok(Some(review)) => review,
            Ok(None) => {
                self.cache.evict(review_id).await?;
                return Err(RepositoryError::NotFound(review_id.to_string()));
            }
            Err(e) => {
                warn!(review_id, error = %e, "remote fetch failed, voting on cached copy");
                self.cache
                    .load(review_id)
                    .await?
                    .ok_or_else(|| RepositoryError::NotFound(review_id.to_string()))?
            }
        };

        let mut tentative = current.clone();
        tentative.apply_vote(user_id, vote);
        self.cache.store(&tentative).await?;

        if let Err(e) = self.remote.update(&tentative).await {
            warn!(review_id, error = %e, "vote rejected by remote, rolling back");
            self.cache.store(&current).await?;
            return Err(e);
        }

        debug!(review_id, score = tentative.score(), "vote recorded");
        Ok(tentative)
    }
}
