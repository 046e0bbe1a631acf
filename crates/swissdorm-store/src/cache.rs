//! Async access to the shared cache database.
//!
//! [`LocalCache`] is opened once per process and cloned into every DAO
//! handle.  Each call hops onto tokio's blocking pool, so async callers never
//! stall on SQLite I/O.  One connection behind one mutex serializes writes,
//! which keeps operations on the same row in issuance order.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::records::{ProfileRecord, RentalListingRecord, ReviewRecord};

/// Process-wide handle to the cache database.
#[derive(Clone)]
pub struct LocalCache {
    db: Arc<Mutex<Option<Database>>>,
}

impl LocalCache {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(Some(db))),
        }
    }

    /// Open the platform default database.
    pub async fn open_default() -> Result<Self> {
        let db = tokio::task::spawn_blocking(Database::new)
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;
        Ok(Self::new(db))
    }

    pub async fn open_at(path: &Path) -> Result<Self> {
        let path = path.to_path_buf();
        let db = tokio::task::spawn_blocking(move || Database::open_at(&path))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;
        Ok(Self::new(db))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Run `f` against the database on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|_| StoreError::Task("cache mutex poisoned".to_string()))?;
            let db = guard.as_ref().ok_or(StoreError::Closed)?;
            f(db)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Close the connection.  Every later operation on any clone fails with
    /// [`StoreError::Closed`]; closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let taken = db
                .lock()
                .map_err(|_| StoreError::Task("cache mutex poisoned".to_string()))?
                .take();
            match taken {
                Some(db) => {
                    tracing::info!("closing cache database");
                    db.close()
                }
                None => Ok(()),
            }
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    pub fn is_open(&self) -> bool {
        self.db.lock().map(|g| g.is_some()).unwrap_or(false)
    }

    pub fn profiles(&self) -> ProfileDao {
        ProfileDao {
            cache: self.clone(),
        }
    }

    pub fn reviews(&self) -> ReviewDao {
        ReviewDao {
            cache: self.clone(),
        }
    }

    pub fn listings(&self) -> RentalListingDao {
        RentalListingDao {
            cache: self.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ProfileDao {
    cache: LocalCache,
}

impl ProfileDao {
    pub async fn get_by_id(&self, owner_id: &str) -> Result<Option<ProfileRecord>> {
        let owner_id = owner_id.to_string();
        self.cache.run(move |db| db.get_profile(&owner_id)).await
    }

    pub async fn get_all(&self) -> Result<Vec<ProfileRecord>> {
        self.cache.run(|db| db.list_profiles()).await
    }

    pub async fn insert(&self, profile: ProfileRecord) -> Result<()> {
        self.cache.run(move |db| db.insert_profile(&profile)).await
    }

    pub async fn insert_many(&self, profiles: Vec<ProfileRecord>) -> Result<()> {
        self.cache.run(move |db| db.insert_profiles(&profiles)).await
    }

    /// Delete every profile and insert `profile` in one transaction.
    pub async fn replace(&self, profile: ProfileRecord) -> Result<()> {
        self.cache.run(move |db| db.replace_profile(&profile)).await
    }

    pub async fn update(&self, profile: ProfileRecord) -> Result<bool> {
        self.cache.run(move |db| db.update_profile(&profile)).await
    }

    pub async fn delete_by_id(&self, owner_id: &str) -> Result<bool> {
        let owner_id = owner_id.to_string();
        self.cache.run(move |db| db.delete_profile(&owner_id)).await
    }

    pub async fn delete_all(&self) -> Result<usize> {
        self.cache.run(|db| db.delete_all_profiles()).await
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ReviewDao {
    cache: LocalCache,
}

impl ReviewDao {
    pub async fn get_by_id(&self, uid: &str) -> Result<Option<ReviewRecord>> {
        let uid = uid.to_string();
        self.cache.run(move |db| db.get_review(&uid)).await
    }

    pub async fn get_all(&self) -> Result<Vec<ReviewRecord>> {
        self.cache.run(|db| db.list_reviews()).await
    }

    pub async fn get_all_by_owner(&self, owner_id: &str) -> Result<Vec<ReviewRecord>> {
        let owner_id = owner_id.to_string();
        self.cache
            .run(move |db| db.list_reviews_by_owner(&owner_id))
            .await
    }

    pub async fn get_all_by_residency(&self, residency_name: &str) -> Result<Vec<ReviewRecord>> {
        let residency_name = residency_name.to_string();
        self.cache
            .run(move |db| db.list_reviews_by_residency(&residency_name))
            .await
    }

    pub async fn insert(&self, review: ReviewRecord) -> Result<()> {
        self.cache.run(move |db| db.insert_review(&review)).await
    }

    pub async fn insert_many(&self, reviews: Vec<ReviewRecord>) -> Result<()> {
        self.cache.run(move |db| db.insert_reviews(&reviews)).await
    }

    /// Make `reviews` the exact contents of the table.
    pub async fn replace_all(&self, reviews: Vec<ReviewRecord>) -> Result<()> {
        self.cache.run(move |db| db.replace_reviews(&reviews)).await
    }

    pub async fn update(&self, review: ReviewRecord) -> Result<bool> {
        self.cache.run(move |db| db.update_review(&review)).await
    }

    pub async fn delete_by_id(&self, uid: &str) -> Result<bool> {
        let uid = uid.to_string();
        self.cache.run(move |db| db.delete_review(&uid)).await
    }
}

// ---------------------------------------------------------------------------
// Rental listing
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RentalListingDao {
    cache: LocalCache,
}

impl RentalListingDao {
    pub async fn get_by_id(&self, uid: &str) -> Result<Option<RentalListingRecord>> {
        let uid = uid.to_string();
        self.cache.run(move |db| db.get_listing(&uid)).await
    }

    pub async fn get_all(&self) -> Result<Vec<RentalListingRecord>> {
        self.cache.run(|db| db.list_listings()).await
    }

    pub async fn get_all_by_owner(&self, owner_id: &str) -> Result<Vec<RentalListingRecord>> {
        let owner_id = owner_id.to_string();
        self.cache
            .run(move |db| db.list_listings_by_owner(&owner_id))
            .await
    }

    pub async fn insert(&self, listing: RentalListingRecord) -> Result<()> {
        self.cache.run(move |db| db.insert_listing(&listing)).await
    }

    pub async fn insert_many(&self, listings: Vec<RentalListingRecord>) -> Result<()> {
        self.cache.run(move |db| db.insert_listings(&listings)).await
    }

    /// Make `listings` the exact contents of the table.
    pub async fn replace_all(&self, listings: Vec<RentalListingRecord>) -> Result<()> {
        self.cache
            .run(move |db| db.replace_listings(&listings))
            .await
    }

    pub async fn update(&self, listing: RentalListingRecord) -> Result<bool> {
        self.cache.run(move |db| db.update_listing(&listing)).await
    }

    pub async fn delete_by_id(&self, uid: &str) -> Result<bool> {
        let uid = uid.to_string();
        self.cache.run(move |db| db.delete_listing(&uid)).await
    }
}
