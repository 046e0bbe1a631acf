use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockTable = Arc<Mutex<HashMap<String, Entry>>>;

struct Entry {
    lock: Arc<AsyncMutex<()>>,
    // Holders plus waiters, including waiters whose acquire is still pending.
    users: usize,
}

/// One async mutex per key, created on demand and dropped once no task
/// holds or awaits it.
/// Clones share the same lock table.
#[derive(Default, Clone)]
pub struct KeyedLocks {
    table: LockTable,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task holds `key`, then hold it until the guard
    /// is dropped.  Waiters are served in FIFO order.
    ///
    /// Cancelling the returned future gives up the place in the queue.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let lock = {
            let mut table = lock_table(&self.table);
            let entry = table.entry(key.to_string()).or_insert_with(|| Entry {
                lock: Arc::new(AsyncMutex::new(())),
                users: 0,
            });
            entry.users += 1;
            Arc::clone(&entry.lock)
        };
        // Registered before the await so a cancelled waiter still leaves.
        let mut pending = KeyGuard {
            key: key.to_string(),
            table: Arc::clone(&self.table),
            guard: None,
        };
        pending.guard = Some(lock.lock_owned().await);
        pending
    }

    /// Number of keys currently held or awaited.
    pub fn active(&self) -> usize {
        lock_table(&self.table).len()
    }
}

pub struct KeyGuard {
    key: String,
    table: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = lock_table(&self.table);
        if let Some(entry) = table.get_mut(&self.key) {
            entry.users -= 1;
            if entry.users == 0 {
                table.remove(&self.key);
            }
        }
    }
}

// The table is only touched in short non-panicking sections.
fn lock_table(table: &LockTable) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
