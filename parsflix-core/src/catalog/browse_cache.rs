use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use super::query::BrowseResponse;

/// Single-slot TTL cache for the assembled browse page.
///
/// Browse is the hottest read and its rows only change on ingest or delete,
/// so a short TTL plus explicit invalidation keeps it fresh enough without a
/// per-row cache.
#[derive(Debug)]
pub struct BrowseCache {
    ttl: Duration,
    slot: Mutex<Option<Entry>>,
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    response: BrowseResponse,
}

impl BrowseCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub async fn get(&self) -> Option<BrowseResponse> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                Some(entry.response.clone())
            }
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, response: BrowseResponse) {
        let mut slot = self.slot.lock().await;
        *slot = Some(Entry {
            stored_at: Instant::now(),
            response,
        });
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
    }
}

impl Default for BrowseCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
