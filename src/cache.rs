//! In-memory caching using moka
//!
//! Read-through cache of bookings keyed by id, used for plain reads only.
//! Status changes and refund previews always read the repository, and every
//! status change invalidates the local entry.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::bookings::Booking;

/// Application cache holding recently read bookings
#[derive(Clone)]
pub struct AppCache {
    /// Bookings (id -> Booking)
    pub bookings: Cache<Uuid, Arc<Booking>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            // 10 min TTL, 5 min idle
            bookings: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(Duration::from_secs(10 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    pub async fn get_booking(&self, id: Uuid) -> Option<Arc<Booking>> {
        self.bookings.get(&id).await
    }

    pub async fn put_booking(&self, booking: Booking) {
        self.bookings.insert(booking.id, Arc::new(booking)).await;
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            bookings_size: self.bookings.entry_count(),
        }
    }

    /// Invalidate a specific booking
    pub async fn invalidate_booking(&self, id: Uuid) {
        self.bookings.invalidate(&id).await;
        tracing::debug!("Cache invalidated for booking: {}", id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub bookings_size: u64,
}
