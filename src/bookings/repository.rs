//! Booking storage.
//!
//! Status changes go through [`BookingRepository::update_status`], a
//! compare-and-swap on the current status, so two concurrent cancellations
//! of the same booking cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};

use super::models::{Booking, BookingStatus};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking
    async fn save(&self, booking: &Booking) -> Result<()>;

    /// Insert every booking or none of them
    async fn save_batch(&self, bookings: &[Booking]) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Option<Booking>>;

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Booking>>;

    /// Move `id` from `expected` to `next`.
    ///
    /// Fails with `NotFound` if the booking does not exist and `Conflict` if
    /// its stored status is no longer `expected`.
    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Booking>;
}

pub(crate) fn status_conflict(id: Uuid, expected: BookingStatus, actual: BookingStatus) -> AppError {
    AppError::Conflict(format!(
        "Booking {} is {}, expected {}",
        id, actual, expected
    ))
}

pub(crate) fn booking_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Booking {} not found", id))
}

/// Process-local repository used for tests and database-less deployments
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(AppError::Conflict(format!(
                "Booking {} already exists",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn save_batch(&self, batch: &[Booking]) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        if let Some(dup) = batch.iter().find(|b| bookings.contains_key(&b.id)) {
            return Err(AppError::Conflict(format!(
                "Booking {} already exists",
                dup.id
            )));
        }
        for booking in batch {
            bookings.insert(booking.id, booking.clone());
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        let mut owned: Vec<Booking> = bookings
            .values()
            .filter(|b| b.is_owned_by(owner_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Booking> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings.get_mut(&id).ok_or_else(|| booking_not_found(id))?;

        if booking.status != expected {
            return Err(status_conflict(id, expected, booking.status));
        }

        booking.status = next;
        booking.updated_at = at;
        Ok(booking.clone())
    }
}
