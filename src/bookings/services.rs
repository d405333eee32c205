//! Booking lifecycle operations.
//!
//! Pricing is recomputed server-side from the tier policy at creation; the
//! resulting breakdown is stored with the booking and used for refunds.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::{AppError, Result};
use crate::pricing::requests::{BulkQuoteRequest, QuoteRequest};
use crate::pricing::services::BatchTotals;
use crate::pricing::{quote_batch, quote_item, quote_refund, PolicyBook, RefundQuote, ServiceType};
use crate::session::Caller;

use super::models::{Booking, BookingStatus, NewBooking};
use super::repository::BookingRepository;

/// Bookings created by one bulk request
#[derive(Debug, Clone)]
pub struct BulkBooking {
    pub batch_id: Uuid,
    pub bookings: Vec<Booking>,
    pub totals: BatchTotals,
}

#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
    cache: AppCache,
    policies: Arc<PolicyBook>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>, cache: AppCache, policies: Arc<PolicyBook>) -> Self {
        Self {
            repo,
            cache,
            policies,
        }
    }

    fn new_booking(
        caller: &Caller,
        service: ServiceType,
        req: &QuoteRequest,
        batch_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<NewBooking> {
        if req.start_at <= now {
            return Err(AppError::Validation(
                "start_at must be in the future".to_string(),
            ));
        }

        Ok(NewBooking {
            owner_id: caller.id.clone(),
            owner_tier: caller.tier,
            service_type: service,
            listing_id: req.listing_id.clone(),
            start_at: req.start_at,
            end_at: req.end_at,
            unit_rate: req.unit_rate,
            extras_count: req.extras_count,
            traveler_count: req.traveler_count,
            notes: req.notes.clone(),
            batch_id,
        })
    }

    /// Price and store a pending booking
    pub async fn create(
        &self,
        caller: &Caller,
        service: ServiceType,
        req: &QuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let policy = self.policies.policy(caller.tier, service);
        let pricing = quote_item(&policy, &req.to_line())?;
        let new = Self::new_booking(caller, service, req, None, now)?;

        let booking = Booking::pending(new, pricing, now);
        self.repo.save(&booking).await?;

        info!(
            booking_id = %booking.id,
            owner = %booking.owner_id,
            service = service.as_str(),
            total = %booking.pricing.total_price,
            "Booking created"
        );

        Ok(booking)
    }

    /// Price and store every line of a bulk request, or none of them
    pub async fn create_bulk(
        &self,
        caller: &Caller,
        service: ServiceType,
        req: &BulkQuoteRequest,
        now: DateTime<Utc>,
    ) -> Result<BulkBooking> {
        let policy = self.policies.policy(caller.tier, service);
        let quote = quote_batch(&policy, &req.to_lines())?;
        let batch_id = Uuid::new_v4();

        let bookings = req
            .items
            .iter()
            .zip(quote.items)
            .enumerate()
            .map(|(index, (item, pricing))| {
                Self::new_booking(caller, service, item, Some(batch_id), now)
                    .map(|new| Booking::pending(new, pricing, now))
                    .map_err(|e| AppError::Validation(format!("Item {}: {}", index, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        self.repo.save_batch(&bookings).await?;

        info!(
            batch_id = %batch_id,
            owner = %caller.id,
            items = bookings.len(),
            total = %quote.totals.total_price,
            "Bulk booking created"
        );

        Ok(BulkBooking {
            batch_id,
            bookings,
            totals: quote.totals,
        })
    }

    fn ensure_owner(caller: &Caller, booking: &Booking) -> Result<()> {
        if !booking.is_owned_by(&caller.id) {
            return Err(AppError::Forbidden(
                "Booking belongs to another account".to_string(),
            ));
        }
        Ok(())
    }

    /// Fetch a booking owned by `caller`, served from the cache when warm
    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Booking> {
        let booking = if let Some(cached) = self.cache.get_booking(id).await {
            debug!("Cache HIT for booking: {}", id);
            (*cached).clone()
        } else {
            debug!("Cache MISS for booking: {}", id);
            let booking = self.load(id).await?;
            self.cache.put_booking(booking.clone()).await;
            booking
        };

        Self::ensure_owner(caller, &booking)?;
        Ok(booking)
    }

    async fn load(&self, id: Uuid) -> Result<Booking> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    /// Stored state of an owned booking; status decisions never use the cache
    async fn load_current(&self, caller: &Caller, id: Uuid) -> Result<Booking> {
        let booking = self.load(id).await?;
        Self::ensure_owner(caller, &booking)?;
        Ok(booking)
    }

    pub async fn list(&self, caller: &Caller) -> Result<Vec<Booking>> {
        self.repo.list_by_owner(&caller.id).await
    }

    async fn transition(
        &self,
        caller: &Caller,
        id: Uuid,
        next: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let booking = self.load_current(caller, id).await?;
        booking.status.transition(next)?;

        let result = self.repo.update_status(id, booking.status, next, now).await;
        self.cache.invalidate_booking(id).await;
        let updated = result?;

        info!(
            booking_id = %id,
            from = booking.status.as_str(),
            to = next.as_str(),
            "Booking status changed"
        );

        Ok(updated)
    }

    /// Payment received: `pending → confirmed`
    pub async fn confirm(&self, caller: &Caller, id: Uuid, now: DateTime<Utc>) -> Result<Booking> {
        self.transition(caller, id, BookingStatus::Confirmed, now).await
    }

    /// Service delivered: `confirmed → completed`
    pub async fn complete(&self, caller: &Caller, id: Uuid, now: DateTime<Utc>) -> Result<Booking> {
        self.transition(caller, id, BookingStatus::Completed, now).await
    }

    /// Refund the caller would get by cancelling at `now`
    pub async fn refund_quote(
        &self,
        caller: &Caller,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(Booking, RefundQuote)> {
        let booking = self.load_current(caller, id).await?;
        booking.status.transition(BookingStatus::Cancelled)?;

        let quote = quote_refund(
            &self.policies.refund_table,
            booking.pricing.total_price,
            booking.start_at,
            now,
        );
        Ok((booking, quote))
    }

    /// Cancel and compute the refund from the lead time at `now`
    pub async fn cancel(
        &self,
        caller: &Caller,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(Booking, RefundQuote)> {
        let booking = self.transition(caller, id, BookingStatus::Cancelled, now).await?;

        let quote = quote_refund(
            &self.policies.refund_table,
            booking.pricing.total_price,
            booking.start_at,
            now,
        );

        info!(
            booking_id = %id,
            refund_percent = %quote.refund_percent,
            refund_amount = %quote.refund_amount,
            "Booking cancelled"
        );

        Ok((booking, quote))
    }
}
