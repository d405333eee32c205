//! Response DTOs for booking endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::pricing::responses::{BatchTotalsResponse, PricingBreakdownResponse, RefundResponse};
use crate::pricing::{RefundQuote, ServiceType, Tier};

use super::models::{Booking, BookingStatus};
use super::services::BulkBooking;

/// Booking as returned to its owner
#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub owner_tier: Tier,
    pub service_type: ServiceType,
    pub listing_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_rate: Decimal,
    pub extras_count: u32,
    pub traveler_count: u32,
    pub status: BookingStatus,
    pub pricing: PricingBreakdownResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Booking> for BookingView {
    fn from(b: &Booking) -> Self {
        Self {
            id: b.id,
            owner_tier: b.owner_tier,
            service_type: b.service_type,
            listing_id: b.listing_id.clone(),
            start_at: b.start_at,
            end_at: b.end_at,
            unit_rate: b.unit_rate,
            extras_count: b.extras_count,
            traveler_count: b.traveler_count,
            status: b.status,
            pricing: PricingBreakdownResponse::from(&b.pricing),
            batch_id: b.batch_id,
            notes: b.notes.clone(),
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: BookingView,
}

impl From<&Booking> for BookingResponse {
    fn from(b: &Booking) -> Self {
        Self {
            booking: BookingView::from(b),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub count: usize,
    pub bookings: Vec<BookingView>,
}

impl From<&[Booking]> for BookingListResponse {
    fn from(bookings: &[Booking]) -> Self {
        Self {
            count: bookings.len(),
            bookings: bookings.iter().map(BookingView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BulkBookingResponse {
    pub batch_id: Uuid,
    pub bookings: Vec<BookingView>,
    pub totals: BatchTotalsResponse,
}

impl From<&BulkBooking> for BulkBookingResponse {
    fn from(bulk: &BulkBooking) -> Self {
        Self {
            batch_id: bulk.batch_id,
            bookings: bulk.bookings.iter().map(BookingView::from).collect(),
            totals: BatchTotalsResponse::from(&bulk.totals),
        }
    }
}

/// Refund preview or cancellation result
#[derive(Debug, Serialize)]
pub struct RefundBookingResponse {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub refund: RefundResponse,
}

impl RefundBookingResponse {
    pub fn new(booking: &Booking, quote: &RefundQuote) -> Self {
        Self {
            booking_id: booking.id,
            status: booking.status,
            total_price: booking.pricing.total_price,
            refund: RefundResponse::from(quote),
        }
    }
}
