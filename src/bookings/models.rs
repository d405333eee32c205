//! Booking model and status lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pricing::{PricingBreakdown, ServiceType, Tier};

/// Booking status.
///
/// `pending → confirmed → completed`, and `pending|confirmed → cancelled`.
/// `cancelled` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    /// Validate a move to `next`
    pub fn transition(self, next: BookingStatus) -> Result<BookingStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Cannot move a {from} booking to {to}")]
pub struct TransitionError {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// A priced booking owned by one caller
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub owner_id: String,
    pub owner_tier: Tier,
    pub service_type: ServiceType,
    pub listing_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub unit_rate: Decimal,
    pub extras_count: u32,
    pub traveler_count: u32,
    pub status: BookingStatus,
    pub pricing: PricingBreakdown,
    pub batch_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create a pending booking
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub owner_id: String,
    pub owner_tier: Tier,
    pub service_type: ServiceType,
    pub listing_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub unit_rate: Decimal,
    pub extras_count: u32,
    pub traveler_count: u32,
    pub notes: Option<String>,
    pub batch_id: Option<Uuid>,
}

impl Booking {
    pub fn pending(new: NewBooking, pricing: PricingBreakdown, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            owner_tier: new.owner_tier,
            service_type: new.service_type,
            listing_id: new.listing_id,
            start_at: new.start_at,
            end_at: new.end_at,
            unit_rate: new.unit_rate,
            extras_count: new.extras_count,
            traveler_count: new.traveler_count,
            status: BookingStatus::Pending,
            pricing,
            batch_id: new.batch_id,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: &str) -> bool {
        self.owner_id == owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use BookingStatus::*;
        assert_eq!(Pending.transition(Confirmed), Ok(Confirmed));
        assert_eq!(Pending.transition(Cancelled), Ok(Cancelled));
        assert_eq!(Confirmed.transition(Cancelled), Ok(Cancelled));
        assert_eq!(Confirmed.transition(Completed), Ok(Completed));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        use BookingStatus::*;
        for from in [Cancelled, Completed] {
            assert!(from.is_terminal());
            for to in [Pending, Confirmed, Cancelled, Completed] {
                assert!(from.transition(to).is_err(), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_pending_cannot_complete() {
        let err = BookingStatus::Pending
            .transition(BookingStatus::Completed)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot move a pending booking to completed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("refunded"), None);
    }
}
