//! Request DTOs for pricing and booking endpoints.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::services::QuoteLine;

/// Highest accepted rate; the `unit_rate` column is `NUMERIC(12, 2)`
pub const MAX_UNIT_RATE: Decimal = dec!(9999999999.99);

fn rate_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Positive, whole cents, and storable
fn validate_unit_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate <= Decimal::ZERO {
        return Err(rate_error("unit_rate_positive", "must be positive"));
    }
    if rate.normalize().scale() > 2 {
        return Err(rate_error(
            "unit_rate_precision",
            "must have at most two decimal places",
        ));
    }
    if *rate > MAX_UNIT_RATE {
        return Err(rate_error("unit_rate_range", "exceeds the maximum rate"));
    }
    Ok(())
}

/// A single line-item to quote or book
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuoteRequest {
    /// Catalog reference of the car, room, flight or ticket
    #[validate(length(min = 1, max = 64))]
    pub listing_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    #[validate(custom(function = "validate_unit_rate"))]
    pub unit_rate: Decimal,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub extras_count: u32,
    #[validate(range(min = 1, max = 500))]
    pub traveler_count: u32,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl QuoteRequest {
    pub fn to_line(&self) -> QuoteLine {
        QuoteLine {
            start_at: self.start_at,
            end_at: self.end_at,
            unit_rate: self.unit_rate,
            extras_count: self.extras_count,
            traveler_count: self.traveler_count,
        }
    }
}

/// Several independent line-items submitted together
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkQuoteRequest {
    #[validate(nested)]
    pub items: Vec<QuoteRequest>,
}

impl BulkQuoteRequest {
    pub fn to_lines(&self) -> Vec<QuoteLine> {
        self.items.iter().map(QuoteRequest::to_line).collect()
    }
}

/// Optional point in time for refund previews
#[derive(Debug, Default, Deserialize)]
pub struct RefundQuoteQuery {
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}
