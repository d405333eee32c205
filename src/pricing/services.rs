//! Quote engine.
//!
//! Runs the limits gate, derives the unit count from the booking dates and
//! prices each line under the caller's tier policy. Everything here is a pure
//! function of its inputs so quotes can be computed concurrently.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::calculators::{
    line_subtotal, price_with_policy, sum_money, unit_count_between, PricingBreakdown,
};
use super::policy::TierPolicy;

/// Pricing calculation error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    #[error("End date must be after start date")]
    InvalidDateRange,

    #[error("Invalid {field}: {reason}")]
    InvalidAmount { field: &'static str, reason: String },

    #[error("{limit} {value} exceeds the maximum of {max}")]
    LimitExceeded {
        limit: String,
        value: String,
        max: String,
    },

    #[error("Batch of {size} items exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Batch must contain at least one item")]
    EmptyBatch,

    #[error("Item {index}: {source}")]
    BatchItem {
        index: usize,
        source: Box<PricingError>,
    },

    #[error("Invalid refund table: {0}")]
    InvalidRefundTable(String),

    #[error("Invalid pricing policy: {0}")]
    InvalidPolicy(String),
}

impl PricingError {
    /// Whether the request broke a tier cap rather than being malformed
    pub fn is_limit(&self) -> bool {
        match self {
            PricingError::LimitExceeded { .. } | PricingError::BatchTooLarge { .. } => true,
            PricingError::BatchItem { source, .. } => source.is_limit(),
            _ => false,
        }
    }
}

/// One line-item to price
#[derive(Debug, Clone)]
pub struct QuoteLine {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub unit_rate: Decimal,
    pub extras_count: u32,
    pub traveler_count: u32,
}

/// Summed figures of a bulk quote
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTotals {
    pub item_count: usize,
    pub base_price: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
}

/// Result of a bulk quote
#[derive(Debug, Clone)]
pub struct BatchQuote {
    pub items: Vec<PricingBreakdown>,
    pub totals: BatchTotals,
}

/// Price a single line under `policy`.
///
/// Limits are checked against the pre-discount subtotal before any
/// discount is computed.
pub fn quote_item(policy: &TierPolicy<'_>, line: &QuoteLine) -> Result<PricingBreakdown, PricingError> {
    let unit_count = unit_count_between(line.start_at, line.end_at)?;
    let subtotal = line_subtotal(line.unit_rate, unit_count)?;

    policy
        .terms
        .limits
        .check(line.traveler_count, line.unit_rate, subtotal)?;

    price_with_policy(
        policy,
        line.unit_rate,
        unit_count,
        line.extras_count,
        line.traveler_count,
    )
}

/// Price every line independently and sum the results.
///
/// The batch cap is checked first, and any failing line rejects the whole
/// batch.
pub fn quote_batch(policy: &TierPolicy<'_>, lines: &[QuoteLine]) -> Result<BatchQuote, PricingError> {
    policy.terms.limits.check_batch(lines.len())?;

    let items = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            quote_item(policy, line).map_err(|e| PricingError::BatchItem {
                index,
                source: Box::new(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let totals = BatchTotals {
        item_count: items.len(),
        base_price: sum_money(items.iter().map(|b| b.base_price), "base_price")?,
        discount_amount: sum_money(items.iter().map(|b| b.discount_amount), "discount_amount")?,
        total_price: sum_money(items.iter().map(|b| b.total_price), "total_price")?,
    };

    Ok(BatchQuote { items, totals })
}
