//! Response DTOs for pricing endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::PricingBreakdown;
use super::policy::{ServiceType, Tier};
use super::refunds::RefundQuote;
use super::services::{BatchQuote, BatchTotals};

/// Price breakdown for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct PricingBreakdownResponse {
    pub unit_count: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taxes: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fees: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub extras_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_percent: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub applied_discounts: Vec<String>,
}

impl From<&PricingBreakdown> for PricingBreakdownResponse {
    fn from(b: &PricingBreakdown) -> Self {
        Self {
            unit_count: b.unit_count,
            base_price: b.base_price,
            taxes: b.taxes,
            fees: b.fees,
            extras_price: b.extras_price,
            discount_percent: b.discount_percent,
            discount_amount: b.discount_amount,
            total_price: b.total_price,
            applied_discounts: b.applied_discounts.clone(),
        }
    }
}

/// Response for a single quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub service: ServiceType,
    pub tier: Tier,
    pub pricing: PricingBreakdownResponse,
}

/// Summed figures of a bulk request
#[derive(Debug, Serialize)]
pub struct BatchTotalsResponse {
    pub item_count: usize,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
}

impl From<&BatchTotals> for BatchTotalsResponse {
    fn from(t: &BatchTotals) -> Self {
        Self {
            item_count: t.item_count,
            base_price: t.base_price,
            discount_amount: t.discount_amount,
            total_price: t.total_price,
        }
    }
}

/// Response for a bulk quote
#[derive(Debug, Serialize)]
pub struct BatchQuoteResponse {
    pub service: ServiceType,
    pub tier: Tier,
    pub items: Vec<PricingBreakdownResponse>,
    pub totals: BatchTotalsResponse,
}

impl BatchQuoteResponse {
    pub fn new(service: ServiceType, tier: Tier, quote: &BatchQuote) -> Self {
        Self {
            service,
            tier,
            items: quote.items.iter().map(PricingBreakdownResponse::from).collect(),
            totals: BatchTotalsResponse::from(&quote.totals),
        }
    }
}

/// Refund owed on cancellation
#[derive(Debug, Clone, Serialize)]
pub struct RefundResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_percent: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub lead_time_hours: Decimal,
}

impl From<&RefundQuote> for RefundResponse {
    fn from(q: &RefundQuote) -> Self {
        Self {
            refund_percent: q.refund_percent,
            refund_amount: q.refund_amount,
            lead_time_hours: q.lead_time_hours,
        }
    }
}
