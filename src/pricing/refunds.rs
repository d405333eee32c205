//! Cancellation refund policy.
//!
//! The refund percent is a step function of the lead time between the
//! cancellation request and the service start. Each tier grants its percent
//! when the lead time is strictly greater than its hour threshold.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calculators::round_money;
use super::services::PricingError;

const SECONDS_PER_HOUR: i64 = 60 * 60;

/// Lead time strictly above `min_hours` earns `percent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundTier {
    pub min_hours: i64,
    pub percent: Decimal,
}

/// Ordered refund tiers, highest threshold first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RefundTier>", into = "Vec<RefundTier>")]
pub struct RefundTable {
    tiers: Vec<RefundTier>,
}

impl RefundTable {
    /// Build a table, rejecting percents outside `[0, 100]`, duplicate
    /// thresholds, and tables where a longer lead time refunds less.
    pub fn new(mut tiers: Vec<RefundTier>) -> Result<Self, PricingError> {
        tiers.sort_by(|a, b| b.min_hours.cmp(&a.min_hours));

        for tier in &tiers {
            if tier.percent < Decimal::ZERO || tier.percent > Decimal::ONE_HUNDRED {
                return Err(PricingError::InvalidRefundTable(format!(
                    "percent {} for >{}h is outside 0..=100",
                    tier.percent, tier.min_hours
                )));
            }
        }

        for pair in tiers.windows(2) {
            if pair[0].min_hours == pair[1].min_hours {
                return Err(PricingError::InvalidRefundTable(format!(
                    "duplicate threshold {}h",
                    pair[0].min_hours
                )));
            }
            if pair[0].percent < pair[1].percent {
                return Err(PricingError::InvalidRefundTable(format!(
                    ">{}h refunds {}% but >{}h refunds {}%",
                    pair[0].min_hours, pair[0].percent, pair[1].min_hours, pair[1].percent
                )));
            }
        }

        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    /// Refund percent for a lead time expressed in seconds
    pub fn percent_for_seconds(&self, lead_seconds: i64) -> Decimal {
        self.tiers
            .iter()
            .find(|tier| lead_seconds > tier.min_hours * SECONDS_PER_HOUR)
            .map(|tier| tier.percent)
            .unwrap_or(Decimal::ZERO)
    }

    /// Refund percent for a whole number of hours
    pub fn percent_for_hours(&self, hours: i64) -> Decimal {
        self.percent_for_seconds(hours * SECONDS_PER_HOUR)
    }
}

impl Default for RefundTable {
    /// >48h 100%, >24h 75%, >6h 50%, otherwise nothing
    fn default() -> Self {
        Self {
            tiers: vec![
                RefundTier {
                    min_hours: 48,
                    percent: dec!(100),
                },
                RefundTier {
                    min_hours: 24,
                    percent: dec!(75),
                },
                RefundTier {
                    min_hours: 6,
                    percent: dec!(50),
                },
            ],
        }
    }
}

impl TryFrom<Vec<RefundTier>> for RefundTable {
    type Error = PricingError;

    fn try_from(tiers: Vec<RefundTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<RefundTable> for Vec<RefundTier> {
    fn from(table: RefundTable) -> Self {
        table.tiers
    }
}

/// Refund owed for cancelling at `now`
#[derive(Debug, Clone, PartialEq)]
pub struct RefundQuote {
    pub refund_percent: Decimal,
    pub refund_amount: Decimal,
    pub lead_time_hours: Decimal,
}

/// Quote the refund on `total_price` for a service starting at `service_start`
pub fn quote_refund(
    table: &RefundTable,
    total_price: Decimal,
    service_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> RefundQuote {
    let lead_seconds = (service_start - now).num_seconds();
    let refund_percent = table.percent_for_seconds(lead_seconds);
    let refund_amount = round_money(total_price * refund_percent / Decimal::ONE_HUNDRED, 2);

    RefundQuote {
        refund_percent,
        refund_amount,
        lead_time_hours: round_money(
            Decimal::from(lead_seconds) / Decimal::from(SECONDS_PER_HOUR),
            2,
        ),
    }
}
