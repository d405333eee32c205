//! Per-tier limits gate.
//!
//! Requests over a cap are rejected outright; nothing is clamped or
//! truncated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::services::PricingError;

/// Caps for one tier of one service vertical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum drivers (car) or travelers (everything else)
    pub max_count: u32,
    /// Noun used for `max_count` in error messages
    #[serde(default = "default_count_label")]
    pub count_label: String,
    /// Maximum pre-discount subtotal; `None` means unlimited
    #[serde(default)]
    pub max_subtotal: Option<Decimal>,
    /// Maximum rate per unit (night, day, seat); `None` means unlimited
    #[serde(default)]
    pub max_unit_rate: Option<Decimal>,
    /// Maximum line-items in a bulk request
    pub max_batch: usize,
}

fn default_count_label() -> String {
    "travelers".to_string()
}

impl TierLimits {
    /// Check a single line-item against the caps
    pub fn check(
        &self,
        count: u32,
        unit_rate: Decimal,
        subtotal: Decimal,
    ) -> Result<(), PricingError> {
        if count == 0 {
            return Err(PricingError::InvalidAmount {
                field: "traveler_count",
                reason: format!("at least one of {} is required", self.count_label),
            });
        }

        if count > self.max_count {
            return Err(PricingError::LimitExceeded {
                limit: self.count_label.clone(),
                value: count.to_string(),
                max: self.max_count.to_string(),
            });
        }

        if let Some(max_rate) = self.max_unit_rate {
            if unit_rate > max_rate {
                return Err(PricingError::LimitExceeded {
                    limit: "unit rate".to_string(),
                    value: unit_rate.to_string(),
                    max: max_rate.to_string(),
                });
            }
        }

        if let Some(max_subtotal) = self.max_subtotal {
            if subtotal > max_subtotal {
                return Err(PricingError::LimitExceeded {
                    limit: "booking value".to_string(),
                    value: subtotal.to_string(),
                    max: max_subtotal.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Reject empty batches and batches larger than the cap
    pub fn check_batch(&self, size: usize) -> Result<(), PricingError> {
        if size == 0 {
            return Err(PricingError::EmptyBatch);
        }
        if size > self.max_batch {
            return Err(PricingError::BatchTooLarge {
                size,
                max: self.max_batch,
            });
        }
        Ok(())
    }
}
