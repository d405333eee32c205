//! Pricing engine module.
//!
//! Tiered pricing, discount stacking, cancellation refunds and the limits
//! gate, shared by every travel vertical.

pub mod calculators;
pub mod discounts;
pub mod limits;
pub mod policy;
pub mod refunds;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use calculators::{round_money, PricingBreakdown};
pub use policy::{PolicyBook, ServiceType, Tier, TierPolicy};
pub use refunds::{quote_refund, RefundQuote, RefundTable};
pub use services::{quote_batch, quote_item, BatchQuote, PricingError, QuoteLine};
