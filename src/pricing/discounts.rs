//! Discount stacking.
//!
//! A single parameterized rule evaluator replaces the per-vertical copies:
//! the tier base percent plus every triggered bonus are summed, then clamped
//! to `[0, cap]` and applied once to the pre-discount subtotal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculators::{round_money, too_large};
use super::services::PricingError;

/// Condition under which a bonus percent is granted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum DiscountCondition {
    /// Traveler/driver/booking count at or above `count`
    MinCount { count: u32 },
    /// Subtotal strictly above `amount`
    SubtotalAbove { amount: Decimal },
    /// Stay or rental length at or above `units`
    MinUnits { units: u32 },
}

impl DiscountCondition {
    pub fn is_met(&self, ctx: &DiscountContext) -> bool {
        match self {
            DiscountCondition::MinCount { count } => ctx.count >= *count,
            DiscountCondition::SubtotalAbove { amount } => ctx.subtotal > *amount,
            DiscountCondition::MinUnits { units } => ctx.units >= *units,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DiscountCondition::MinCount { count } => format!("count>={}", count),
            DiscountCondition::SubtotalAbove { amount } => format!("subtotal>{}", amount),
            DiscountCondition::MinUnits { units } => format!("units>={}", units),
        }
    }
}

/// A `(condition, bonus_percent)` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub condition: DiscountCondition,
    pub bonus_percent: Decimal,
}

impl DiscountRule {
    pub fn new(condition: DiscountCondition, bonus_percent: Decimal) -> Self {
        Self {
            condition,
            bonus_percent,
        }
    }
}

/// Facts about a booking that discount conditions inspect
#[derive(Debug, Clone, Copy)]
pub struct DiscountContext {
    pub subtotal: Decimal,
    pub count: u32,
    pub units: u32,
}

/// Result of stacking discount rules
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome {
    pub percent: Decimal,
    pub applied: Vec<String>,
}

/// Sum the tier base and every triggered bonus, then clamp to `[0, cap]`.
///
/// `cap` itself is clamped to 100 so a misconfigured policy can never
/// produce a negative price.
pub fn stack_discount(
    base_percent: Decimal,
    rules: &[DiscountRule],
    cap: Decimal,
    ctx: &DiscountContext,
) -> DiscountOutcome {
    let mut percent = base_percent;
    let mut applied = Vec::new();

    for rule in rules {
        if rule.condition.is_met(ctx) {
            percent += rule.bonus_percent;
            applied.push(rule.condition.label());
        }
    }

    let cap = cap.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

    DiscountOutcome {
        percent: percent.clamp(Decimal::ZERO, cap),
        applied,
    }
}

/// Amount taken off `subtotal` at `percent`, rounded to cents.
///
/// Rounding means `subtotal - discount_amount` can differ from the exact
/// `subtotal * (1 - percent/100)` by up to half a cent.
pub fn discount_amount(subtotal: Decimal, percent: Decimal) -> Result<Decimal, PricingError> {
    subtotal
        .checked_mul(percent)
        .and_then(|amount| amount.checked_div(Decimal::ONE_HUNDRED))
        .map(|amount| round_money(amount, 2))
        .ok_or_else(|| too_large("discount_amount"))
}

/// `subtotal * (1 - percent/100)`, with the discount rounded to cents
pub fn apply_discount(subtotal: Decimal, percent: Decimal) -> Result<Decimal, PricingError> {
    let discount = discount_amount(subtotal, percent)?;
    subtotal
        .checked_sub(discount)
        .ok_or_else(|| too_large("subtotal"))
}
