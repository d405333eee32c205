//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::discounts::{discount_amount, stack_discount, DiscountContext, DiscountOutcome};
use super::policy::TierPolicy;
use super::services::PricingError;

/// Round to specified decimal places, halves away from zero.
///
/// For non-negative amounts this matches the `Math.round` behavior that the
/// booking front ends display, while staying in fixed-point arithmetic.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use travel_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(17.4), 0), dec!(17));
/// assert_eq!(round_money(dec!(1.235), 2), dec!(1.24));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest amount any stored money column holds (`NUMERIC(14, 2)`)
pub const MAX_MONEY: Decimal = dec!(999999999999.99);

pub(crate) fn too_large(field: &'static str) -> PricingError {
    PricingError::InvalidAmount {
        field,
        reason: "amount is too large".to_string(),
    }
}

/// `unit_rate * unit_count`, rejected when it would not fit [`MAX_MONEY`]
pub fn line_subtotal(unit_rate: Decimal, unit_count: u32) -> Result<Decimal, PricingError> {
    unit_rate
        .checked_mul(Decimal::from(unit_count))
        .filter(|subtotal| *subtotal <= MAX_MONEY)
        .ok_or_else(|| too_large("base_price"))
}

/// Overflow-checked sum of money amounts
pub(crate) fn sum_money(
    mut amounts: impl Iterator<Item = Decimal>,
    field: &'static str,
) -> Result<Decimal, PricingError> {
    amounts
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| too_large(field))
}

/// Number of started 24-hour periods between `start` and `end`.
///
/// A 26 hour rental is billed as two days. `end <= start` is rejected.
pub fn unit_count_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u32, PricingError> {
    if end <= start {
        return Err(PricingError::InvalidDateRange);
    }

    let seconds = (end - start).num_seconds();
    let day = 24 * 60 * 60;
    let units = (seconds + day - 1) / day;

    u32::try_from(units.max(1)).map_err(|_| PricingError::InvalidAmount {
        field: "dates",
        reason: "date range too long".to_string(),
    })
}

/// Input for a single priced line
#[derive(Debug, Clone)]
pub struct PricingInput {
    pub unit_rate: Decimal,
    pub unit_count: u32,
    pub extras_count: u32,
    pub per_extra_rate: Decimal,
    pub fixed_fee: Decimal,
    pub tax_rate: Decimal,
}

/// Computed price projection of a booking
#[derive(Debug, Clone, PartialEq)]
pub struct PricingBreakdown {
    pub unit_count: u32,
    pub base_price: Decimal,
    pub taxes: Decimal,
    pub fees: Decimal,
    pub extras_price: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub total_price: Decimal,
    pub applied_discounts: Vec<String>,
}

fn check_input(input: &PricingInput) -> Result<(), PricingError> {
    if input.unit_rate <= Decimal::ZERO {
        return Err(PricingError::InvalidAmount {
            field: "unit_rate",
            reason: "must be positive".to_string(),
        });
    }
    if input.per_extra_rate < Decimal::ZERO || input.fixed_fee < Decimal::ZERO {
        return Err(PricingError::InvalidAmount {
            field: "fees",
            reason: "must not be negative".to_string(),
        });
    }
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE {
        return Err(PricingError::InvalidAmount {
            field: "tax_rate",
            reason: "must be between 0 and 1".to_string(),
        });
    }
    if input.unit_count == 0 {
        return Err(PricingError::InvalidAmount {
            field: "unit_count",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Compute base, taxes, fees, extras and total with a discount percent.
///
/// Taxes, fees and extras are computed on the pre-discount base; the
/// discount only reduces the base price. The discount amount is rounded to
/// cents, so `total` matches `base * (1 - d/100) + taxes + fees + extras`
/// to within half a cent.
pub fn calculate_breakdown(
    input: &PricingInput,
    discount: DiscountOutcome,
) -> Result<PricingBreakdown, PricingError> {
    check_input(input)?;

    let base_price = line_subtotal(input.unit_rate, input.unit_count)?;
    let taxes = base_price
        .checked_mul(input.tax_rate)
        .map(|taxes| round_money(taxes, 0))
        .ok_or_else(|| too_large("taxes"))?;
    let fees = input.fixed_fee;
    let extras_price = input
        .per_extra_rate
        .checked_mul(Decimal::from(input.extras_count))
        .ok_or_else(|| too_large("extras_price"))?;
    let discount_amount = discount_amount(base_price, discount.percent)?;

    let total_price = base_price
        .checked_sub(discount_amount)
        .and_then(|total| total.checked_add(taxes))
        .and_then(|total| total.checked_add(fees))
        .and_then(|total| total.checked_add(extras_price))
        .filter(|total| *total <= MAX_MONEY)
        .ok_or_else(|| too_large("total_price"))?;

    Ok(PricingBreakdown {
        unit_count: input.unit_count,
        base_price,
        taxes,
        fees,
        extras_price,
        discount_percent: discount.percent,
        discount_amount,
        total_price,
        applied_discounts: discount.applied,
    })
}

/// Price one line under a tier policy: discount rules see the base price
/// as the subtotal.
pub fn price_with_policy(
    policy: &TierPolicy<'_>,
    unit_rate: Decimal,
    unit_count: u32,
    extras_count: u32,
    traveler_count: u32,
) -> Result<PricingBreakdown, PricingError> {
    let input = PricingInput {
        unit_rate,
        unit_count,
        extras_count,
        per_extra_rate: policy.rates.per_extra_rate,
        fixed_fee: policy.rates.fixed_fee,
        tax_rate: policy.rates.tax_rate,
    };

    let ctx = DiscountContext {
        subtotal: line_subtotal(unit_rate, unit_count)?,
        count: traveler_count,
        units: unit_count,
    };
    let discount = stack_discount(
        policy.terms.base_discount,
        &policy.terms.discount_rules,
        policy.terms.discount_cap,
        &ctx,
    );

    calculate_breakdown(&input, discount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn no_discount() -> DiscountOutcome {
        DiscountOutcome {
            percent: Decimal::ZERO,
            applied: vec![],
        }
    }

    fn car_input(rate: Decimal, days: u32) -> PricingInput {
        PricingInput {
            unit_rate: rate,
            unit_count: days,
            extras_count: 0,
            per_extra_rate: dec!(15),
            fixed_fee: dec!(25),
            tax_rate: dec!(0.12),
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_halves_away_from_zero() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(3));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-3));
        assert_eq!(round_money(dec!(1.005), 2), dec!(1.01));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(17.49), 0), dec!(17));
    }

    // ==================== unit_count_between tests ====================

    #[test]
    fn test_unit_count_whole_days() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let end = start + Duration::days(3);
        assert_eq!(unit_count_between(start, end).unwrap(), 3);
    }

    #[test]
    fn test_unit_count_partial_day_rounds_up() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let end = start + Duration::hours(26);
        assert_eq!(unit_count_between(start, end).unwrap(), 2);

        let end = start + Duration::minutes(30);
        assert_eq!(unit_count_between(start, end).unwrap(), 1);
    }

    #[test]
    fn test_unit_count_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        assert!(matches!(
            unit_count_between(start, start),
            Err(PricingError::InvalidDateRange)
        ));
        assert!(matches!(
            unit_count_between(start, start - Duration::days(1)),
            Err(PricingError::InvalidDateRange)
        ));
    }

    // ==================== calculate_breakdown tests ====================

    #[test]
    fn test_individual_car_rental_example() {
        let breakdown = calculate_breakdown(&car_input(dec!(50), 3), no_discount()).unwrap();

        assert_eq!(breakdown.base_price, dec!(150));
        assert_eq!(breakdown.taxes, dec!(18));
        assert_eq!(breakdown.fees, dec!(25));
        assert_eq!(breakdown.extras_price, dec!(0));
        assert_eq!(breakdown.total_price, dec!(193));
    }

    #[test]
    fn test_taxes_rounded_to_whole_units() {
        // 7 * 33 = 231; 231 * 0.12 = 27.72
        let breakdown = calculate_breakdown(&car_input(dec!(33), 7), no_discount()).unwrap();
        assert_eq!(breakdown.taxes, dec!(28));
    }

    #[test]
    fn test_discount_applies_to_base_only() {
        let mut input = car_input(dec!(100), 10);
        input.extras_count = 2;
        let discount = DiscountOutcome {
            percent: dec!(20),
            applied: vec!["units>=7".to_string()],
        };

        let breakdown = calculate_breakdown(&input, discount).unwrap();

        // base 1000, taxes 120 on pre-discount base, fee 25, extras 30
        assert_eq!(breakdown.discount_amount, dec!(200));
        assert_eq!(breakdown.taxes, dec!(120));
        assert_eq!(breakdown.extras_price, dec!(30));
        assert_eq!(breakdown.total_price, dec!(975));
        assert_eq!(
            breakdown.total_price,
            breakdown.base_price * (Decimal::ONE - breakdown.discount_percent / dec!(100))
                + breakdown.taxes
                + breakdown.fees
                + breakdown.extras_price
        );
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let result = calculate_breakdown(&car_input(dec!(0), 3), no_discount());
        assert!(matches!(
            result,
            Err(PricingError::InvalidAmount { field: "unit_rate", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_tax_rate() {
        let mut input = car_input(dec!(50), 3);
        input.tax_rate = dec!(1.5);
        assert!(calculate_breakdown(&input, no_discount()).is_err());
    }

    #[test]
    fn test_overflowing_rate_is_rejected() {
        let rate = dec!(70000000000000000000000000000);
        assert!(matches!(
            line_subtotal(rate, 3),
            Err(PricingError::InvalidAmount { field: "base_price", .. })
        ));
        assert!(calculate_breakdown(&car_input(rate, 3), no_discount()).is_err());
        assert!(calculate_breakdown(&car_input(Decimal::MAX, 1), no_discount()).is_err());
    }

    #[test]
    fn test_subtotal_must_fit_money_columns() {
        assert_eq!(line_subtotal(dec!(999999999.99), 1000).unwrap(), dec!(999999999990));
        assert!(line_subtotal(dec!(9999999999.99), 1000).is_err());
    }

    #[test]
    fn test_sum_money_reports_overflow() {
        let amounts = vec![Decimal::MAX, dec!(1)];
        assert!(sum_money(amounts.into_iter(), "total_price").is_err());
        assert_eq!(
            sum_money(vec![dec!(1.5), dec!(2.25)].into_iter(), "total_price").unwrap(),
            dec!(3.75)
        );
    }
}
