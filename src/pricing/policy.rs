//! Tier policies.
//!
//! Every vertical carries its service rates plus one set of terms per caller
//! tier. Handlers select a [`TierPolicy`] by `(tier, service)` instead of
//! inlining their own thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::discounts::{DiscountCondition, DiscountRule};
use super::limits::TierLimits;
use super::refunds::RefundTable;
use super::services::PricingError;

/// Caller classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Individual,
    Corporate,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Individual => "individual",
            Tier::Corporate => "corporate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(Tier::Individual),
            "corporate" => Some(Tier::Corporate),
            _ => None,
        }
    }
}

/// Bookable vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Flight,
    Hotel,
    Car,
    Package,
    Attraction,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Flight => "flight",
            ServiceType::Hotel => "hotel",
            ServiceType::Car => "car",
            ServiceType::Package => "package",
            ServiceType::Attraction => "attraction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flight" => Some(ServiceType::Flight),
            "hotel" => Some(ServiceType::Hotel),
            "car" => Some(ServiceType::Car),
            "package" => Some(ServiceType::Package),
            "attraction" => Some(ServiceType::Attraction),
            _ => None,
        }
    }
}

/// Tax and fee schedule for a vertical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRates {
    pub tax_rate: Decimal,
    pub fixed_fee: Decimal,
    pub per_extra_rate: Decimal,
}

/// Discount and limit terms granted to one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierTerms {
    #[serde(default)]
    pub base_discount: Decimal,
    pub discount_cap: Decimal,
    #[serde(default)]
    pub discount_rules: Vec<DiscountRule>,
    pub limits: TierLimits,
}

/// Rates and per-tier terms of one vertical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePolicy {
    pub rates: ServiceRates,
    pub individual: TierTerms,
    pub corporate: TierTerms,
}

/// Everything a handler needs to price a request for one caller
#[derive(Debug, Clone, Copy)]
pub struct TierPolicy<'a> {
    pub tier: Tier,
    pub service: ServiceType,
    pub rates: &'a ServiceRates,
    pub terms: &'a TierTerms,
    pub refund_table: &'a RefundTable,
}

/// Complete policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyBook {
    pub car: ServicePolicy,
    pub hotel: ServicePolicy,
    pub flight: ServicePolicy,
    pub package: ServicePolicy,
    pub attraction: ServicePolicy,
    pub refund_table: RefundTable,
}

impl PolicyBook {
    pub fn service(&self, service: ServiceType) -> &ServicePolicy {
        match service {
            ServiceType::Car => &self.car,
            ServiceType::Hotel => &self.hotel,
            ServiceType::Flight => &self.flight,
            ServiceType::Package => &self.package,
            ServiceType::Attraction => &self.attraction,
        }
    }

    pub fn policy(&self, tier: Tier, service: ServiceType) -> TierPolicy<'_> {
        let service_policy = self.service(service);
        let terms = match tier {
            Tier::Individual => &service_policy.individual,
            Tier::Corporate => &service_policy.corporate,
        };

        TierPolicy {
            tier,
            service,
            rates: &service_policy.rates,
            terms,
            refund_table: &self.refund_table,
        }
    }

    /// Reject configurations that could yield nonsensical prices
    pub fn validate(&self) -> Result<(), PricingError> {
        let services = [
            ServiceType::Car,
            ServiceType::Hotel,
            ServiceType::Flight,
            ServiceType::Package,
            ServiceType::Attraction,
        ];

        for service in services {
            let policy = self.service(service);
            let rates = &policy.rates;
            if rates.tax_rate < Decimal::ZERO || rates.tax_rate > Decimal::ONE {
                return Err(PricingError::InvalidPolicy(format!(
                    "{}: tax rate {} outside 0..=1",
                    service.as_str(),
                    rates.tax_rate
                )));
            }
            if rates.fixed_fee < Decimal::ZERO || rates.per_extra_rate < Decimal::ZERO {
                return Err(PricingError::InvalidPolicy(format!(
                    "{}: negative fee",
                    service.as_str()
                )));
            }

            for (tier, terms) in [
                (Tier::Individual, &policy.individual),
                (Tier::Corporate, &policy.corporate),
            ] {
                if terms.discount_cap < Decimal::ZERO || terms.discount_cap > Decimal::ONE_HUNDRED
                {
                    return Err(PricingError::InvalidPolicy(format!(
                        "{}/{}: discount cap {} outside 0..=100",
                        service.as_str(),
                        tier.as_str(),
                        terms.discount_cap
                    )));
                }
                if terms.limits.max_batch == 0 || terms.limits.max_count == 0 {
                    return Err(PricingError::InvalidPolicy(format!(
                        "{}/{}: limits must be positive",
                        service.as_str(),
                        tier.as_str()
                    )));
                }
            }
        }

        Ok(())
    }
}

fn individual_terms(limits: TierLimits) -> TierTerms {
    TierTerms {
        base_discount: Decimal::ZERO,
        discount_cap: dec!(50),
        discount_rules: vec![DiscountRule::new(
            DiscountCondition::MinUnits { units: 7 },
            dec!(10),
        )],
        limits,
    }
}

fn corporate_terms(limits: TierLimits) -> TierTerms {
    TierTerms {
        base_discount: dec!(20),
        discount_cap: dec!(50),
        discount_rules: vec![
            DiscountRule::new(DiscountCondition::MinCount { count: 10 }, dec!(5)),
            DiscountRule::new(
                DiscountCondition::SubtotalAbove {
                    amount: dec!(10000),
                },
                dec!(5),
            ),
            DiscountRule::new(DiscountCondition::MinUnits { units: 7 }, dec!(10)),
        ],
        limits,
    }
}

fn limits(
    max_count: u32,
    label: &str,
    max_subtotal: Option<Decimal>,
    max_unit_rate: Option<Decimal>,
    max_batch: usize,
) -> TierLimits {
    TierLimits {
        max_count,
        count_label: label.to_string(),
        max_subtotal,
        max_unit_rate,
        max_batch,
    }
}

fn travel_policy(tax_rate: Decimal, fixed_fee: Decimal, per_extra_rate: Decimal) -> ServicePolicy {
    ServicePolicy {
        rates: ServiceRates {
            tax_rate,
            fixed_fee,
            per_extra_rate,
        },
        individual: individual_terms(limits(6, "travelers", None, None, 5)),
        corporate: corporate_terms(limits(100, "travelers", None, None, 20)),
    }
}

impl Default for PolicyBook {
    fn default() -> Self {
        Self {
            car: ServicePolicy {
                rates: ServiceRates {
                    tax_rate: dec!(0.12),
                    fixed_fee: dec!(25),
                    per_extra_rate: dec!(15),
                },
                individual: individual_terms(limits(2, "drivers", Some(dec!(5000)), None, 5)),
                corporate: corporate_terms(limits(5, "drivers", None, None, 20)),
            },
            hotel: ServicePolicy {
                rates: ServiceRates {
                    tax_rate: dec!(0.10),
                    fixed_fee: dec!(15),
                    per_extra_rate: dec!(20),
                },
                individual: individual_terms(limits(6, "travelers", None, Some(dec!(1000)), 5)),
                corporate: corporate_terms(limits(100, "travelers", None, None, 50)),
            },
            flight: travel_policy(dec!(0.08), dec!(30), dec!(35)),
            package: travel_policy(dec!(0.10), dec!(50), dec!(25)),
            attraction: travel_policy(dec!(0.05), dec!(5), dec!(10)),
            refund_table: RefundTable::default(),
        }
    }
}
