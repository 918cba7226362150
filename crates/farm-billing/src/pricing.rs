//! Pricing
//!
//! Published price lookup, annual savings and coupon display.

use farm_core::{LookupKey, PaymentCopy, PricePlan};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Percentage saved by paying yearly instead of monthly, rounded to a whole number
///
/// Missing or non-positive prices, no saving at all, or amounts too large to
/// annualize all yield 0.
pub fn annual_savings_percent(
    monthly_price: Option<Decimal>,
    annual_price_per_month: Option<Decimal>,
) -> u32 {
    let (Some(monthly), Some(annual)) = (monthly_price, annual_price_per_month) else {
        return 0;
    };
    if monthly <= Decimal::ZERO || annual <= Decimal::ZERO {
        return 0;
    }

    let twelve = Decimal::from(12);
    let (Some(monthly_yearly), Some(annual_cost)) =
        (monthly.checked_mul(twelve), annual.checked_mul(twelve))
    else {
        return 0;
    };
    if monthly_yearly <= annual_cost {
        return 0;
    }

    (monthly_yearly - annual_cost)
        .checked_div(monthly_yearly)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|pct| pct.to_u32())
        .unwrap_or(0)
}

/// Format an amount the way the active language writes numbers
///
/// Up to two decimals, trailing zeros dropped, grouped thousands.
pub fn format_amount(value: Decimal, lang: &str) -> String {
    let (group, decimal) = match lang.to_ascii_lowercase().as_str() {
        "en" => (",", "."),
        "de" | "nl" | "it" | "es" => (".", ","),
        _ => ("\u{202f}", ","),
    };

    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let abs = rounded.abs();
    let whole = abs.trunc();
    let cents = ((abs - whole) * Decimal::ONE_HUNDRED).to_u32().unwrap_or(0);

    let digits = whole.to_u128().map(|n| n.to_string()).unwrap_or_default();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(group);
        }
        grouped.push(ch);
    }

    if cents == 0 {
        format!("{sign}{grouped}")
    } else {
        let fraction = format!("{cents:02}");
        format!("{sign}{grouped}{decimal}{}", fraction.trim_end_matches('0'))
    }
}

/// Published prices, loaded once per payment screen
#[derive(Clone, Debug, Default)]
pub struct PriceCatalog {
    plans: Vec<PricePlan>,
}

impl PriceCatalog {
    pub const fn new(plans: Vec<PricePlan>) -> Self {
        Self { plans }
    }

    /// First price published under `key`
    pub fn find(&self, key: LookupKey) -> Option<&PricePlan> {
        self.plans.iter().find(|p| p.lookup_key == Some(key))
    }

    /// Unit price of `key` in major units
    pub fn unit_price(&self, key: LookupKey) -> Option<Decimal> {
        self.find(key).and_then(PricePlan::unit_price)
    }

    /// Price id to subscribe to for `key`
    pub fn price_id(&self, key: LookupKey) -> Option<&str> {
        self.find(key).map(|p| p.id.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

/// Coupon banner for the selected plan
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CouponDisplay {
    /// Coupon name (or id); empty without an applied coupon
    pub name: String,

    /// Formatted discounted amount; empty without a discount
    pub amount: String,

    /// Localized description with markup
    pub description: String,
}

impl CouponDisplay {
    /// Build the banner for `plan` from the localized template
    ///
    /// Without a discounted amount the name and amount stay empty; the
    /// template is rendered either way.
    pub fn for_plan(plan: &PricePlan, copy: &PaymentCopy) -> Self {
        let discounted = plan.discounted_price();

        let name = discounted
            .and(plan.applied_coupon.as_ref())
            .map(|c| c.display_name().to_string())
            .unwrap_or_default();
        let amount = discounted
            .map(|d| format_amount(d, &copy.lang))
            .unwrap_or_default();
        let description = copy
            .coupon_applied_desc
            .replacen("{COUPON}", &format!("<strong>{name}</strong>"), 1)
            .replacen(
                "{AMOUNT}",
                &format!("<strong>{amount}€HT/{}</strong>", copy.per_month),
                1,
            );

        Self {
            name,
            amount,
            description,
        }
    }

    pub fn is_applied(&self) -> bool {
        !self.amount.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::AppliedCoupon;
    use rust_decimal_macros::dec;

    fn plan(key: LookupKey, cents: i64) -> PricePlan {
        PricePlan {
            id: format!("price_{key}"),
            lookup_key: Some(key),
            unit_amount: Some(cents),
            discounted_amount: None,
            applied_coupon: None,
        }
    }

    #[test]
    fn test_savings_example() {
        assert_eq!(annual_savings_percent(Some(dec!(50)), Some(dec!(40))), 20);
    }

    #[test]
    fn test_savings_invalid_inputs() {
        assert_eq!(annual_savings_percent(None, Some(dec!(40))), 0);
        assert_eq!(annual_savings_percent(Some(dec!(50)), None), 0);
        assert_eq!(annual_savings_percent(Some(dec!(0)), Some(dec!(40))), 0);
        assert_eq!(annual_savings_percent(Some(dec!(50)), Some(dec!(-1))), 0);
        assert_eq!(annual_savings_percent(Some(dec!(-50)), Some(dec!(-60))), 0);
    }

    #[test]
    fn test_savings_never_negative() {
        assert_eq!(annual_savings_percent(Some(dec!(40)), Some(dec!(40))), 0);
        assert_eq!(annual_savings_percent(Some(dec!(40)), Some(dec!(50))), 0);
    }

    #[test]
    fn test_savings_rounding() {
        // (29.99 - 24.99) / 29.99 = 16.67%
        assert_eq!(annual_savings_percent(Some(dec!(29.99)), Some(dec!(24.99))), 17);
        // exactly 12.5% rounds up
        assert_eq!(annual_savings_percent(Some(dec!(40)), Some(dec!(35))), 13);
    }

    #[test]
    fn test_savings_overflow_yields_zero() {
        assert_eq!(annual_savings_percent(Some(Decimal::MAX), Some(dec!(1))), 0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(30), "fr"), "30");
        assert_eq!(format_amount(dec!(29.9), "fr"), "29,9");
        assert_eq!(format_amount(dec!(1234.56), "fr"), "1\u{202f}234,56");
        assert_eq!(format_amount(dec!(1234.05), "en"), "1,234.05");
        assert_eq!(format_amount(dec!(1000000), "en"), "1,000,000");
        assert_eq!(format_amount(dec!(0), "en"), "0");
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = PriceCatalog::new(vec![
            plan(LookupKey::PaidMonthly, 5000),
            plan(LookupKey::PaidYearly, 4000),
        ]);
        assert_eq!(catalog.unit_price(LookupKey::PaidMonthly), Some(dec!(50)));
        assert_eq!(catalog.price_id(LookupKey::PaidYearly), Some("price_paid_yearly"));
        assert_eq!(catalog.find(LookupKey::Other).map(|p| p.id.clone()), None);
        assert!(!catalog.is_empty());
        assert!(PriceCatalog::default().is_empty());
    }

    #[test]
    fn test_coupon_display() {
        let mut yearly = plan(LookupKey::PaidYearly, 4000);
        yearly.discounted_amount = Some(3050);
        yearly.applied_coupon = Some(AppliedCoupon {
            id: "SPRING".into(),
            name: Some("Printemps".into()),
        });

        let coupon = CouponDisplay::for_plan(&yearly, &PaymentCopy::default());
        assert_eq!(coupon.name, "Printemps");
        assert_eq!(coupon.amount, "30,5");
        assert_eq!(
            coupon.description,
            "Code promo <strong>Printemps</strong> appliqué : <strong>30,5€HT/mois</strong>"
        );
        assert!(coupon.is_applied());
    }

    #[test]
    fn test_zero_discount_still_displays() {
        let mut yearly = plan(LookupKey::PaidYearly, 4000);
        yearly.discounted_amount = Some(0);
        yearly.applied_coupon = Some(AppliedCoupon {
            id: "FREEYEAR".into(),
            name: None,
        });

        let coupon = CouponDisplay::for_plan(&yearly, &PaymentCopy::english());
        assert_eq!(coupon.name, "FREEYEAR");
        assert_eq!(coupon.amount, "0");
    }

    #[test]
    fn test_no_discount_renders_empty_placeholders() {
        let mut monthly = plan(LookupKey::PaidMonthly, 5000);
        monthly.applied_coupon = Some(AppliedCoupon {
            id: "IGNORED".into(),
            name: None,
        });

        let coupon = CouponDisplay::for_plan(&monthly, &PaymentCopy::default());
        assert_eq!(coupon.name, "");
        assert_eq!(coupon.amount, "");
        assert_eq!(
            coupon.description,
            "Code promo <strong></strong> appliqué : <strong>€HT/mois</strong>"
        );
        assert!(!coupon.is_applied());
    }
}
