//! Subscription expiry arithmetic.
//!
//! An order has a single expiration timestamp. It is derived from the
//! first cart line whose variation label carries a recognized duration
//! keyword: `"month"` adds N calendar months and `"year"` adds N years,
//! where N is the leading integer in the label (1 when absent). Carts with
//! no duration-bearing line fall back to a flat 30 days.

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::cart::Cart;

/// Fallback expiry for carts without a recognized duration.
const DEFAULT_EXPIRY_DAYS: i64 = 30;

/// A recognized subscription length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTerm {
    Months(u32),
    Years(u32),
}

/// Parse a duration label such as `"Monthly"`, `"12 months"`, or
/// `"Yearly"` into a term. Unrecognized labels yield `None`.
#[must_use]
pub fn parse_duration_label(label: &str) -> Option<SubscriptionTerm> {
    let lower = label.trim().to_lowercase();

    let count = lower
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse::<u32>()
        .ok()
        .filter(|&n| n >= 1)
        .unwrap_or(1);

    if lower.contains("month") {
        Some(SubscriptionTerm::Months(count))
    } else if lower.contains("year") {
        Some(SubscriptionTerm::Years(count))
    } else {
        None
    }
}

/// End of a term starting at `now`, in calendar months/years.
#[must_use]
pub fn term_end(now: DateTime<Utc>, term: SubscriptionTerm) -> DateTime<Utc> {
    let months = match term {
        SubscriptionTerm::Months(n) => n,
        SubscriptionTerm::Years(n) => n.saturating_mul(12),
    };
    // Out-of-range dates only arise from absurd labels; fall back rather
    // than panic.
    now.checked_add_months(Months::new(months))
        .unwrap_or_else(|| default_expiry(now))
}

/// The fallback expiry: `now` + 30 days.
#[must_use]
pub fn default_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + TimeDelta::days(DEFAULT_EXPIRY_DAYS)
}

/// Expiration for a whole order: the first line with a recognized
/// duration wins; otherwise the 30-day fallback applies.
#[must_use]
pub fn order_expiry(cart: &Cart, now: DateTime<Utc>) -> DateTime<Utc> {
    cart.lines()
        .iter()
        .find_map(|line| {
            line.variation
                .as_ref()
                .and_then(|v| parse_duration_label(&v.duration))
        })
        .map_or_else(|| default_expiry(now), |term| term_end(now, term))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::cart::{ProductSnapshot, VariationSnapshot};
    use cirrus_core::{ProductId, VariationId};

    fn cart_with_durations(durations: &[Option<&str>]) -> Cart {
        let mut cart = Cart::new();
        for (n, duration) in durations.iter().enumerate() {
            cart.add(
                ProductSnapshot {
                    id: ProductId::new(Uuid::from_u128(n as u128 + 1)),
                    name: format!("p{n}"),
                    short_description: None,
                    price: dec!(9.99),
                    image: None,
                },
                duration.map(|label| VariationSnapshot {
                    id: VariationId::new(Uuid::from_u128(n as u128 + 100)),
                    duration: label.to_owned(),
                    price_modifier: dec!(1),
                }),
                vec![],
                1,
            );
        }
        cart
    }

    #[test]
    fn test_parse_monthly() {
        assert_eq!(
            parse_duration_label("Monthly"),
            Some(SubscriptionTerm::Months(1))
        );
    }

    #[test]
    fn test_parse_leading_integer() {
        assert_eq!(
            parse_duration_label("12 Months"),
            Some(SubscriptionTerm::Months(12))
        );
        assert_eq!(
            parse_duration_label("3 months"),
            Some(SubscriptionTerm::Months(3))
        );
        assert_eq!(
            parse_duration_label("2 Years"),
            Some(SubscriptionTerm::Years(2))
        );
    }

    #[test]
    fn test_parse_yearly() {
        assert_eq!(
            parse_duration_label("Yearly"),
            Some(SubscriptionTerm::Years(1))
        );
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(parse_duration_label("Lifetime"), None);
        assert_eq!(parse_duration_label(""), None);
    }

    #[test]
    fn test_twelve_months_is_one_calendar_year() {
        let now = "2026-02-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = term_end(now, SubscriptionTerm::Months(12));
        assert_eq!(end, "2027-02-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_month_end_clamping() {
        // Jan 31 + 1 month clamps to Feb 28.
        let now = "2026-01-31T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let end = term_end(now, SubscriptionTerm::Months(1));
        assert_eq!(end, "2026-02-28T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_order_expiry_first_duration_wins() {
        let now = Utc::now();
        let cart = cart_with_durations(&[None, Some("3 Months"), Some("Yearly")]);
        assert_eq!(
            order_expiry(&cart, now),
            now.checked_add_months(Months::new(3)).unwrap()
        );
    }

    #[test]
    fn test_order_expiry_default_is_thirty_days() {
        let now = Utc::now();
        let cart = cart_with_durations(&[None, Some("Lifetime")]);
        assert_eq!(order_expiry(&cart, now), now + TimeDelta::days(30));
    }

    #[test]
    fn test_twelve_months_is_not_twelve_days() {
        let now = Utc::now();
        let cart = cart_with_durations(&[Some("12 months")]);
        let expiry = order_expiry(&cart, now);
        assert!(expiry > now + TimeDelta::days(360));
    }
}
