//! Cart pricing.
//!
//! Pure decimal arithmetic over cart snapshots; no I/O, no catalog access.
//! Totals are computed from the prices captured at add time, deliberately
//! not re-fetched at checkout, so a mid-checkout catalog edit cannot
//! silently change what the customer approved.

use rust_decimal::Decimal;

use super::{Cart, CartLine};

/// Total for one cart line.
///
/// `(base price * variation multiplier + sum of feature prices) * quantity`.
/// A line without a variation uses multiplier 1. Feature prices are flat
/// per unit, so they scale with quantity along with the base price.
#[must_use]
pub fn line_total(line: &CartLine) -> Decimal {
    let multiplier = line
        .variation
        .as_ref()
        .map_or(Decimal::ONE, |v| v.price_modifier);
    let base = line.product.price * multiplier;
    let features: Decimal = line.features.iter().map(|f| f.price).sum();
    (base + features) * Decimal::from(line.quantity)
}

/// Total for the whole cart: the sum of line totals. Empty cart is zero.
#[must_use]
pub fn cart_total(cart: &Cart) -> Decimal {
    cart.lines().iter().map(line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::{Cart, FeatureSnapshot, ProductSnapshot, VariationSnapshot};
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use cirrus_core::{FeatureId, ProductId, VariationId};

    fn product(price: Decimal) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(Uuid::from_u128(1)),
            name: "GameStream Pro".to_owned(),
            short_description: None,
            price,
            image: None,
        }
    }

    fn variation(duration: &str, modifier: Decimal) -> VariationSnapshot {
        VariationSnapshot {
            id: VariationId::new(Uuid::from_u128(2)),
            duration: duration.to_owned(),
            price_modifier: modifier,
        }
    }

    fn feature(price: Decimal) -> FeatureSnapshot {
        FeatureSnapshot {
            id: FeatureId::new(Uuid::from_u128(price.mantissa().unsigned_abs())),
            name: "4K Resolution".to_owned(),
            price,
        }
    }

    fn line(
        price: Decimal,
        variation_: Option<VariationSnapshot>,
        features: Vec<FeatureSnapshot>,
        quantity: u32,
    ) -> CartLine {
        CartLine {
            product: product(price),
            variation: variation_,
            features,
            quantity,
        }
    }

    #[test]
    fn test_bare_line_is_price_times_quantity() {
        for qty in 1..=5 {
            let l = line(dec!(14.99), None, vec![], qty);
            assert_eq!(line_total(&l), dec!(14.99) * Decimal::from(qty));
        }
    }

    #[test]
    fn test_monthly_variation_with_feature() {
        // GameStream Pro 14.99, Monthly x1, 4K Resolution 5.99, qty 1
        let l = line(
            dec!(14.99),
            Some(variation("Monthly", dec!(1))),
            vec![feature(dec!(5.99))],
            1,
        );
        assert_eq!(line_total(&l), dec!(20.98));
    }

    #[test]
    fn test_yearly_variation_quantity_two() {
        // 14.99 x10 (Yearly) x2, no features
        let l = line(dec!(14.99), Some(variation("Yearly", dec!(10))), vec![], 2);
        assert_eq!(line_total(&l), dec!(299.80));
    }

    #[test]
    fn test_features_scale_with_quantity() {
        let l = line(dec!(10), None, vec![feature(dec!(3))], 4);
        assert_eq!(line_total(&l), dec!(52));
    }

    #[test]
    fn test_adding_features_never_decreases_total() {
        let mut features = vec![];
        let mut last = line_total(&line(dec!(9.99), None, features.clone(), 2));
        for price in [dec!(0), dec!(1.50), dec!(7.99)] {
            features.push(feature(price));
            let next = line_total(&line(dec!(9.99), None, features.clone(), 2));
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_empty_cart_total_is_zero() {
        assert_eq!(cart_total(&Cart::new()), Decimal::ZERO);
    }

    #[test]
    fn test_cart_total_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add(product(dec!(14.99)), None, vec![feature(dec!(5.99))], 1);
        cart.add(
            ProductSnapshot {
                id: ProductId::new(Uuid::from_u128(9)),
                name: "CloudPlay".to_owned(),
                short_description: None,
                price: dec!(7.99),
                image: None,
            },
            Some(variation("Yearly", dec!(10))),
            vec![],
            3,
        );

        let expected: Decimal = cart.lines().iter().map(line_total).sum();
        assert_eq!(cart_total(&cart), expected);
        assert_eq!(cart_total(&cart), dec!(20.98) + dec!(239.70));
    }

    #[test]
    fn test_no_binary_float_drift_across_many_lines() {
        // 0.1-style amounts stay exact under repeated decimal addition.
        let mut cart = Cart::new();
        for n in 0..100u128 {
            cart.add(
                ProductSnapshot {
                    id: ProductId::new(Uuid::from_u128(n)),
                    name: format!("p{n}"),
                    short_description: None,
                    price: dec!(0.10),
                    image: None,
                },
                None,
                vec![],
                1,
            );
        }
        assert_eq!(cart_total(&cart), dec!(10.00));
    }
}
