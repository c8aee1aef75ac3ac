//! Receipt email generation.
//!
//! Plain inline-styled HTML, one row per cart line, with a billing-period
//! summary derived from the cart's duration labels.

use cirrus_core::format_usd;

use crate::cart::{Cart, CartLine, pricing};

use super::PlacedOrder;

/// Human-readable billing period for the cart as a whole.
///
/// A cart whose lines agree on one duration label maps to that period;
/// mixed durations are flagged rather than guessed.
#[must_use]
pub fn billing_period_text(cart: &Cart) -> String {
    let mut durations: Vec<String> = cart
        .lines()
        .iter()
        .map(|line| {
            line.variation
                .as_ref()
                .map_or_else(|| "monthly".to_owned(), |v| v.duration.to_lowercase())
        })
        .collect();
    durations.sort();
    durations.dedup();

    match durations.as_slice() {
        [] => "Monthly".to_owned(),
        [single] => match single.as_str() {
            "annual" | "yearly" => "Yearly".to_owned(),
            "quarterly" => "Quarterly".to_owned(),
            "biannual" | "semi-annual" => "Biannual".to_owned(),
            _ => "Monthly".to_owned(),
        },
        _ => "Various (see details)".to_owned(),
    }
}

fn feature_names(line: &CartLine) -> String {
    if line.features.is_empty() {
        "None".to_owned()
    } else {
        line.features
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn item_row(line: &CartLine) -> String {
    let name = line.variation.as_ref().map_or_else(
        || line.product.name.clone(),
        |v| format!("{} ({})", line.product.name, v.duration),
    );
    format!(
        "<tr>\
         <td style=\"border: 1px solid #ddd; padding: 10px;\">{name}</td>\
         <td style=\"border: 1px solid #ddd; padding: 10px;\">{features}</td>\
         <td style=\"border: 1px solid #ddd; padding: 10px;\">{quantity}</td>\
         <td style=\"border: 1px solid #ddd; padding: 10px;\">{price}</td>\
         </tr>",
        features = feature_names(line),
        quantity = line.quantity,
        price = format_usd(pricing::line_total(line)),
    )
}

/// Render the order-confirmation receipt.
///
/// The short receipt number is the first segment of the order UUID,
/// uppercased, which is what support asks customers for.
#[must_use]
pub fn receipt_html(order: &PlacedOrder, cart: &Cart) -> String {
    let receipt_no = order
        .id
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_uppercase();
    let date = order.placed_at.format("%B %e, %Y");
    let period = billing_period_text(cart);
    let rows: String = cart.lines().iter().map(item_row).collect();
    let total = format_usd(order.total);

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #ddd;">
  <div style="text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 20px;">
    <h1 style="color: #333; margin: 0;">Cirrus</h1>
    <h2 style="color: #333; margin: 10px 0 0 0;">Order Confirmation</h2>
  </div>
  <div style="margin-bottom: 20px;">
    <p><strong>Receipt #:</strong> {receipt_no}</p>
    <p><strong>Date:</strong> {date}</p>
    <p><strong>Customer:</strong> {name}</p>
    <p><strong>Billing Address:</strong> {address}</p>
  </div>
  <h3 style="border-bottom: 1px solid #eee; padding-bottom: 10px;">Order Details</h3>
  <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
    <thead>
      <tr>
        <th style="border: 1px solid #ddd; padding: 10px; text-align: left; background-color: #f8f8f8;">Product</th>
        <th style="border: 1px solid #ddd; padding: 10px; text-align: left; background-color: #f8f8f8;">Features</th>
        <th style="border: 1px solid #ddd; padding: 10px; text-align: left; background-color: #f8f8f8;">Quantity</th>
        <th style="border: 1px solid #ddd; padding: 10px; text-align: left; background-color: #f8f8f8;">Price</th>
      </tr>
    </thead>
    <tbody>
      {rows}
      <tr>
        <td colspan="3" style="border: 1px solid #ddd; padding: 10px; text-align: right;"><strong>Total:</strong></td>
        <td style="border: 1px solid #ddd; padding: 10px;"><strong>{total}/{period_lower}</strong></td>
      </tr>
    </tbody>
  </table>
  <div style="background-color: #f9f9f9; padding: 15px; border-radius: 5px; margin-top: 20px;">
    <h4 style="margin-top: 0;">Billing Details</h4>
    <p><strong>Billing Period:</strong> {period}</p>
    <p><strong>Payment Reference:</strong> {payment_ref}</p>
  </div>
  <div style="text-align: center; margin-top: 30px; color: #555;">
    <p>Thank you for your business!</p>
    <p style="font-size: 12px; color: #999;">If you have any questions, please contact our support team.</p>
  </div>
</div>"#,
        name = order.billing.name,
        address = order.billing.address,
        period_lower = period.to_lowercase(),
        payment_ref = order.payment_ref,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::cart::{FeatureSnapshot, ProductSnapshot, VariationSnapshot};
    use crate::checkout::BillingContact;
    use cirrus_core::{Email, FeatureId, OrderId, ProductId, VariationId};

    fn cart(duration: Option<&str>) -> Cart {
        let mut cart = Cart::new();
        cart.add(
            ProductSnapshot {
                id: ProductId::new(Uuid::from_u128(1)),
                name: "GameStream Pro".to_owned(),
                short_description: None,
                price: dec!(14.99),
                image: None,
            },
            duration.map(|label| VariationSnapshot {
                id: VariationId::new(Uuid::from_u128(2)),
                duration: label.to_owned(),
                price_modifier: dec!(1),
            }),
            vec![FeatureSnapshot {
                id: FeatureId::new(Uuid::from_u128(3)),
                name: "4K Resolution".to_owned(),
                price: dec!(5.99),
            }],
            1,
        );
        cart
    }

    fn order() -> PlacedOrder {
        PlacedOrder {
            id: OrderId::new(Uuid::from_u128(0xDEAD_BEEF)),
            billing: BillingContact {
                name: "Grace Hopper".to_owned(),
                email: Email::parse("grace@example.com").unwrap(),
                address: "1 Harbor St, Arlington, VA 22202, USA".to_owned(),
            },
            total: dec!(20.98),
            payment_ref: "8XP12345".to_owned(),
            expires_at: Utc::now(),
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn test_billing_period_single_yearly() {
        assert_eq!(billing_period_text(&cart(Some("Yearly"))), "Yearly");
        assert_eq!(billing_period_text(&cart(Some("Annual"))), "Yearly");
    }

    #[test]
    fn test_billing_period_defaults_to_monthly() {
        assert_eq!(billing_period_text(&cart(None)), "Monthly");
        assert_eq!(billing_period_text(&Cart::new()), "Monthly");
    }

    #[test]
    fn test_billing_period_mixed_durations() {
        let mut mixed = cart(Some("Monthly"));
        mixed.add(
            ProductSnapshot {
                id: ProductId::new(Uuid::from_u128(9)),
                name: "CloudPlay".to_owned(),
                short_description: None,
                price: dec!(7.99),
                image: None,
            },
            Some(VariationSnapshot {
                id: VariationId::new(Uuid::from_u128(10)),
                duration: "Yearly".to_owned(),
                price_modifier: dec!(10),
            }),
            vec![],
            1,
        );
        assert_eq!(billing_period_text(&mixed), "Various (see details)");
    }

    #[test]
    fn test_receipt_contains_line_and_total() {
        let html = receipt_html(&order(), &cart(Some("Monthly")));
        assert!(html.contains("GameStream Pro (Monthly)"));
        assert!(html.contains("4K Resolution"));
        assert!(html.contains("$20.98"));
        assert!(html.contains("Grace Hopper"));
        assert!(html.contains("8XP12345"));
    }

    #[test]
    fn test_receipt_number_is_short_uppercase_prefix() {
        let html = receipt_html(&order(), &cart(None));
        let receipt_no = order().id.to_string().chars().take(8).collect::<String>();
        assert!(html.contains(&receipt_no.to_uppercase()));
    }
}
