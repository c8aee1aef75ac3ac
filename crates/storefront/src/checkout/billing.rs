//! Billing input validation.
//!
//! Shape checks only: name parts and address components must be non-empty
//! after trimming, and the email must parse. The first offending field is
//! named in the error so the form can highlight it.

use serde::{Deserialize, Serialize};

use cirrus_core::Email;

use super::CheckoutError;

/// Raw billing form input, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// Validated billing contact with the address flattened for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContact {
    pub name: String,
    pub email: Email,
    pub address: String,
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CheckoutError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CheckoutError::Validation { field });
    }
    Ok(trimmed)
}

/// Validate billing details into a [`BillingContact`].
///
/// # Errors
///
/// Returns [`CheckoutError::Validation`] naming the first field that is
/// empty or, for the email, syntactically invalid.
pub fn validate(details: &BillingDetails) -> Result<BillingContact, CheckoutError> {
    let first = required(&details.first_name, "first name")?;
    let last = required(&details.last_name, "last name")?;
    let email = Email::parse(details.email.trim())
        .map_err(|_| CheckoutError::Validation { field: "email" })?;
    let street = required(&details.address, "address")?;
    let city = required(&details.city, "city")?;
    let state = required(&details.state, "state")?;
    let zip = required(&details.zip, "zip")?;
    let country = required(&details.country, "country")?;

    Ok(BillingContact {
        name: format!("{first} {last}"),
        email,
        address: format!("{street}, {city}, {state} {zip}, {country}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> BillingDetails {
        BillingDetails {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            address: "1 Harbor St".into(),
            city: "Arlington".into(),
            state: "VA".into(),
            zip: "22202".into(),
            country: "USA".into(),
        }
    }

    #[test]
    fn test_valid_details_flatten() {
        let contact = validate(&details()).unwrap();
        assert_eq!(contact.name, "Grace Hopper");
        assert_eq!(contact.email.as_str(), "grace@example.com");
        assert_eq!(contact.address, "1 Harbor St, Arlington, VA 22202, USA");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let mut d = details();
        d.first_name = "  Grace  ".into();
        d.city = " Arlington ".into();
        let contact = validate(&d).unwrap();
        assert_eq!(contact.name, "Grace Hopper");
        assert_eq!(contact.address, "1 Harbor St, Arlington, VA 22202, USA");
    }

    #[test]
    fn test_first_offending_field_is_named() {
        for (mutate, field) in [
            (
                Box::new(|d: &mut BillingDetails| d.first_name.clear())
                    as Box<dyn Fn(&mut BillingDetails)>,
                "first name",
            ),
            (Box::new(|d| d.last_name = "   ".into()), "last name"),
            (Box::new(|d| d.email = "nope".into()), "email"),
            (Box::new(|d| d.address.clear()), "address"),
            (Box::new(|d| d.city.clear()), "city"),
            (Box::new(|d| d.state.clear()), "state"),
            (Box::new(|d| d.zip.clear()), "zip"),
            (Box::new(|d| d.country.clear()), "country"),
        ] {
            let mut d = details();
            mutate(&mut d);
            match validate(&d).unwrap_err() {
                CheckoutError::Validation { field: got } => assert_eq!(got, field),
                other => panic!("expected Validation, got {other:?}"),
            }
        }
    }
}
