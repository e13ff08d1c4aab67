//! # Request Validation
//!
//! Turns a raw [`PaymentRequest`] into a [`ValidatedPayment`].
//!
//! Checks run in a fixed order and stop at the first failure:
//! presence, amount, currency, email, then the optional fields.
//! `amount` is accepted only as a JSON integer in minor units.

use crate::currency::Currency;
use crate::error::{PaymentError, PaymentResult};
use crate::payment::{CustomerDetails, PaymentRequest, ThreeDSecure, ValidatedPayment};
use serde_json::Value;

/// Largest amount Stripe accepts for a single charge (minor units)
pub const MAX_AMOUNT: i64 = 99_999_999;

/// Payment-method type used when the client sends none
pub const DEFAULT_PAYMENT_METHOD_TYPE: &str = "card";

/// Validate a payment request.
pub fn validate_payment_request(request: &PaymentRequest) -> PaymentResult<ValidatedPayment> {
    let missing: Vec<String> = [
        ("amount", &request.amount),
        ("currency", &request.currency),
        ("email", &request.email),
    ]
    .into_iter()
    .filter(|(_, value)| is_missing(value.as_ref()))
    .map(|(field, _)| field.to_string())
    .collect();

    if !missing.is_empty() {
        return Err(PaymentError::MissingFields(missing));
    }

    // Presence was checked above.
    let amount = validate_amount(request.amount.as_ref().unwrap_or(&Value::Null))?;
    let currency = validate_currency(request.currency.as_ref().unwrap_or(&Value::Null))?;
    let email = validate_email(request.email.as_ref().unwrap_or(&Value::Null))?;

    let three_d_secure = match request.request_three_d_secure.as_deref() {
        None => ThreeDSecure::default(),
        Some(mode) if mode.trim().is_empty() => ThreeDSecure::default(),
        Some(mode) => ThreeDSecure::parse(mode).ok_or_else(|| PaymentError::InvalidField {
            field: "request_three_d_secure".to_string(),
            message: "must be one of automatic, any, challenge".to_string(),
        })?,
    };

    let payment_method_types = validate_payment_method_types(request.payment_method_types.as_deref())?;

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);

    Ok(ValidatedPayment {
        amount,
        currency,
        customer: CustomerDetails { email, name },
        three_d_secure,
        payment_method_types,
    })
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn validate_amount(value: &Value) -> PaymentResult<i64> {
    let amount = value.as_i64().ok_or_else(|| PaymentError::InvalidAmount {
        message: "must be an integer in minor currency units".to_string(),
    })?;

    if amount <= 0 {
        return Err(PaymentError::InvalidAmount {
            message: "must be greater than zero".to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(PaymentError::InvalidAmount {
            message: format!("must not exceed {}", MAX_AMOUNT),
        });
    }

    Ok(amount)
}

fn validate_currency(value: &Value) -> PaymentResult<Currency> {
    match value {
        Value::String(code) => code.parse(),
        other => Err(PaymentError::UnsupportedCurrency {
            currency: other.to_string(),
        }),
    }
}

fn validate_email(value: &Value) -> PaymentResult<String> {
    let email = value.as_str().map(str::trim).ok_or(PaymentError::InvalidEmail)?;
    if is_valid_email(email) {
        Ok(email.to_string())
    } else {
        Err(PaymentError::InvalidEmail)
    }
}

/// Basic address shape: `local@domain.tld`, no whitespace, one `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn validate_payment_method_types(types: Option<&[String]>) -> PaymentResult<Vec<String>> {
    let Some(types) = types.filter(|t| !t.is_empty()) else {
        return Ok(vec![DEFAULT_PAYMENT_METHOD_TYPE.to_string()]);
    };

    let mut accepted: Vec<String> = Vec::with_capacity(types.len());
    for kind in types {
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(PaymentError::InvalidField {
                field: "payment_method_types".to_string(),
                message: "entries must be non-empty strings".to_string(),
            });
        }
        if !accepted.iter().any(|k| k == kind) {
            accepted.push(kind.to_string());
        }
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> PaymentRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_minimal_request() {
        let payment = validate_payment_request(&request(json!({
            "amount": 1000,
            "currency": "usd",
            "email": "a@b.com"
        })))
        .unwrap();

        assert_eq!(payment.amount, 1000);
        assert_eq!(payment.currency, Currency::USD);
        assert_eq!(payment.customer.email, "a@b.com");
        assert_eq!(payment.customer.name, None);
        assert_eq!(payment.three_d_secure, ThreeDSecure::Automatic);
        assert_eq!(payment.payment_method_types, vec!["card".to_string()]);
    }

    #[test]
    fn test_lists_exactly_the_missing_fields() {
        let err = validate_payment_request(&request(json!({ "currency": "usd" }))).unwrap_err();
        match err {
            PaymentError::MissingFields(fields) => assert_eq!(fields, vec!["amount", "email"]),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = validate_payment_request(&request(json!({
            "amount": null,
            "currency": "  ",
            "email": "a@b.com"
        })))
        .unwrap_err();
        match err {
            PaymentError::MissingFields(fields) => assert_eq!(fields, vec!["amount", "currency"]),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = validate_payment_request(&request(json!({}))).unwrap_err();
        assert_eq!(err.fields(), vec!["amount", "currency", "email"]);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        for amount in [json!(0), json!(-5), json!("1000"), json!(10.5), json!(true), json!(100_000_000)] {
            let err = validate_payment_request(&request(json!({
                "amount": amount,
                "currency": "usd",
                "email": "a@b.com"
            })))
            .unwrap_err();
            assert!(
                matches!(err, PaymentError::InvalidAmount { .. }),
                "amount {amount} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_currency_is_case_insensitive_and_normalised() {
        let payment = validate_payment_request(&request(json!({
            "amount": 500,
            "currency": "EUR",
            "email": "a@b.com"
        })))
        .unwrap();
        assert_eq!(payment.currency.as_str(), "eur");

        for currency in [json!("jpy"), json!(840)] {
            let err = validate_payment_request(&request(json!({
                "amount": 500,
                "currency": currency,
                "email": "a@b.com"
            })))
            .unwrap_err();
            assert!(matches!(err, PaymentError::UnsupportedCurrency { .. }));
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));
        for bad in ["", "plain", "@b.com", "a@", "a@b", "a@.com", "a@b.", "a b@c.com", "a@b@c.com"] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }

        let err = validate_payment_request(&request(json!({
            "amount": 500,
            "currency": "usd",
            "email": "not-an-email"
        })))
        .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidEmail));
    }

    #[test]
    fn test_presence_checked_before_field_values() {
        let err = validate_payment_request(&request(json!({
            "amount": -1,
            "currency": "xyz"
        })))
        .unwrap_err();
        assert!(matches!(err, PaymentError::MissingFields(_)));
    }

    #[test]
    fn test_optional_fields() {
        let payment = validate_payment_request(&request(json!({
            "amount": 2500,
            "currency": "gbp",
            "email": " ada@example.com ",
            "name": "  Ada Lovelace ",
            "request_three_d_secure": "challenge",
            "payment_method_types": ["card", "link", "card"]
        })))
        .unwrap();

        assert_eq!(payment.customer.email, "ada@example.com");
        assert_eq!(payment.customer.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(payment.three_d_secure, ThreeDSecure::Challenge);
        assert_eq!(payment.payment_method_types, vec!["card".to_string(), "link".to_string()]);
    }

    #[test]
    fn test_rejects_bad_optional_fields() {
        let err = validate_payment_request(&request(json!({
            "amount": 2500,
            "currency": "gbp",
            "email": "a@b.com",
            "request_three_d_secure": "always"
        })))
        .unwrap_err();
        assert_eq!(err.fields(), vec!["request_three_d_secure"]);

        let err = validate_payment_request(&request(json!({
            "amount": 2500,
            "currency": "gbp",
            "email": "a@b.com",
            "payment_method_types": ["card", " "]
        })))
        .unwrap_err();
        assert_eq!(err.fields(), vec!["payment_method_types"]);
    }

    #[test]
    fn test_empty_method_list_defaults_to_card() {
        let payment = validate_payment_request(&request(json!({
            "amount": 2500,
            "currency": "cad",
            "email": "a@b.com",
            "payment_method_types": []
        })))
        .unwrap();
        assert_eq!(payment.payment_method_types, vec!["card".to_string()]);
    }
}
