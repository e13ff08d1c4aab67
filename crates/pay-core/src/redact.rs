//! # Log Redaction
//!
//! Request bodies carry emails, names and sometimes secrets. Only fields on
//! an explicit allow-list are logged in clear.

use serde_json::Value;
use std::collections::HashSet;

/// Placeholder written in place of a redacted value
pub const REDACTED: &str = "[REDACTED]";

/// Fields that are safe to log by default
pub const DEFAULT_LOG_FIELDS: &[&str] = &[
    "amount",
    "currency",
    "payment_method_types",
    "request_three_d_secure",
];

/// Allow-list based JSON redactor
#[derive(Debug, Clone)]
pub struct LogRedactor {
    allowed: HashSet<String>,
}

impl LogRedactor {
    /// Create a redactor that keeps only the given field names
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether a field may be logged in clear
    pub fn allows(&self, field: &str) -> bool {
        self.allowed.contains(field)
    }

    /// Return a copy of `value` with every non-allowed object field masked.
    ///
    /// Allowed fields keep their whole value; nested objects under other
    /// keys are masked wholesale.
    pub fn redact(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, v)| {
                        let v = if self.allows(key) {
                            v.clone()
                        } else {
                            Value::String(REDACTED.to_string())
                        };
                        (key.clone(), v)
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact(v)).collect()),
            _ => Value::String(REDACTED.to_string()),
        }
    }
}

impl Default for LogRedactor {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FIELDS.iter().copied())
    }
}

/// Mask a secret, keeping only its recognisable prefix (`sk_test_`, `whsec_`...).
pub fn mask_secret(secret: &str) -> String {
    let prefix_end = secret
        .char_indices()
        .take(8)
        .filter(|(_, c)| *c == '_')
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0);
    format!("{}{}", &secret[..prefix_end], "*".repeat(8))
}
