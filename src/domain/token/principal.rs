use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::ClaimSet;

/// Claims recovered from a token that passed verification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPrincipal {
    claims: ClaimSet,
    issuer: Option<String>,
    audience: Vec<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenPrincipal {
    /// Build a principal from a verified JSON payload
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        let issuer = payload.get("iss").and_then(Value::as_str).map(str::to_string);

        let audience = match payload.get("aud") {
            Some(Value::String(aud)) => vec![aud.clone()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            claims: ClaimSet::from_payload(payload),
            issuer,
            audience,
            issued_at: timestamp(payload, "iat"),
            expires_at: timestamp(payload, "exp"),
        }
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn into_claims(self) -> ClaimSet {
        self.claims
    }

    /// Value of the `name` claim, if present
    pub fn name(&self) -> Option<&str> {
        self.claims.get("name")
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| exp <= Utc::now())
            .unwrap_or(false)
    }
}

fn timestamp(payload: &Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    payload
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
