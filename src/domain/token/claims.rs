use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use serde_json::{Map, Value};

use crate::domain::AuthError;

/// Claim names written and checked by the token policy itself
pub const REGISTERED_CLAIMS: [&str; 5] = ["iss", "aud", "exp", "iat", "nbf"];

/// A single named attribute asserted about the token subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    name: String,
    value: String,
}

impl Claim {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered sequence of caller-supplied claims
///
/// Repeated names are allowed as long as they are adjacent. On the wire they
/// become one JSON array and decode back into the same run of claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(Claim::new(name, value));
        self
    }

    pub fn push(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// First value recorded under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Every value recorded under `name`, in order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.claims
            .iter()
            .filter(move |c| c.name == name)
            .map(|c| c.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Claim> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Check that the set can be issued and decodes back unchanged
    ///
    /// Registered names are rejected, as is a repeated name split by another
    /// claim, since the payload groups every value of a name into one array.
    pub fn validate(&self) -> Result<(), AuthError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut previous: Option<&str> = None;

        for claim in &self.claims {
            let name = claim.name.as_str();
            if REGISTERED_CLAIMS.contains(&name) {
                return Err(AuthError::reserved_claim(name));
            }

            if previous != Some(name) {
                if !seen.insert(name) {
                    return Err(AuthError::scattered_claim(name));
                }
                previous = Some(name);
            }
        }

        Ok(())
    }

    /// Build the JSON payload members for these claims
    pub(crate) fn to_payload(&self) -> Result<Map<String, Value>, AuthError> {
        self.validate()?;
        let mut payload = Map::new();

        for claim in &self.claims {
            let value = Value::String(claim.value.clone());
            match payload.get_mut(&claim.name) {
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    payload.insert(claim.name.clone(), value);
                }
            }
        }

        Ok(payload)
    }

    /// Recover caller claims from a decoded payload, skipping registered claims
    pub(crate) fn from_payload(payload: &Map<String, Value>) -> Self {
        let mut claims = Self::new();

        for (name, value) in payload {
            if REGISTERED_CLAIMS.contains(&name.as_str()) {
                continue;
            }

            match value {
                Value::Array(values) => {
                    for item in values {
                        claims.push(Claim::new(name, value_text(item)));
                    }
                }
                other => claims.push(Claim::new(name, value_text(other))),
            }
        }

        claims
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Vec<Claim>> for ClaimSet {
    fn from(claims: Vec<Claim>) -> Self {
        Self { claims }
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ClaimSet {
    type Item = &'a Claim;
    type IntoIter = std::slice::Iter<'a, Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}
