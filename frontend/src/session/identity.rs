use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who the client believes is logged in. Built from the login form, not from
/// the backend, so it is a display hint rather than proof of anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
        }
    }
}

/// Role as stated by the access token's own claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    Employee,
    #[default]
    Unknown,
}

impl Role {
    /// Reads `role` or `is_staff` from the JWT payload. The signature is not
    /// checked; the backend still enforces every permission.
    pub fn from_access_token(token: &str) -> Self {
        decode_claims(token)
            .map(|claims| Self::from_claims(&claims))
            .unwrap_or_default()
    }

    fn from_claims(claims: &Value) -> Self {
        if let Some(role) = claims.get("role").and_then(Value::as_str) {
            return if role.eq_ignore_ascii_case("admin") {
                Role::Admin
            } else {
                Role::Employee
            };
        }
        match claims.get("is_staff").and_then(Value::as_bool) {
            Some(true) => Role::Admin,
            Some(false) => Role::Employee,
            None => Role::Unknown,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

fn decode_claims(token: &str) -> Option<Value> {
    let mut parts = token.split('.');
    parts.next()?;
    let payload = parts.next()?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let value: Value = serde_json::from_slice(&decoded).ok()?;
    value.is_object().then_some(value)
}

#[cfg(test)]
pub(crate) fn token_with_claims(claims: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
