use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ApiClient, FetchResult};
use crate::error::ApiFailure;
use crate::models::{de_flag, de_opt_id};

pub const PROFILE_PATH: &str = "/api/user/profile";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProfileWire")]
pub struct Profile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub designation: Option<String>,
    pub is_verified: bool,
}

/// Profile as sent. Servers (and token claims) name some fields in more
/// than one way and may send both spellings; the first present wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    #[serde(default, deserialize_with = "de_opt_id")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "de_named")]
    company: Option<String>,
    #[serde(default, deserialize_with = "de_named")]
    organisation: Option<String>,
    #[serde(default, deserialize_with = "de_named")]
    designation: Option<String>,
    #[serde(default, deserialize_with = "de_flag")]
    is_verified: bool,
}

impl From<ProfileWire> for Profile {
    fn from(wire: ProfileWire) -> Self {
        Self {
            id: wire.id,
            name: wire.name.or(wire.username),
            email: wire.email,
            role: wire.role,
            company: wire.company.or(wire.organisation),
            designation: wire.designation,
            is_verified: wire.is_verified,
        }
    }
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("User")
    }
}

/// Accepts either a plain string or an object carrying a `name`.
fn de_named<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(map)) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    })
}

impl ApiClient {
    pub async fn get_profile(&self, token: &str) -> FetchResult {
        self.get(PROFILE_PATH, Some(token)).await
    }

    pub async fn fetch_profile(&self, token: &str) -> Result<Profile, ApiFailure> {
        self.get_profile(token).await.record()
    }
}

/// Read the claims of a bearer token without verifying its signature.
///
/// Display only: the client holds no key, and the server remains the judge
/// of whether the token is valid.
pub fn unverified_claims(token: &str) -> Option<Profile> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<Profile>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(error = %e, "token claims are not readable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    #[test]
    fn profile_accepts_nested_or_flat_company() {
        let nested: Profile = serde_json::from_value(json!({
            "id": 1,
            "name": "Alice",
            "organisation": {"id": "o1", "name": "Acme"},
            "isVerified": true
        }))
        .unwrap();
        assert_eq!(nested.id.as_deref(), Some("1"));
        assert_eq!(nested.company.as_deref(), Some("Acme"));
        assert!(nested.is_verified);

        let flat: Profile = serde_json::from_value(json!({"company": "Globex"})).unwrap();
        assert_eq!(flat.company.as_deref(), Some("Globex"));
        assert_eq!(flat.display_name(), "User");
    }

    #[test]
    fn both_company_spellings_decode() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Alice",
            "username": "alice",
            "company": "Globex",
            "organisation": {"id": "o1", "name": "Acme"}
        }))
        .unwrap();
        assert_eq!(profile.company.as_deref(), Some("Globex"));
        assert_eq!(profile.name.as_deref(), Some("Alice"));

        let result = FetchResult::new(200, json!({"status": true, "data": {
            "company": "Globex",
            "organisation": "Acme"
        }}));
        assert_eq!(result.record::<Profile>().unwrap().company.as_deref(), Some("Globex"));
    }

    #[test]
    fn claims_are_read_from_any_signed_token() {
        let claims = json!({"id": "u1", "email": "alice@x.com", "role": "admin", "exp": 1});
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap();

        let profile = unverified_claims(&token).expect("claims");
        assert_eq!(profile.email.as_deref(), Some("alice@x.com"));
        assert_eq!(profile.role.as_deref(), Some("admin"));
        assert_eq!(profile.display_name(), "alice@x.com");
    }

    #[test]
    fn opaque_token_has_no_claims() {
        assert_eq!(unverified_claims("abc.def.ghi"), None);
        assert_eq!(unverified_claims("not-a-jwt"), None);
    }
}
