//! List-response normalization.
//!
//! List endpoints answer in several shapes. [`unwrap_collection`] resolves
//! them in one fixed priority order, taking the first candidate that is a
//! JSON array:
//!
//! 1. the body itself (`[...]`)
//! 2. each entity-specific key, in the order given (`{"roles": [...]}`)
//! 3. `{"data": [...]}`
//! 4. `{"items": [...]}`
//!
//! Anything else yields an empty collection.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::decode;
use super::FetchResult;
use crate::error::ApiFailure;

const GENERIC_KEYS: [&str; 2] = ["data", "items"];

pub fn unwrap_collection<'a>(body: &'a Value, entity_keys: &[&str]) -> &'a [Value] {
    if let Value::Array(items) = body {
        return items;
    }

    entity_keys
        .iter()
        .chain(GENERIC_KEYS.iter())
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

impl FetchResult {
    /// Classify, normalize and decode a list response.
    pub fn collection<T: DeserializeOwned>(&self, entity_keys: &[&str]) -> Result<Vec<T>, ApiFailure> {
        if let Some(failure) = self.failure() {
            return Err(failure);
        }
        unwrap_collection(&self.data, entity_keys)
            .iter()
            .map(decode)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_supported_shapes_normalize_to_the_same_list() {
        let expected = vec![json!({"id": "r1"}), json!({"id": "r2"})];
        let shapes = [
            json!([{"id": "r1"}, {"id": "r2"}]),
            json!({"status": true, "data": [{"id": "r1"}, {"id": "r2"}]}),
            json!({"status": true, "roles": [{"id": "r1"}, {"id": "r2"}]}),
            json!({"items": [{"id": "r1"}, {"id": "r2"}]}),
        ];
        for body in &shapes {
            assert_eq!(unwrap_collection(body, &["roles"]), expected.as_slice(), "{}", body);
        }
    }

    #[test]
    fn entity_key_wins_over_data() {
        let body = json!({"data": [{"id": "d"}], "users": [{"id": "u"}]});
        assert_eq!(unwrap_collection(&body, &["users"]), &[json!({"id": "u"})]);
    }

    #[test]
    fn non_array_candidates_are_skipped() {
        let body = json!({"data": {"users": []}, "items": [{"id": "i"}]});
        assert_eq!(unwrap_collection(&body, &["users"]), &[json!({"id": "i"})]);
    }

    #[test]
    fn unknown_shape_is_empty() {
        assert!(unwrap_collection(&json!({"status": true}), &["roles"]).is_empty());
        assert!(unwrap_collection(&json!("nope"), &[]).is_empty());
    }

    #[test]
    fn failed_list_is_not_decoded() {
        let result = FetchResult::new(403, json!({"message": "Forbidden"}));
        let list = result.collection::<Value>(&["roles"]);
        assert_eq!(list, Err(ApiFailure::http(403, Some("Forbidden".to_string()))));
    }
}
