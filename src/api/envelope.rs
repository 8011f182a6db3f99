use serde::de::DeserializeOwned;
use serde_json::Value;

use super::FetchResult;
use crate::error::ApiFailure;

impl FetchResult {
    /// Server-defined `status` flag, if the body carries one.
    pub fn app_status(&self) -> Option<bool> {
        self.data.get("status").and_then(Value::as_bool)
    }

    /// Server-defined `message`, if present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
    }

    /// Classify the response. `None` means success: 2xx, a JSON body, and a
    /// `status` flag that is `true` or absent. A 2xx body that is empty or
    /// not JSON is a transport failure; a non-2xx one stays an HTTP failure.
    pub fn failure(&self) -> Option<ApiFailure> {
        if let Some(reason) = &self.transport_error {
            return Some(ApiFailure::transport(reason.clone()));
        }
        let message = self.message().map(str::to_string);
        if !self.ok {
            return Some(match self.status {
                Some(status) => ApiFailure::http(status, message),
                None => ApiFailure::transport("no response"),
            });
        }
        if let Some(reason) = &self.body_error {
            return Some(ApiFailure::transport(reason.clone()));
        }
        match self.app_status() {
            Some(false) => Some(ApiFailure::rejected(message)),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// Decode the whole body as `T` after classification.
    pub fn outcome<T: DeserializeOwned>(&self) -> Result<T, ApiFailure> {
        if let Some(failure) = self.failure() {
            return Err(failure);
        }
        decode(&self.data)
    }

    /// Decode the record a single-entity endpoint returns. Records arrive
    /// nested under `data`; a body without that key is decoded whole.
    pub fn record<T: DeserializeOwned>(&self) -> Result<T, ApiFailure> {
        if let Some(failure) = self.failure() {
            return Err(failure);
        }
        match self.data.get("data") {
            Some(inner) if !inner.is_null() => decode(inner),
            _ => decode(&self.data),
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, ApiFailure> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tracing::error!(
            error = %e,
            expected = std::any::type_name::<T>(),
            "response does not match schema"
        );
        ApiFailure::schema(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn status_false_on_2xx_is_a_rejection() {
        let result = FetchResult::new(200, json!({"status": false, "message": "Invalid OTP"}));
        assert!(result.ok);
        assert_eq!(
            result.failure(),
            Some(ApiFailure::rejected(Some("Invalid OTP".to_string())))
        );
    }

    #[test]
    fn non_2xx_is_an_http_failure_even_with_status_true() {
        let result = FetchResult::new(500, json!({"status": true}));
        assert_eq!(result.failure(), Some(ApiFailure::http(500, None)));
    }

    #[test]
    fn missing_status_on_2xx_counts_as_success() {
        assert!(FetchResult::new(204, json!({})).is_success());
    }

    #[test]
    fn unreadable_2xx_body_is_a_transport_failure() {
        let result = FetchResult::unreadable(200, "response body is not JSON");
        assert!(result.ok);
        assert_eq!(result.data, json!({}));
        assert_eq!(
            result.failure(),
            Some(ApiFailure::transport("response body is not JSON"))
        );
    }

    #[test]
    fn unreadable_non_2xx_body_stays_an_http_failure() {
        let result = FetchResult::unreadable(502, "response body is not JSON");
        assert_eq!(result.failure(), Some(ApiFailure::http(502, None)));
    }

    #[test]
    fn record_reads_nested_data_or_whole_body() {
        let nested = FetchResult::new(200, json!({"status": true, "data": {"name": "Acme"}}));
        assert_eq!(nested.record::<Named>().unwrap().name, "Acme");

        let flat = FetchResult::new(200, json!({"name": "Acme"}));
        assert_eq!(flat.record::<Named>().unwrap().name, "Acme");
    }

    #[test]
    fn unexpected_success_shape_is_a_schema_failure() {
        let result = FetchResult::new(200, json!({"status": true, "data": {"title": 1}}));
        assert!(matches!(result.record::<Named>(), Err(ApiFailure::Schema(_))));
    }
}
