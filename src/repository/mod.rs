//! One generic repository covers every managed entity. Each entity type
//! describes its endpoint and wire shapes through [`Resource`]; the
//! repository maps list/get/create/update/delete onto REST calls and hands
//! back the raw [`FetchResult`] for the caller to classify.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use crate::api::{ApiClient, FetchResult};
use crate::error::ApiFailure;
use crate::types::Action;
use crate::validation::Validate;

pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    type Create: Serialize + Validate + Send + Sync;
    type Update: Serialize + Validate + Send + Sync;

    const SINGULAR: &'static str;
    const PLURAL: &'static str;
    /// Collection endpoint; records live at `{PATH}/{id}`
    const PATH: &'static str;
    /// Entity-specific keys a list body may nest the collection under
    const COLLECTION_KEYS: &'static [&'static str];
    /// Query parameters the list endpoint accepts
    const LIST_FILTERS: &'static [&'static str] = &[];

    fn create_path() -> String {
        Self::PATH.to_string()
    }

    /// `{PATH}/{id}` with the id percent-encoded as a single path segment.
    fn record_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, encode_segment(id.trim()))
    }

    fn fallback_message(action: Action) -> String {
        action.fallback_message(Self::SINGULAR, Self::PLURAL)
    }

    fn id(&self) -> &str;

    fn label(&self) -> &str;
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{resource} list does not accept filter '{filter}'")]
pub struct UnsupportedFilter {
    pub resource: &'static str,
    pub filter: String,
}

#[derive(Debug, Clone)]
pub struct Repository<R> {
    api: ApiClient,
    _phantom: PhantomData<R>,
}

impl<R: Resource> Repository<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _phantom: PhantomData,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn list(&self, token: &str) -> FetchResult {
        self.api.get(R::PATH, Some(token)).await
    }

    pub async fn list_filtered(
        &self,
        token: &str,
        filters: &[(&str, &str)],
    ) -> Result<FetchResult, UnsupportedFilter> {
        if let Some((key, _)) = filters.iter().find(|(k, _)| !R::LIST_FILTERS.contains(k)) {
            return Err(UnsupportedFilter {
                resource: R::PLURAL,
                filter: key.to_string(),
            });
        }

        let applied: Vec<&(&str, &str)> = filters.iter().filter(|(_, v)| !v.is_empty()).collect();
        if applied.is_empty() {
            return Ok(self.list(token).await);
        }

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in applied {
            query.append_pair(key, value);
        }
        let path = format!("{}?{}", R::PATH, query.finish());
        Ok(self.api.get(&path, Some(token)).await)
    }

    pub async fn get(&self, token: &str, id: &str) -> FetchResult {
        self.api.get(&R::record_path(id), Some(token)).await
    }

    pub async fn create(&self, token: &str, payload: &R::Create) -> FetchResult {
        self.api.post(&R::create_path(), Some(token), payload).await
    }

    pub async fn update(&self, token: &str, id: &str, payload: &R::Update) -> FetchResult {
        self.api.put(&R::record_path(id), Some(token), payload).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> FetchResult {
        self.api.delete(&R::record_path(id), Some(token)).await
    }

    /// List and decode, normalizing whichever collection shape came back.
    pub async fn fetch_all(&self, token: &str) -> Result<Vec<R>, ApiFailure> {
        self.list(token).await.collection(R::COLLECTION_KEYS)
    }

    pub async fn fetch_one(&self, token: &str, id: &str) -> Result<R, ApiFailure> {
        self.get(token, id).await.record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdminUser, Department, Role};
    use url::Url;

    fn repo<R: Resource>() -> Repository<R> {
        Repository::new(ApiClient::new(Url::parse("http://127.0.0.1:1").unwrap()))
    }

    #[test]
    fn record_ids_cannot_escape_their_segment() {
        assert_eq!(Role::record_path("../users?x=1#y"), "/api/roles/..%2Fusers%3Fx%3D1%23y");
        assert_eq!(Role::record_path("a b"), "/api/roles/a%20b");
    }

    #[test]
    fn paths() {
        assert_eq!(Role::record_path(" r1 "), "/api/roles/r1");
        assert_eq!(Role::record_path("42"), "/api/roles/42");
        assert_eq!(AdminUser::create_path(), "/api/admin/users/create");
        assert_eq!(Department::create_path(), "/api/departments");
        assert_eq!(Role::fallback_message(Action::Delete), "Failed to delete role");
    }

    #[tokio::test]
    async fn unknown_filter_is_refused_before_any_request() {
        let err = repo::<Role>()
            .list_filtered("t", &[("organisationId", "o1")])
            .await
            .unwrap_err();
        assert_eq!(err.filter, "organisationId");
    }
}
