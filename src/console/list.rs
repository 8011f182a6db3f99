use serde::Serialize;

use super::ViewScope;
use crate::api::FetchResult;
use crate::error::ApiFailure;
use crate::repository::{Repository, Resource};
use crate::types::Action;
use crate::validation::{FieldErrors, Validate};

/// Explicit answer to "really delete?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mutation<R> {
    pub action: Action,
    /// Record echoed back by the server, when it sent one
    pub record: Option<R>,
    pub message: Option<String>,
    /// The follow-up refetch failed; the cached list predates the mutation
    pub stale: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("{0}")]
    Invalid(FieldErrors),

    #[error("{message}")]
    Failed { failure: ApiFailure, message: String },

    #[error("deletion was not confirmed")]
    NotConfirmed,
}

impl MutationError {
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            MutationError::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Client-side copy of one entity collection.
///
/// The server stays the source of truth: every successful mutation is
/// followed by a refetch, and a failed mutation leaves the cache as it was.
#[derive(Debug)]
pub struct EntityList<R: Resource> {
    repo: Repository<R>,
    records: Vec<R>,
    filters: Vec<(String, String)>,
    loaded: bool,
    scope: ViewScope,
}

impl<R: Resource> EntityList<R> {
    pub fn new(repo: Repository<R>) -> Self {
        Self {
            repo,
            records: Vec::new(),
            filters: Vec::new(),
            loaded: false,
            scope: ViewScope::new(),
        }
    }

    /// Restrict reloads to records matching `key=value` (e.g. departments
    /// of one organisation).
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    pub fn scope(&self) -> ViewScope {
        self.scope.clone()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub async fn reload(&mut self, token: &str) -> Result<(), ApiFailure> {
        let result = if self.filters.is_empty() {
            self.repo.list(token).await
        } else {
            let filters: Vec<(&str, &str)> = self
                .filters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            self.repo
                .list_filtered(token, &filters)
                .await
                .map_err(|e| ApiFailure::schema(e.to_string()))?
        };

        let records = result.collection::<R>(R::COLLECTION_KEYS).map_err(|failure| {
            tracing::warn!(resource = R::PLURAL, %failure, "list load failed");
            failure
        })?;

        if let Some(records) = self.scope.keep(records) {
            self.records = records;
            self.loaded = true;
        }
        Ok(())
    }

    pub async fn create(&mut self, token: &str, payload: &R::Create) -> Result<Mutation<R>, MutationError> {
        payload.validate().map_err(MutationError::Invalid)?;
        let result = self.repo.create(token, payload).await;
        self.finish(Action::Create, token, result).await
    }

    pub async fn update(
        &mut self,
        token: &str,
        id: &str,
        payload: &R::Update,
    ) -> Result<Mutation<R>, MutationError> {
        payload.validate().map_err(MutationError::Invalid)?;
        let result = self.repo.update(token, id, payload).await;
        self.finish(Action::Update, token, result).await
    }

    pub async fn delete(
        &mut self,
        token: &str,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<Mutation<R>, MutationError> {
        if confirmation != Confirmation::Confirmed {
            return Err(MutationError::NotConfirmed);
        }
        let result = self.repo.delete(token, id).await;
        self.finish(Action::Delete, token, result).await
    }

    async fn finish(
        &mut self,
        action: Action,
        token: &str,
        result: FetchResult,
    ) -> Result<Mutation<R>, MutationError> {
        if let Some(failure) = result.failure() {
            let message = failure.user_message(&R::fallback_message(action));
            tracing::warn!(resource = R::SINGULAR, ?action, %failure, "mutation failed");
            return Err(MutationError::Failed { failure, message });
        }

        let record = match action {
            Action::Delete => None,
            _ => result.record::<R>().ok(),
        };
        let message = result.message().map(str::to_string);

        let stale = match self.reload(token).await {
            Ok(()) => false,
            Err(failure) => {
                tracing::warn!(resource = R::PLURAL, %failure, "refetch after mutation failed");
                true
            }
        };

        Ok(Mutation {
            action,
            record,
            message,
            stale,
        })
    }
}
