//! Presentation-side plumbing shared by every entity screen: the
//! [`Console`] context handed to views, list caches, view liveness, and the
//! concurrent loaders that fill form pickers.

pub mod list;
pub mod options;

pub use list::{Confirmation, EntityList, Mutation, MutationError};
pub use options::{load_client_form_options, load_user_form_options, ClientFormOptions, UserFormOptions};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::AuthFlow;
use crate::config::AppConfig;
use crate::guard::{Redirect, RouteGuard};
use crate::repository::{Repository, Resource};
use crate::session::{SessionError, SessionStore};

/// Context injected into views: API client, session and route guard.
#[derive(Debug, Clone)]
pub struct Console {
    api: ApiClient,
    session: SessionStore,
    guard: RouteGuard,
}

impl Console {
    pub fn new(api: ApiClient, session: SessionStore, guard: RouteGuard) -> Self {
        Self { api, session, guard }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        let api = ApiClient::from_config(config)?;
        let session = SessionStore::from_config(config)?;
        Ok(Self::new(api, session, RouteGuard::new(&config.routes)))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn repository<R: Resource>(&self) -> Repository<R> {
        Repository::new(self.api.clone())
    }

    pub fn list<R: Resource>(&self) -> EntityList<R> {
        EntityList::new(self.repository())
    }

    pub fn auth_flow(&self) -> AuthFlow<ApiClient> {
        AuthFlow::new(self.api.clone(), self.session.clone(), self.guard.landing_path())
    }

    /// Run the guard for a navigation to `path`. Returns the token to use
    /// (possibly empty on public paths) or the redirect the shell must follow.
    pub fn enter(&self, path: &str) -> Result<String, Redirect> {
        let token = self.session.token();
        match self.guard.check(token.is_some(), path) {
            Some(redirect) => Err(redirect),
            None => Ok(token.unwrap_or_default()),
        }
    }

    /// Logout: clear the stored token.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.session.clear()
    }
}

/// Liveness of a mounted view. Responses that resolve after the view is
/// closed are dropped instead of applied.
#[derive(Debug, Clone)]
pub struct ViewScope {
    alive: Arc<AtomicBool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// `Some(value)` while the view is live, `None` after it closed.
    pub fn keep<T>(&self, value: T) -> Option<T> {
        if self.is_live() {
            Some(value)
        } else {
            tracing::debug!("dropping response for closed view");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn console(token: Option<&str>) -> Console {
        let session = SessionStore::in_memory();
        session.set_token(token.map(str::to_string)).unwrap();
        Console::new(
            ApiClient::new(Url::parse("http://127.0.0.1:1").unwrap()),
            session,
            RouteGuard::default(),
        )
    }

    #[test]
    fn enter_protected_path_requires_token() {
        assert_eq!(
            console(None).enter("/authenticated/role"),
            Err(Redirect::to("/auth/login"))
        );
        assert_eq!(console(Some("t")).enter("/authenticated/role"), Ok("t".to_string()));
    }

    #[test]
    fn sign_out_clears_session() {
        let console = console(Some("t"));
        console.sign_out().unwrap();
        assert!(!console.session().is_authenticated());
        assert_eq!(console.enter("/auth/login"), Ok(String::new()));
    }

    #[test]
    fn closed_scope_drops_values() {
        let scope = ViewScope::new();
        let handle = scope.clone();
        assert_eq!(scope.keep(1), Some(1));
        handle.close();
        assert_eq!(scope.keep(2), None);
    }
}
