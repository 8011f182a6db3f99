//! Route protection.
//!
//! [`RouteGuard::check`] is a pure function of token presence and the
//! current path. The shell interprets the returned [`Redirect`]; the guard
//! never navigates itself and performs no I/O.

use serde::Serialize;
use tokio::sync::watch;

use crate::config::RouteConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self { to: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    protected_prefix: String,
    landing_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(&RouteConfig::default())
    }
}

impl RouteGuard {
    pub fn new(routes: &RouteConfig) -> Self {
        Self {
            login_path: routes.login_path.clone(),
            protected_prefix: routes.protected_prefix.trim_end_matches('/').to_string(),
            landing_path: routes.landing_path.clone(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// The prefix itself or anything below it, matched on segment boundaries.
    pub fn is_protected(&self, path: &str) -> bool {
        match path.strip_prefix(self.protected_prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    pub fn check(&self, has_token: bool, path: &str) -> Option<Redirect> {
        if !has_token && self.is_protected(path) {
            return Some(Redirect::to(&self.login_path));
        }
        if has_token && path == self.login_path {
            return Some(Redirect::to(&self.landing_path));
        }
        None
    }

    /// Re-evaluate whenever the token or the path changes and return the
    /// first redirect produced. `None` once both sources are closed.
    pub async fn next_redirect(
        &self,
        tokens: &mut watch::Receiver<Option<String>>,
        paths: &mut watch::Receiver<String>,
    ) -> Option<Redirect> {
        let mut tokens_open = true;
        let mut paths_open = true;

        loop {
            let has_token = tokens.borrow_and_update().is_some();
            let path = paths.borrow_and_update().clone();
            if let Some(redirect) = self.check(has_token, &path) {
                tracing::debug!(from = %path, to = %redirect.to, "route guard redirect");
                return Some(redirect);
            }

            if !tokens_open && !paths_open {
                return None;
            }

            tokio::select! {
                changed = tokens.changed(), if tokens_open => {
                    tokens_open = changed.is_ok();
                }
                changed = paths.changed(), if paths_open => {
                    paths_open = changed.is_ok();
                }
            }
        }
    }
}
