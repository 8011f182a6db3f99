use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key the token is persisted under
    pub storage_key: String,
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login_path: String,
    pub protected_prefix: String,
    pub landing_path: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HOME environment variable not set")]
    NoHome,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("CONSOLE_API_URL") {
            self.api.base_url = v.trim().to_string();
        }
        if let Ok(v) = env::var("CONSOLE_LOG_REQUESTS") {
            self.api.log_requests = v.parse().unwrap_or(self.api.log_requests);
        }

        if let Ok(v) = env::var("CONSOLE_CONFIG_DIR") {
            self.session.config_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("CONSOLE_TOKEN_KEY") {
            self.session.storage_key = v;
        }

        if let Ok(v) = env::var("CONSOLE_LOGIN_PATH") {
            self.routes.login_path = v;
        }
        if let Ok(v) = env::var("CONSOLE_PROTECTED_PREFIX") {
            self.routes.protected_prefix = v;
        }
        if let Ok(v) = env::var("CONSOLE_LANDING_PATH") {
            self.routes.landing_path = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                log_requests: true,
            },
            session: SessionConfig::default(),
            routes: RouteConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com".to_string(),
                log_requests: true,
            },
            session: SessionConfig::default(),
            routes: RouteConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://api.example.com".to_string(),
                log_requests: false,
            },
            session: SessionConfig::default(),
            routes: RouteConfig::default(),
        }
    }

    /// Parsed API origin; all endpoint paths are joined onto it.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_base_url(&self.api.base_url)
    }

    /// Directory holding the persisted session, created on demand.
    pub fn config_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.session.config_dir {
            return Ok(dir.clone());
        }
        let home = env::var("HOME").map_err(|_| ConfigError::NoHome)?;
        Ok(PathBuf::from(home).join(".config").join("org-console"))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "token".to_string(),
            config_dir: None,
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            protected_prefix: "/authenticated".to_string(),
            landing_path: "/authenticated/dashboard".to_string(),
        }
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.api.log_requests);
        assert_eq!(config.session.storage_key, "token");
        assert_eq!(config.routes.login_path, "/auth/login");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.api.log_requests);
        assert_eq!(config.routes.landing_path, "/authenticated/dashboard");
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("CONSOLE_API_URL", Some("http://127.0.0.1:9999 ")),
                ("CONSOLE_LOG_REQUESTS", Some("true")),
                ("CONSOLE_CONFIG_DIR", Some("/tmp/org-console-test")),
            ],
            || {
                let config = AppConfig::from_env();
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.api.base_url, "http://127.0.0.1:9999");
                assert!(config.api.log_requests);
                assert_eq!(
                    config.config_dir().unwrap(),
                    PathBuf::from("/tmp/org-console-test")
                );
            },
        );
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:ops@example.com").is_err());
        assert!(parse_base_url("https://api.example.com").is_ok());
    }
}
