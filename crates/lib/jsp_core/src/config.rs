//! Client configuration.

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::token_store::default_token_path;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Backend paths whose location is deployment-specific. The catalog,
/// enrollment and quiz paths are fixed by the backend and are not listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub login: String,
    pub current_user: String,
    pub my_courses: String,
    pub my_events: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".into(),
            current_user: "/auth/me".into(),
            my_courses: "/auth/me/cours".into(),
            my_events: "/auth/me/evenements".into(),
        }
    }
}

/// Everything needed to talk to one backend.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    /// File holding the session token.
    pub token_path: PathBuf,
    pub endpoints: Endpoints,
}

impl ClientConfig {
    /// Configuration for `base_url`, with the per-origin token file and
    /// default endpoints.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            token_path: default_token_path(&base_url),
            base_url,
            endpoints: Endpoints::default(),
        })
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                               |
    /// |-----------------------|---------------------------------------|
    /// | `JSP_API_URL`         | `http://localhost:8080/api`           |
    /// | `JSP_TOKEN_FILE`      | `<data dir>/jsp/<origin>/token`       |
    /// | `JSP_LOGIN_PATH`      | `/auth/login`                         |
    /// | `JSP_ME_PATH`         | `/auth/me`                            |
    /// | `JSP_MY_COURSES_PATH` | `/auth/me/cours`                      |
    /// | `JSP_MY_EVENTS_PATH`  | `/auth/me/evenements`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var("JSP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut config = Self::new(&url)?;

        if let Ok(path) = std::env::var("JSP_TOKEN_FILE")
            && !path.is_empty()
        {
            config.token_path = PathBuf::from(path);
        }

        let endpoints = &mut config.endpoints;
        for (var, slot) in [
            ("JSP_LOGIN_PATH", &mut endpoints.login),
            ("JSP_ME_PATH", &mut endpoints.current_user),
            ("JSP_MY_COURSES_PATH", &mut endpoints.my_courses),
            ("JSP_MY_EVENTS_PATH", &mut endpoints.my_events),
        ] {
            if let Ok(value) = std::env::var(var)
                && !value.is_empty()
            {
                *slot = value;
            }
        }

        Ok(config)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    Ok(url)
}
