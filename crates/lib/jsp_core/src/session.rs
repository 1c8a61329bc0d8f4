//! Session lifecycle: login, logout, current-user resolution.
//!
//! [`SessionManager`] is the single source of truth for "is authenticated".
//! Lifecycle:
//!
//! ```text
//! LoggedOut --(login | restore)--> LoggedIn --(logout | any 401)--> LoggedOut
//! ```
//!
//! There is no refresh flow. Any response classified as unauthorized, from
//! any component, must go through [`SessionManager::observe`], which ends the
//! session.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ClientConfig, Endpoints};
use crate::http::{ClientError, HttpClient};
use crate::lock;
use crate::models::{Course, Event, RawCourse, RawEvent, RawUser, User};

/// Shown when the backend rejects the credentials.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Identifiants invalides";

/// Fallback for other login failures.
pub const LOGIN_ERROR_MESSAGE: &str = "Erreur de connexion";

/// Shown when the form is submitted with an empty field.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Veuillez saisir votre email et votre mot de passe.";

/// Authenticated identity and credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing email or password")]
    MissingCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SessionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SessionError::Client(ClientError::Unauthorized))
    }

    /// Text for the login form.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::MissingCredentials => MISSING_CREDENTIALS_MESSAGE.to_string(),
            SessionError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            SessionError::Client(e) => e.user_message(LOGIN_ERROR_MESSAGE),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: RawUser,
}

/// Owns the session and funnels authorization failures into logout.
pub struct SessionManager {
    client: HttpClient,
    endpoints: Endpoints,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(client: HttpClient, endpoints: Endpoints) -> Self {
        Self {
            client,
            endpoints,
            session: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(HttpClient::from_config(config), config.endpoints.clone())
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// True iff a token is stored. Presence only: an expired token still
    /// counts until a request proves otherwise.
    pub fn is_authenticated(&self) -> bool {
        self.client.token_store().read().is_some()
    }

    /// Same presence rule as [`Self::is_authenticated`]. A restored token
    /// whose user could not be resolved yet is still `LoggedIn`.
    pub fn state(&self) -> SessionState {
        if self.is_authenticated() {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    /// Snapshot of the resolved session. `None` until the user behind the
    /// token has been fetched by `login`, `current_user` or `restore`.
    pub fn session(&self) -> Option<Session> {
        lock(&self.session).clone()
    }

    /// Authenticate and persist the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.trim().is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let resp: LoginResponse = self
            .client
            .post_json(&self.endpoints.login, &LoginRequest { email, password })
            .await
            .map_err(|e| match e {
                ClientError::Unauthorized => SessionError::InvalidCredentials,
                other => SessionError::Client(other),
            })?;

        self.client.token_store().save(&resp.token);
        let session = Session {
            token: resp.token,
            user: resp.user.into(),
        };
        *lock(&self.session) = Some(session.clone());

        info!(user_id = session.user.id, "logged in");
        Ok(session)
    }

    /// Resolve the user behind the stored token.
    pub async fn current_user(&self) -> Result<User, SessionError> {
        let token = self.require_token()?;
        let raw: RawUser = self
            .observe(self.client.get_json(&self.endpoints.current_user).await)?;
        let user = User::from(raw);

        *lock(&self.session) = Some(Session {
            token,
            user: user.clone(),
        });
        Ok(user)
    }

    /// Re-establish the session from a token persisted by an earlier run.
    ///
    /// A rejected token is cleared. Any other failure keeps the token for
    /// the next attempt and leaves the session logged out.
    pub async fn restore(&self) -> Option<Session> {
        if !self.is_authenticated() {
            return None;
        }
        match self.current_user().await {
            Ok(_) => self.session(),
            Err(e) if e.is_unauthorized() => {
                info!("stored token was rejected");
                None
            }
            Err(e) => {
                warn!("could not resolve current user: {e}");
                None
            }
        }
    }

    /// End the session locally. Completes before returning; no backend call.
    pub fn logout(&self) {
        self.client.token_store().clear();
        if lock(&self.session).take().is_some() {
            info!("logged out");
        }
    }

    /// Courses the current user follows.
    pub async fn my_courses(&self) -> Result<Vec<Course>, ClientError> {
        self.require_token()?;
        let raw: Vec<RawCourse> = self
            .observe(self.client.get_list(&self.endpoints.my_courses).await)?;
        Ok(raw.into_iter().map(Course::from).collect())
    }

    /// Events on the current user's schedule.
    pub async fn my_events(&self) -> Result<Vec<Event>, ClientError> {
        self.require_token()?;
        let raw: Vec<RawEvent> = self
            .observe(self.client.get_list(&self.endpoints.my_events).await)?;
        Ok(raw.into_iter().map(Event::from).collect())
    }

    /// Pass a result through; an unauthorized failure ends the session.
    pub fn observe<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(ClientError::Unauthorized) = &result {
            warn!("session rejected by backend");
            self.logout();
        }
        result
    }

    /// Session-scoped reads cannot succeed without a token.
    fn require_token(&self) -> Result<String, ClientError> {
        match self.client.token_store().read() {
            Some(token) => Ok(token),
            None => self.observe(Err(ClientError::Unauthorized)),
        }
    }
}
