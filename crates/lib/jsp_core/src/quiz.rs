//! Quiz catalog and the handoff to the external attempt engine.
//!
//! ```text
//! Listing --select--> Attempting --complete--> Listing (+ one roster reload)
//!                     Attempting --cancel----> Listing (no reload)
//! ```
//!
//! Attempts never change the catalog entries seen here; the reload after a
//! completion only picks up whatever the backend now reports.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lock;
use crate::models::{Quiz, RawQuiz};
use crate::session::SessionManager;

pub const QUIZ_PATH: &str = "/quiz";

pub const LOAD_QUIZZES_ERROR: &str = "Erreur lors du chargement des quiz";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Session expired")]
    Unauthorized,

    #[error("Loading quizzes failed: {0}")]
    Load(String),

    #[error("Quiz {0} is already being attempted")]
    AttemptInProgress(i64),
}

impl QuizError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, QuizError::Unauthorized)
    }
}

/// What the attempt engine receives when a quiz is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptHandle {
    pub quiz_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RosterState {
    #[default]
    Listing,
    Attempting(AttemptHandle),
}

#[derive(Debug, Default)]
struct Roster {
    quizzes: Vec<Quiz>,
    error: Option<String>,
    state: RosterState,
}

/// Loads the quiz catalog and tracks the attempt lifecycle.
pub struct QuizRosterController {
    session: Arc<SessionManager>,
    roster: Mutex<Roster>,
}

impl QuizRosterController {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            roster: Mutex::new(Roster::default()),
        }
    }

    /// Fetch the quiz catalog, replacing the held roster on success.
    pub async fn load_roster(&self) -> Result<Vec<Quiz>, QuizError> {
        let result = self
            .session
            .observe(self.session.client().get_list::<RawQuiz>(QUIZ_PATH).await);

        match result {
            Ok(raw) => {
                let quizzes: Vec<Quiz> = raw.into_iter().map(Quiz::from).collect();
                let mut roster = lock(&self.roster);
                roster.quizzes = quizzes.clone();
                roster.error = None;
                debug!(count = quizzes.len(), "quiz roster loaded");
                Ok(quizzes)
            }
            Err(e) if e.is_unauthorized() => Err(QuizError::Unauthorized),
            Err(e) => {
                warn!("loading quizzes failed: {e}");
                let message = e.user_message(LOAD_QUIZZES_ERROR);
                lock(&self.roster).error = Some(message.clone());
                Err(QuizError::Load(message))
            }
        }
    }

    /// Hand `quiz` to the attempt engine.
    pub fn select_quiz(&self, quiz: &Quiz) -> Result<AttemptHandle, QuizError> {
        let mut roster = lock(&self.roster);
        if let RosterState::Attempting(current) = &roster.state {
            return Err(QuizError::AttemptInProgress(current.quiz_id));
        }
        let handle = AttemptHandle {
            quiz_id: quiz.id,
            title: quiz.title.clone(),
        };
        roster.state = RosterState::Attempting(handle.clone());
        info!(quiz_id = quiz.id, "quiz attempt started");
        Ok(handle)
    }

    /// The attempt engine reported completion: back to listing, then reload
    /// the roster once. Does nothing when no attempt is running.
    pub async fn on_attempt_complete(&self) -> Result<Vec<Quiz>, QuizError> {
        let finished = std::mem::take(&mut lock(&self.roster).state);
        match finished {
            RosterState::Attempting(handle) => {
                info!(quiz_id = handle.quiz_id, "quiz attempt completed");
                self.load_roster().await
            }
            RosterState::Listing => {
                debug!("completion signalled while listing, ignored");
                Ok(self.quizzes())
            }
        }
    }

    /// Leave the attempt without completing it. No reload.
    pub fn cancel_attempt(&self) {
        let mut roster = lock(&self.roster);
        if let RosterState::Attempting(handle) = &roster.state {
            info!(quiz_id = handle.quiz_id, "quiz attempt cancelled");
        }
        roster.state = RosterState::Listing;
    }

    pub fn state(&self) -> RosterState {
        lock(&self.roster).state.clone()
    }

    pub fn quizzes(&self) -> Vec<Quiz> {
        lock(&self.roster).quizzes.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.roster).error.clone()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::Endpoints;
    use crate::http::{HttpClient, Method};
    use crate::test_support::ScriptedTransport;
    use crate::token_store::MemoryTokenStore;

    fn controller(transport: &Arc<ScriptedTransport>) -> (Arc<SessionManager>, QuizRosterController) {
        let session = Arc::new(SessionManager::new(
            HttpClient::new(transport.clone(), Arc::new(MemoryTokenStore::with_token("tok"))),
            Endpoints::default(),
        ));
        (session.clone(), QuizRosterController::new(session))
    }

    #[tokio::test]
    async fn completion_returns_to_listing_and_reloads_once() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, QUIZ_PATH, 200, json!([{ "id": 9, "nom": "Incendie" }]));
        let (_, ctl) = controller(&transport);

        let quizzes = ctl.load_roster().await.unwrap();
        assert_eq!(quizzes[0].title, "Incendie");

        let handle = ctl.select_quiz(&quizzes[0]).unwrap();
        assert_eq!(handle.quiz_id, 9);
        assert_eq!(ctl.state(), RosterState::Attempting(handle));

        ctl.on_attempt_complete().await.unwrap();
        assert_eq!(ctl.state(), RosterState::Listing);
        assert_eq!(transport.count(Method::GET, QUIZ_PATH), 2);
    }

    #[tokio::test]
    async fn cancel_returns_to_listing_without_reload() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, QUIZ_PATH, 200, json!([{ "id": 9 }]));
        let (_, ctl) = controller(&transport);

        let quizzes = ctl.load_roster().await.unwrap();
        assert_eq!(quizzes[0].title, "Quiz #9");
        ctl.select_quiz(&quizzes[0]).unwrap();
        ctl.cancel_attempt();

        assert_eq!(ctl.state(), RosterState::Listing);
        assert_eq!(transport.count(Method::GET, QUIZ_PATH), 1);
    }

    #[tokio::test]
    async fn completion_while_listing_is_ignored() {
        let transport = ScriptedTransport::new();
        let (_, ctl) = controller(&transport);

        assert!(ctl.on_attempt_complete().await.unwrap().is_empty());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn selecting_during_an_attempt_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, QUIZ_PATH, 200, json!([{ "id": 1 }, { "id": 2 }]));
        let (_, ctl) = controller(&transport);
        let quizzes = ctl.load_roster().await.unwrap();

        ctl.select_quiz(&quizzes[0]).unwrap();
        assert_eq!(
            ctl.select_quiz(&quizzes[1]).unwrap_err(),
            QuizError::AttemptInProgress(1)
        );
    }

    #[tokio::test]
    async fn failed_reload_keeps_roster_and_sets_inline_error() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, QUIZ_PATH, 200, json!([{ "id": 1, "titre": "Secours" }]));
        transport.respond(Method::GET, QUIZ_PATH, 503, json!({ "message": "Maintenance" }));
        let (_, ctl) = controller(&transport);

        ctl.load_roster().await.unwrap();
        let err = ctl.load_roster().await.unwrap_err();
        assert_eq!(err, QuizError::Load("Maintenance".into()));
        assert_eq!(ctl.quizzes().len(), 1);
        assert_eq!(ctl.error().as_deref(), Some("Maintenance"));
    }

    #[tokio::test]
    async fn unauthorized_roster_ends_session() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::GET, QUIZ_PATH, 401, json!({}));
        let (session, ctl) = controller(&transport);

        assert!(ctl.load_roster().await.unwrap_err().is_unauthorized());
        assert!(!session.is_authenticated());
    }
}
