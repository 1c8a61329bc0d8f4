//! Followed courses vs. the full catalog, kept in sync by reloading.
//!
//! Subscribe and unsubscribe never patch the held collections. A successful
//! mutation is followed by a full [`EnrollmentController::load_all`], and the
//! caller only gets control back once both collections are fresh. A course is
//! enrolled iff its id is in the last loaded `mine` collection.

use std::fmt;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::http::ClientError;
use crate::lock;
use crate::models::{Course, RawCourse};
use crate::session::SessionManager;

/// Catalog of every course.
pub const CATALOG_PATH: &str = "/cours";

pub const LOAD_COURSES_ERROR: &str = "Erreur lors du chargement des cours";
pub const SUBSCRIBE_ERROR: &str = "Erreur lors de l'inscription";
pub const UNSUBSCRIBE_ERROR: &str = "Erreur lors de la désinscription";

/// `POST` subscribes, `DELETE` unsubscribes.
pub fn follow_path(course_id: i64) -> String {
    format!("/cours/{course_id}/suivre")
}

/// True iff `course` is in `mine`, compared by id.
pub fn is_enrolled(course: &Course, mine: &[Course]) -> bool {
    mine.iter().any(|c| c.id == course.id)
}

/// The two derived collections, always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseCollections {
    pub mine: Vec<Course>,
    pub catalog: Vec<Course>,
}

impl CourseCollections {
    pub fn is_enrolled(&self, course: &Course) -> bool {
        is_enrolled(course, &self.mine)
    }

    pub fn courses(&self, tab: CourseTab) -> &[Course] {
        match tab {
            CourseTab::Mine => &self.mine,
            CourseTab::All => &self.catalog,
        }
    }

    pub fn count(&self, tab: CourseTab) -> usize {
        self.courses(tab).len()
    }
}

/// Which collection the course list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseTab {
    #[default]
    Mine,
    All,
}

/// Enrollment errors. Messages are ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("Session expired")]
    Unauthorized,

    #[error("Loading courses failed: {0}")]
    Load(String),

    #[error("Subscribing to course {course_id} failed: {message}")]
    Subscribe { course_id: i64, message: String },

    #[error("Unsubscribing from course {course_id} failed: {message}")]
    Unsubscribe { course_id: i64, message: String },
}

impl EnrollmentError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EnrollmentError::Unauthorized)
    }

    pub fn user_message(&self) -> String {
        match self {
            EnrollmentError::Unauthorized => crate::http::SESSION_EXPIRED_MESSAGE.to_string(),
            EnrollmentError::Load(message)
            | EnrollmentError::Subscribe { message, .. }
            | EnrollmentError::Unsubscribe { message, .. } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Subscribe,
    Unsubscribe,
}

impl Mutation {
    fn fallback(self) -> &'static str {
        match self {
            Mutation::Subscribe => SUBSCRIBE_ERROR,
            Mutation::Unsubscribe => UNSUBSCRIBE_ERROR,
        }
    }

    fn error(self, course_id: i64, message: String) -> EnrollmentError {
        match self {
            Mutation::Subscribe => EnrollmentError::Subscribe { course_id, message },
            Mutation::Unsubscribe => EnrollmentError::Unsubscribe { course_id, message },
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Subscribe => f.write_str("subscribe"),
            Mutation::Unsubscribe => f.write_str("unsubscribe"),
        }
    }
}

#[derive(Debug, Default)]
struct EnrollmentState {
    collections: CourseCollections,
    /// Inline, retryable load error.
    error: Option<String>,
    tab: CourseTab,
}

/// Loads and reconciles the learner's courses.
pub struct EnrollmentController {
    session: Arc<SessionManager>,
    state: Mutex<EnrollmentState>,
}

impl EnrollmentController {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            state: Mutex::new(EnrollmentState::default()),
        }
    }

    /// Fetch "my courses" and the catalog together.
    ///
    /// Both must succeed for the held collections to be replaced. On any
    /// failure the previous collections stay and the error is kept for
    /// inline display. An unauthorized half is reported as
    /// [`EnrollmentError::Unauthorized`] and never shown inline; otherwise,
    /// when both fetches fail, the "my courses" failure is the one reported.
    ///
    /// Overlapping loads are not serialized: the one that completes last
    /// wins, and it always installs a pair fetched by the same call.
    pub async fn load_all(&self) -> Result<CourseCollections, EnrollmentError> {
        let client = self.session.client();
        let (mine, catalog) = tokio::join!(
            self.session.my_courses(),
            client.get_list::<RawCourse>(CATALOG_PATH)
        );
        let catalog = self
            .session
            .observe(catalog)
            .map(|raw| raw.into_iter().map(Course::from).collect::<Vec<_>>());

        match (mine, catalog) {
            (Ok(mine), Ok(catalog)) => {
                let fresh = CourseCollections { mine, catalog };
                let mut state = lock(&self.state);
                state.collections = fresh.clone();
                state.error = None;
                info!(
                    mine = fresh.mine.len(),
                    catalog = fresh.catalog.len(),
                    "courses reloaded"
                );
                Ok(fresh)
            }
            // Either half rejecting the session wins over any other failure.
            (Err(ClientError::Unauthorized), _) | (_, Err(ClientError::Unauthorized)) => {
                Err(EnrollmentError::Unauthorized)
            }
            (Err(e), _) | (_, Err(e)) => Err(self.load_failed(e)),
        }
    }

    /// Follow a course, then reload both collections.
    pub async fn subscribe(&self, course_id: i64) -> Result<CourseCollections, EnrollmentError> {
        self.apply(course_id, Mutation::Subscribe).await
    }

    /// Stop following a course, then reload both collections.
    pub async fn unsubscribe(&self, course_id: i64) -> Result<CourseCollections, EnrollmentError> {
        self.apply(course_id, Mutation::Unsubscribe).await
    }

    async fn apply(
        &self,
        course_id: i64,
        mutation: Mutation,
    ) -> Result<CourseCollections, EnrollmentError> {
        let path = follow_path(course_id);
        let client = self.session.client();
        let result = match mutation {
            Mutation::Subscribe => client.post(&path).await,
            Mutation::Unsubscribe => client.delete(&path).await,
        };

        if let Err(e) = self.session.observe(result) {
            if e.is_unauthorized() {
                return Err(EnrollmentError::Unauthorized);
            }
            warn!(course_id, "{mutation} failed: {e}");
            return Err(mutation.error(course_id, e.user_message(mutation.fallback())));
        }

        info!(course_id, "{mutation} accepted, reloading courses");
        self.load_all().await
    }

    fn load_failed(&self, e: ClientError) -> EnrollmentError {
        if e.is_unauthorized() {
            return EnrollmentError::Unauthorized;
        }
        warn!("loading courses failed: {e}");
        let message = e.user_message(LOAD_COURSES_ERROR);
        lock(&self.state).error = Some(message.clone());
        EnrollmentError::Load(message)
    }

    /// Snapshot of the last successfully loaded collections.
    pub fn collections(&self) -> CourseCollections {
        lock(&self.state).collections.clone()
    }

    /// Inline error from the last failed load, cleared by a successful one.
    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub fn is_enrolled(&self, course: &Course) -> bool {
        lock(&self.state).collections.is_enrolled(course)
    }

    pub fn tab(&self) -> CourseTab {
        lock(&self.state).tab
    }

    pub fn set_tab(&self, tab: CourseTab) {
        lock(&self.state).tab = tab;
    }

    pub fn tab_count(&self, tab: CourseTab) -> usize {
        lock(&self.state).collections.count(tab)
    }

    /// Courses of the active tab.
    pub fn visible_courses(&self) -> Vec<Course> {
        let state = lock(&self.state);
        state.collections.courses(state.tab).to_vec()
    }
}
