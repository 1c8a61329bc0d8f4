//! # jsp_core
//!
//! Session and enrollment synchronization for the JSP learner dashboard.
//!
//! The crate owns the authentication token, decorates requests with it, and
//! keeps the learner's derived collections (followed courses, catalog, quiz
//! roster, schedule) consistent with the backend. Collections are never
//! patched locally: after every mutation they are reloaded wholesale.
//!
//! # Public API
//!
//! - [`session::SessionManager`]: login, logout, current user, restore
//! - [`enrollment::EnrollmentController`]: my courses vs. catalog, subscribe/unsubscribe
//! - [`quiz::QuizRosterController`]: quiz catalog and attempt lifecycle
//! - [`schedule::ScheduleController`]: personal event schedule
//! - [`http::HttpClient`] over a [`http::Transport`], with a [`token_store::TokenStore`]

pub mod config;
pub mod enrollment;
pub mod http;
pub mod models;
pub mod quiz;
pub mod schedule;
pub mod session;
pub mod token_store;

#[cfg(test)]
mod test_support;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use config::{ClientConfig, ConfigError, Endpoints};
pub use enrollment::{CourseCollections, CourseTab, EnrollmentController, EnrollmentError};
pub use http::{ClientError, HttpClient};
pub use quiz::{AttemptHandle, QuizError, QuizRosterController, RosterState};
pub use schedule::{ScheduleController, ScheduleError};
pub use session::{Session, SessionError, SessionManager, SessionState};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// State guards are never held across an `.await`, so a poisoned lock only
/// means a panic elsewhere; the data itself is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
