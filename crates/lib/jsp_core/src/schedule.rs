//! Personal event schedule.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

use crate::lock;
use crate::models::Event;
use crate::session::SessionManager;

pub const LOAD_EVENTS_ERROR: &str = "Erreur lors du chargement des événements";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Session expired")]
    Unauthorized,

    #[error("Loading events failed: {0}")]
    Load(String),
}

#[derive(Debug, Default)]
struct Schedule {
    events: Vec<Event>,
    error: Option<String>,
}

/// Holds the last successfully loaded schedule.
pub struct ScheduleController {
    session: Arc<SessionManager>,
    schedule: Mutex<Schedule>,
}

impl ScheduleController {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            schedule: Mutex::new(Schedule::default()),
        }
    }

    pub async fn load(&self) -> Result<Vec<Event>, ScheduleError> {
        match self.session.my_events().await {
            Ok(events) => {
                let mut schedule = lock(&self.schedule);
                schedule.events = events.clone();
                schedule.error = None;
                debug!(count = events.len(), "schedule loaded");
                Ok(events)
            }
            Err(e) if e.is_unauthorized() => Err(ScheduleError::Unauthorized),
            Err(e) => {
                warn!("loading events failed: {e}");
                let message = e.user_message(LOAD_EVENTS_ERROR);
                lock(&self.schedule).error = Some(message.clone());
                Err(ScheduleError::Load(message))
            }
        }
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.schedule).events.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.schedule).error.clone()
    }
}
