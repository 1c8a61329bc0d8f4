use jsp_core::{ConfigError, EnrollmentError, QuizError, ScheduleError, SessionError};
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Non connecté, utilisez `jsp login`")]
    NotLoggedIn,

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("FlexiLogger::{:?}: {}", .0, .0)]
    FlexiLogger(#[from] flexi_logger::FlexiLoggerError),

    #[error("Config: {}", .0)]
    Config(#[from] ConfigError),

    #[error("{}", .0.user_message())]
    Session(#[from] SessionError),

    #[error("{}", .0.user_message())]
    Enrollment(#[from] EnrollmentError),

    #[error("{}", .0)]
    Quiz(#[from] QuizError),

    #[error("{}", .0)]
    Schedule(#[from] ScheduleError),
}

impl Error {
    /// The backend rejected the stored token; the session is already gone.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Error::Session(e) => e.is_unauthorized(),
            Error::Enrollment(e) => e.is_unauthorized(),
            Error::Quiz(e) => e.is_unauthorized(),
            Error::Schedule(e) => matches!(e, ScheduleError::Unauthorized),
            _ => false,
        }
    }
}
