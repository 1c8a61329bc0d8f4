//! Domain models.
//!
//! Each submodule has a wire shape (`Raw*`, deserialized straight from the
//! backend) and a canonical shape consumed by the rest of the crate. The
//! backend is loose about field shapes and names, so normalization happens
//! exactly once, in the `From<Raw*>` conversions.

pub mod course;
pub mod event;
pub mod quiz;
pub mod user;

pub use course::{Course, RawCourse};
pub use event::{Event, RawEvent};
pub use quiz::{Quiz, RawQuiz};
pub use user::{Grade, RawUser, User};

use serde::Deserialize;

/// Identifier that the backend sends either as a number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    /// String form, `None` when the id is an empty string.
    pub fn into_string(self) -> Option<String> {
        match self {
            RawId::Number(n) => Some(n.to_string()),
            RawId::Text(s) if s.trim().is_empty() => None,
            RawId::Text(s) => Some(s),
        }
    }
}

/// A trainer reference: either a preformatted name or a person object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPerson {
    Name(String),
    Person {
        #[serde(default)]
        nom: Option<String>,
        #[serde(default)]
        prenom: Option<String>,
    },
}

impl RawPerson {
    /// Display name, `"nom prenom"` for person objects. `None` when blank.
    pub fn display_name(&self) -> Option<String> {
        let name = match self {
            RawPerson::Name(name) => name.trim().to_string(),
            RawPerson::Person { nom, prenom } => format!(
                "{} {}",
                nom.as_deref().unwrap_or_default(),
                prenom.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string(),
        };
        non_empty(Some(name))
    }
}

/// Treat blank strings like missing ones, the way the dashboard's `||`
/// fallbacks do.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// First non-blank candidate, in order.
pub(crate) fn first_present<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates.into_iter().find_map(non_empty)
}
