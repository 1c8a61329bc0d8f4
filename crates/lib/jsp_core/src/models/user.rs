//! Learner identity.

use serde::{Deserialize, Serialize};

/// Structured grade as sent by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grade {
    #[serde(default)]
    pub titre: Option<String>,
}

/// Wire shape of `grade`: a plain label or a [`Grade`] object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGrade {
    Label(String),
    Titled(Grade),
}

impl RawGrade {
    fn into_label(self) -> Option<String> {
        match self {
            RawGrade::Label(label) => Some(label),
            RawGrade::Titled(grade) => grade.titre,
        }
    }
}

/// Wire shape of a user. Names and email may be missing or `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUser {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub grade: Option<RawGrade>,
}

/// Immutable snapshot of the signed-in learner.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    /// Grade label, whichever shape the backend used.
    pub grade: Option<String>,
}

impl User {
    /// `"prenom nom"`.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom).trim().to_string()
    }

    /// Dashboard header line.
    pub fn greeting(&self) -> String {
        format!("Bienvenue, {} !", self.display_name())
    }
}

impl From<RawUser> for User {
    fn from(raw: RawUser) -> Self {
        Self {
            id: raw.id,
            nom: raw.nom.unwrap_or_default(),
            prenom: raw.prenom.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            grade: super::non_empty(raw.grade.and_then(RawGrade::into_label)),
        }
    }
}
