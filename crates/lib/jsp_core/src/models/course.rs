//! Courses offered in the catalog.

use serde::{Deserialize, Serialize};

use super::{RawPerson, non_empty};

/// Wire shape of a course `type`: a plain string or a `{ libelle }` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCourseType {
    Name(String),
    Label {
        #[serde(default)]
        libelle: Option<String>,
    },
}

impl RawCourseType {
    fn into_label(self) -> Option<String> {
        match self {
            RawCourseType::Name(name) => non_empty(Some(name)),
            RawCourseType::Label { libelle } => non_empty(libelle),
        }
    }
}

/// Wire shape of a course.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCourse {
    pub id: i64,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub course_type: Option<RawCourseType>,
    #[serde(default)]
    pub formateur: Option<RawPerson>,
    #[serde(default)]
    pub fichier: Option<String>,
}

/// A course as the dashboard displays it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub titre: String,
    pub description: Option<String>,
    pub type_label: Option<String>,
    pub formateur: Option<String>,
    pub fichier: Option<String>,
}

impl Course {
    /// Name under which the course material is saved.
    pub fn download_file_name(&self) -> String {
        self.fichier
            .clone()
            .unwrap_or_else(|| format!("cours-{}.pdf", self.id))
    }
}

impl From<RawCourse> for Course {
    fn from(raw: RawCourse) -> Self {
        Self {
            id: raw.id,
            titre: raw.titre.unwrap_or_default(),
            description: non_empty(raw.description),
            type_label: raw.course_type.and_then(RawCourseType::into_label),
            formateur: raw.formateur.as_ref().and_then(RawPerson::display_name),
            fichier: non_empty(raw.fichier),
        }
    }
}
