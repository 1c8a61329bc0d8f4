//! Quiz catalog entries.

use serde::{Deserialize, Serialize};

use super::{first_present, non_empty};

/// Wire shape of a quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuiz {
    pub id: i64,
    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Any JSON value; only positive numbers count.
    #[serde(default, rename = "nombreQuestions")]
    pub nombre_questions: Option<serde_json::Value>,
}

/// Positive counts only; fractions are truncated, anything else is unknown.
fn question_count(value: Option<serde_json::Value>) -> Option<u32> {
    let n = value?.as_f64()?;
    if !n.is_finite() || n < 1.0 {
        return None;
    }
    Some(n.min(f64::from(u32::MAX)) as u32)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Quiz {
    pub id: i64,
    /// `titre`, else `nom`, else `"Quiz #<id>"`.
    pub title: String,
    pub description: Option<String>,
    pub question_count: Option<u32>,
}

impl Quiz {
    /// `"1 question"` / `"N questions"`, nothing when the count is unknown.
    pub fn question_count_label(&self) -> Option<String> {
        match self.question_count {
            None | Some(0) => None,
            Some(1) => Some("1 question".to_string()),
            Some(n) => Some(format!("{n} questions")),
        }
    }
}

impl From<RawQuiz> for Quiz {
    fn from(raw: RawQuiz) -> Self {
        let title =
            first_present([raw.titre, raw.nom]).unwrap_or_else(|| format!("Quiz #{}", raw.id));
        Self {
            id: raw.id,
            title,
            description: non_empty(raw.description),
            question_count: question_count(raw.nombre_questions),
        }
    }
}
