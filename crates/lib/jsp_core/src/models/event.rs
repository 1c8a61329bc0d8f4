//! Personal schedule events.
//!
//! The events backend is inconsistent about naming: the same attribute may
//! arrive under a camelCase, snake_case or calendar-style key. Every alias is
//! captured in [`RawEvent`] and the first non-blank one wins, in the order
//! the fields are declared.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RawId, RawPerson, first_present};

/// Title shown when the backend sends neither `titre` nor `nom`.
pub const UNTITLED_EVENT: &str = "Événement sans titre";

/// Calendar color used when the event has no `couleur`.
pub const DEFAULT_EVENT_COLOR: &str = "#3788d8";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<RawId>,

    #[serde(default)]
    pub titre: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,

    #[serde(default, rename = "dateDebut")]
    pub date_debut_camel: Option<String>,
    #[serde(default)]
    pub date_debut: Option<String>,
    #[serde(default)]
    pub start: Option<String>,

    #[serde(default, rename = "dateFin")]
    pub date_fin_camel: Option<String>,
    #[serde(default)]
    pub date_fin: Option<String>,
    #[serde(default)]
    pub end: Option<String>,

    #[serde(default, rename = "allDay")]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub couleur: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub descriptif: Option<String>,
    #[serde(default)]
    pub lieu: Option<String>,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub formateur: Option<RawPerson>,
}

/// A schedule entry with every alias resolved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Start as sent by the backend (ISO-8601 in practice).
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: bool,
    pub color: String,
    pub description: Option<String>,
    pub lieu: Option<String>,
    pub formateur: Option<String>,
}

impl Event {
    /// Multi-line summary shown when an event is opened, blank parts skipped.
    pub fn details(&self) -> String {
        [
            self.description.as_ref().map(|d| format!("Description: {d}")),
            self.lieu.as_ref().map(|l| format!("Lieu: {l}")),
            self.formateur.as_ref().map(|f| format!("Formateur: {f}")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n")
    }
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        // Calendars key events by id, so a missing one still needs to be unique.
        let id = raw
            .id
            .and_then(RawId::into_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            id,
            title: first_present([raw.titre, raw.nom]).unwrap_or_else(|| UNTITLED_EVENT.to_string()),
            start: first_present([raw.date_debut_camel, raw.date_debut, raw.start]),
            end: first_present([raw.date_fin_camel, raw.date_fin, raw.end]),
            all_day: raw.all_day.unwrap_or(false),
            color: first_present([raw.couleur]).unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            description: first_present([raw.description, raw.descriptif]),
            lieu: first_present([raw.lieu, raw.adresse]),
            formateur: raw.formateur.as_ref().and_then(RawPerson::display_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value::<RawEvent>(value).unwrap().into()
    }

    #[test]
    fn snake_case_dates_resolve_when_alone() {
        let e = event(json!({
            "id": 3,
            "date_debut": "2026-03-02T09:00:00",
            "date_fin": "2026-03-02T12:00:00"
        }));
        assert_eq!(e.start.as_deref(), Some("2026-03-02T09:00:00"));
        assert_eq!(e.end.as_deref(), Some("2026-03-02T12:00:00"));
    }

    #[test]
    fn camel_case_dates_win_over_other_aliases() {
        let e = event(json!({
            "dateDebut": "A", "date_debut": "B", "start": "C",
            "dateFin": "X", "date_fin": "Y", "end": "Z"
        }));
        assert_eq!(e.start.as_deref(), Some("A"));
        assert_eq!(e.end.as_deref(), Some("X"));
    }

    #[test]
    fn calendar_style_dates_are_the_last_resort() {
        let e = event(json!({ "start": "C", "end": "Z", "date_debut": "" }));
        assert_eq!(e.start.as_deref(), Some("C"));
        assert_eq!(e.end.as_deref(), Some("Z"));
    }

    #[test]
    fn defaults_apply_to_sparse_events() {
        let e = event(json!({ "id": "abc" }));
        assert_eq!(e.id, "abc");
        assert_eq!(e.title, UNTITLED_EVENT);
        assert!(!e.all_day);
        assert_eq!(e.color, DEFAULT_EVENT_COLOR);
        assert!(e.start.is_none());
        assert_eq!(e.details(), "");
    }

    #[test]
    fn missing_ids_are_synthesized_and_distinct() {
        let a = event(json!({ "nom": "Manoeuvre" }));
        let b = event(json!({ "nom": "Manoeuvre" }));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(a.title, "Manoeuvre");
    }

    #[test]
    fn description_and_lieu_fall_back_to_alternate_keys() {
        let e = event(json!({
            "id": 1,
            "descriptif": "Exercice",
            "adresse": "Caserne Nord",
            "formateur": { "nom": "Martin", "prenom": "Julie" }
        }));
        assert_eq!(
            e.details(),
            "Description: Exercice\nLieu: Caserne Nord\nFormateur: Martin Julie"
        );
    }
}
