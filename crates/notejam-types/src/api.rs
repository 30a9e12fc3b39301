use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field-level validation errors, keyed by form field name. Ordered map so
/// error rendering is deterministic.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

// -- Forms --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub repeat_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigninForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteForm {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub pad_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PadForm {
    pub name: String,
}

// -- Flash messages --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

/// One-time status message carried across a redirect and shown on the next
/// rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: FlashLevel::Error, message: message.into() }
    }
}

// -- Views --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteView {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub pad_id: Option<Uuid>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// `GET /notes` — the user's notes plus their pads (sidebar data).
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteListView {
    pub notes: Vec<NoteView>,
    pub pads: Vec<PadView>,
    pub flash: Option<Flash>,
}

/// `GET /notes/{note_id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteDetailView {
    pub note: NoteView,
    pub pads: Vec<PadView>,
    pub flash: Option<Flash>,
}

/// `GET /pads/{pad_id}/notes` — one pad with its notes.
#[derive(Debug, Serialize, Deserialize)]
pub struct PadNotesView {
    pub pad: PadView,
    pub notes: Vec<NoteView>,
    pub pads: Vec<PadView>,
    pub flash: Option<Flash>,
}

/// Empty sign-in / sign-up form render.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthFormView {
    pub flash: Option<Flash>,
}

/// Note create/edit form render. `note` is populated when editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct NoteFormView {
    pub note: Option<NoteView>,
    pub pads: Vec<PadView>,
    pub flash: Option<Flash>,
}

/// Pad create/edit form render.
#[derive(Debug, Serialize, Deserialize)]
pub struct PadFormView {
    pub pad: Option<PadView>,
    pub flash: Option<Flash>,
}

/// Delete confirmation prompt rendered on GET; nothing is mutated until the
/// confirmed POST arrives.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteView {
    pub note: NoteView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePadView {
    pub pad: PadView,
}

/// Body of a 422 response: the form re-render payload with errors attached.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub errors: FieldErrors,
}
