use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use notejam_db::models::NoteRow;
use notejam_db::NoteOrder;
use notejam_types::api::{
    DeleteNoteView, FieldErrors, Flash, NoteDetailView, NoteForm, NoteFormView, NoteListView,
    NoteView,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::flash;
use crate::forms::{push_error, validate_note};
use crate::pads::pad_view;
use crate::session::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub order: Option<String>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);
    let order = NoteOrder::parse(query.order.as_deref());

    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let uid = user.id.to_string();
    let (notes, pads) = tokio::task::spawn_blocking(move || {
        let notes = db.db.list_notes(&uid, order)?;
        let pads = db.db.list_pads(&uid)?;
        Ok::<_, anyhow::Error>((notes, pads))
    })
    .await??;

    Ok((
        jar,
        Json(NoteListView {
            notes: notes.into_iter().map(note_view).collect(),
            pads: pads.into_iter().map(pad_view).collect(),
            flash,
        }),
    ))
}

pub async fn view_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(note_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);
    let uid = user.id.to_string();

    let note = state
        .db
        .get_note(&note_id.to_string(), &uid)?
        .ok_or(ApiError::NotFound)?;
    let pads = state.db.list_pads(&uid)?;

    Ok((
        jar,
        Json(NoteDetailView {
            note: note_view(note),
            pads: pads.into_iter().map(pad_view).collect(),
            flash,
        }),
    ))
}

pub async fn create_note_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);
    let pads = state.db.list_pads(&user.id.to_string())?;

    Ok((
        jar,
        Json(NoteFormView {
            note: None,
            pads: pads.into_iter().map(pad_view).collect(),
            flash,
        }),
    ))
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Json(form): Json<NoteForm>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user.id.to_string();
    let errors = checked_note_form(&state, &uid, &form)?;
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let note_id = Uuid::new_v4();
    let pad_id = form.pad_id.map(|p| p.to_string());
    state.db.create_note(
        &note_id.to_string(),
        &uid,
        &form.name,
        &form.text,
        pad_id.as_deref(),
    )?;

    let jar = flash::set(jar, Flash::success("Note is successfully created"));
    Ok((jar, Redirect::to("/notes")))
}

pub async fn edit_note_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(note_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);
    let uid = user.id.to_string();

    let note = state
        .db
        .get_note(&note_id.to_string(), &uid)?
        .ok_or(ApiError::NotFound)?;
    let pads = state.db.list_pads(&uid)?;

    Ok((
        jar,
        Json(NoteFormView {
            note: Some(note_view(note)),
            pads: pads.into_iter().map(pad_view).collect(),
            flash,
        }),
    ))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(note_id): Path<Uuid>,
    jar: CookieJar,
    Json(form): Json<NoteForm>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = user.id.to_string();
    let errors = checked_note_form(&state, &uid, &form)?;
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let pad_id = form.pad_id.map(|p| p.to_string());
    let updated = state
        .db
        .update_note(
            &note_id.to_string(),
            &uid,
            &form.name,
            &form.text,
            pad_id.as_deref(),
        )?
        .ok_or(ApiError::NotFound)?;

    // A note filed under a pad goes back to that pad's list; a loose note
    // goes back to the general list.
    let location = match &updated.pad_id {
        Some(pad_id) => format!("/pads/{}/notes", pad_id),
        None => "/notes".to_string(),
    };

    let jar = flash::set(jar, Flash::success("Note is successfully updated"));
    Ok((jar, Redirect::to(&location)))
}

/// GET renders the confirmation prompt; nothing is deleted yet.
pub async fn confirm_delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(note_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .get_note(&note_id.to_string(), &user.id.to_string())?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(DeleteNoteView { note: note_view(note) }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(note_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .delete_note(&note_id.to_string(), &user.id.to_string())?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    let jar = flash::set(jar, Flash::success("Note is successfully deleted"));
    Ok((jar, Redirect::to("/notes")))
}

/// Schema validation plus the pad-ownership check: a note may only be filed
/// under a pad the same user owns.
fn checked_note_form(
    state: &AppState,
    user_id: &str,
    form: &NoteForm,
) -> Result<FieldErrors, ApiError> {
    let mut errors = match validate_note(form) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    if let Some(pad_id) = form.pad_id {
        if state.db.get_pad(&pad_id.to_string(), user_id)?.is_none() {
            push_error(&mut errors, "pad_id", "Invalid pad");
        }
    }

    Ok(errors)
}

pub(crate) fn note_view(row: NoteRow) -> NoteView {
    NoteView {
        id: parse_id(&row.id),
        pad_id: row.pad_id.as_deref().map(parse_id),
        updated_at: row
            .updated_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap_or_else(|e| {
                warn!("Corrupt updated_at '{}' on note '{}': {}", row.updated_at, row.id, e);
                chrono::DateTime::default()
            }),
        name: row.name,
        text: row.text,
    }
}

pub(crate) fn parse_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}
