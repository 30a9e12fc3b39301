use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use notejam_db::models::PadRow;
use notejam_types::api::{DeletePadView, Flash, PadForm, PadFormView, PadNotesView, PadView};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::flash;
use crate::forms::validate_pad;
use crate::notes::{note_view, parse_id};
use crate::session::CurrentUser;

pub async fn pad_notes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(pad_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);

    // Run blocking DB reads off the async runtime
    let db = state.clone();
    let uid = user.id.to_string();
    let pid = pad_id.to_string();
    let (pad, notes, pads) = tokio::task::spawn_blocking(move || {
        let pad = db.db.get_pad(&pid, &uid)?;
        let notes = db.db.list_pad_notes(&pid, &uid)?;
        let pads = db.db.list_pads(&uid)?;
        Ok::<_, anyhow::Error>((pad, notes, pads))
    })
    .await??;

    let pad = pad.ok_or(ApiError::NotFound)?;

    Ok((
        jar,
        Json(PadNotesView {
            pad: pad_view(pad),
            notes: notes.into_iter().map(note_view).collect(),
            pads: pads.into_iter().map(pad_view).collect(),
            flash,
        }),
    ))
}

pub async fn create_pad_form(jar: CookieJar) -> (CookieJar, Json<PadFormView>) {
    let (jar, flash) = flash::take(jar);
    (jar, Json(PadFormView { pad: None, flash }))
}

pub async fn create_pad(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    jar: CookieJar,
    Json(form): Json<PadForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_pad(&form).map_err(ApiError::Validation)?;

    let pad_id = Uuid::new_v4();
    state
        .db
        .create_pad(&pad_id.to_string(), &user.id.to_string(), &form.name)?;

    let jar = flash::set(jar, Flash::success("Pad is successfully created"));
    Ok((jar, Redirect::to("/notes")))
}

pub async fn edit_pad_form(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(pad_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, flash) = flash::take(jar);

    let pad = state
        .db
        .get_pad(&pad_id.to_string(), &user.id.to_string())?
        .ok_or(ApiError::NotFound)?;

    Ok((jar, Json(PadFormView { pad: Some(pad_view(pad)), flash })))
}

pub async fn update_pad(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(pad_id): Path<Uuid>,
    jar: CookieJar,
    Json(form): Json<PadForm>,
) -> Result<impl IntoResponse, ApiError> {
    validate_pad(&form).map_err(ApiError::Validation)?;

    let updated = state
        .db
        .update_pad(&pad_id.to_string(), &user.id.to_string(), &form.name)?;
    if !updated {
        return Err(ApiError::NotFound);
    }

    let jar = flash::set(jar, Flash::success("Pad is successfully updated"));
    Ok((jar, Redirect::to(&format!("/pads/{}/notes", pad_id))))
}

/// GET renders the confirmation prompt; nothing is deleted yet.
pub async fn confirm_delete_pad(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(pad_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let pad = state
        .db
        .get_pad(&pad_id.to_string(), &user.id.to_string())?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(DeletePadView { pad: pad_view(pad) }))
}

/// Confirmed POST: the pad and every note filed under it go together, in one
/// transaction.
pub async fn delete_pad(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(pad_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .db
        .delete_pad(&pad_id.to_string(), &user.id.to_string())?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    let jar = flash::set(jar, Flash::success("Pad is successfully deleted"));
    Ok((jar, Redirect::to("/notes")))
}

pub(crate) fn pad_view(row: PadRow) -> PadView {
    PadView {
        id: parse_id(&row.id),
        name: row.name,
    }
}
