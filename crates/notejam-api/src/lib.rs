pub mod auth;
pub mod error;
pub mod flash;
pub mod forms;
pub mod notes;
pub mod pads;
pub mod session;

pub use auth::{AppState, AppStateInner};

use axum::{middleware, routing::get, Router};

/// Assemble the full route table. Sign-in/sign-up are public; every note and
/// pad route sits behind the login guard, which redirects anonymous requests
/// to the sign-in flow.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/signin", get(auth::signin_form).post(auth::signin))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/signout", get(auth::signout))
        .route("/notes", get(notes::list_notes))
        .route("/notes/create", get(notes::create_note_form).post(notes::create_note))
        .route("/notes/{note_id}", get(notes::view_note))
        .route("/notes/{note_id}/edit", get(notes::edit_note_form).post(notes::update_note))
        .route(
            "/notes/{note_id}/delete",
            get(notes::confirm_delete_note).post(notes::delete_note),
        )
        .route("/pads/create", get(pads::create_pad_form).post(pads::create_pad))
        .route("/pads/{pad_id}/notes", get(pads::pad_notes))
        .route("/pads/{pad_id}/edit", get(pads::edit_pad_form).post(pads::update_pad))
        .route(
            "/pads/{pad_id}/delete",
            get(pads::confirm_delete_pad).post(pads::delete_pad),
        )
        .layer(middleware::from_fn_with_state(state.clone(), session::require_login))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}
