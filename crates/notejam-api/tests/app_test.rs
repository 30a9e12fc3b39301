//! Integration tests: drive the assembled router end to end with an
//! in-memory database — sign up, sign in, and work notes and pads through
//! their full lifecycle.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use notejam_api::{AppStateInner, router};
use notejam_db::Database;
use notejam_types::api::{
    DeleteNoteView, FlashLevel, NoteListView, PadNotesView, ValidationErrorBody,
};

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    router(Arc::new(AppStateInner {
        db,
        secret_key: "test-secret".to_string(),
    }))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(res: Response<Body>) -> T {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(res: &Response<Body>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}

fn cookie_named<'a>(res: &'a Response<Body>, name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .and_then(|v| v.split(';').next())
}

async fn signup(app: &Router, email: &str, password: &str) -> Response<Body> {
    send(
        app,
        "POST",
        "/signup",
        None,
        Some(json!({
            "email": email,
            "password": password,
            "repeat_password": password,
        })),
    )
    .await
}

/// Register and authenticate, returning the session cookie pair.
async fn sign_in(app: &Router, email: &str, password: &str) -> String {
    let res = signup(app, email, password).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");

    let res = send(
        app,
        "POST",
        "/signin",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/notes");

    cookie_named(&res, "notejam_session")
        .expect("session cookie set on sign-in")
        .to_string()
}

async fn list_notes(app: &Router, cookie: &str, uri: &str) -> NoteListView {
    let res = send(app, "GET", uri, Some(cookie), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

#[tokio::test]
async fn signup_then_signin() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;
    assert!(cookie.starts_with("notejam_session="));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let app = app();
    let res = signup(&app, "a@x.com", "password1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let res = signup(&app, "a@x.com", "password2").await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ValidationErrorBody = body_json(res).await;
    assert!(body.errors.contains_key("email"));
}

#[tokio::test]
async fn signin_failures_are_indistinguishable() {
    let app = app();
    let res = signup(&app, "a@x.com", "password1").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let unknown = send(
        &app,
        "POST",
        "/signin",
        None,
        Some(json!({ "email": "nobody@x.com", "password": "password1" })),
    )
    .await;
    let wrong = send(
        &app,
        "POST",
        "/signin",
        None,
        Some(json!({ "email": "a@x.com", "password": "wrong-password" })),
    )
    .await;

    // The form is re-rendered, not rejected with an error status
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(wrong.status(), StatusCode::OK);

    let unknown_body = unknown.into_body().collect().await.unwrap().to_bytes();
    let wrong_body = wrong.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn anonymous_requests_redirect_to_signin() {
    let app = app();

    for (method, uri) in [
        ("GET", "/notes"),
        ("GET", "/notes/create"),
        ("POST", "/pads/create"),
        ("GET", "/signout"),
    ] {
        let res = send(&app, method, uri, None, None).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{} {}", method, uri);
        assert_eq!(location(&res), "/signin");
    }
}

#[tokio::test]
async fn session_for_unknown_user_is_rejected() {
    let app = app();

    // Correctly signed token, but no such user row exists in the store
    let token = notejam_api::session::issue_token(
        "test-secret",
        uuid::Uuid::new_v4(),
        "ghost@x.com",
    )
    .unwrap();
    let cookie = format!("notejam_session={}", token);

    let res = send(&app, "GET", "/notes", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
}

#[tokio::test]
async fn flash_message_is_shown_once() {
    let app = app();
    let res = signup(&app, "a@x.com", "password1").await;
    let flash_cookie = cookie_named(&res, "notejam_flash")
        .expect("flash cookie set on signup")
        .to_string();

    let res = send(&app, "GET", "/signin", Some(&flash_cookie), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    // The render clears the cookie
    let cleared = cookie_named(&res, "notejam_flash").unwrap();
    assert_eq!(cleared, "notejam_flash=");

    let view: notejam_types::api::AuthFormView = body_json(res).await;
    let flash = view.flash.unwrap();
    assert_eq!(flash.level, FlashLevel::Success);
    assert_eq!(flash.message, "Now you can sign in");

    let res = send(&app, "GET", "/signin", None, None).await;
    let view: notejam_types::api::AuthFormView = body_json(res).await;
    assert!(view.flash.is_none());
}

#[tokio::test]
async fn pad_and_note_lifecycle() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "pw1-long-enough").await;

    let res = send(
        &app,
        "POST",
        "/pads/create",
        Some(&cookie),
        Some(json!({ "name": "Work" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/notes");

    let view = list_notes(&app, &cookie, "/notes").await;
    assert_eq!(view.pads.len(), 1);
    assert_eq!(view.pads[0].name, "Work");
    let pad_id = view.pads[0].id;

    let res = send(
        &app,
        "POST",
        "/notes/create",
        Some(&cookie),
        Some(json!({ "name": "Todo", "text": "buy milk", "pad_id": pad_id })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    // The note shows up in the pad's list and first in the general list
    let res = send(
        &app,
        "GET",
        &format!("/pads/{}/notes", pad_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let pad_view: PadNotesView = body_json(res).await;
    assert_eq!(pad_view.pad.name, "Work");
    assert_eq!(pad_view.notes.len(), 1);
    assert_eq!(pad_view.notes[0].name, "Todo");
    let note_id = pad_view.notes[0].id;

    let view = list_notes(&app, &cookie, "/notes").await;
    assert_eq!(view.notes[0].name, "Todo");

    // GET renders the confirmation prompt without mutating anything
    let res = send(
        &app,
        "GET",
        &format!("/notes/{}/delete", note_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let confirm: DeleteNoteView = body_json(res).await;
    assert_eq!(confirm.note.id, note_id);

    let view = list_notes(&app, &cookie, "/notes").await;
    assert_eq!(view.notes.len(), 1);

    // Confirmed POST deletes
    let res = send(
        &app,
        "POST",
        &format!("/notes/{}/delete", note_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/notes");

    let view = list_notes(&app, &cookie, "/notes").await;
    assert!(view.notes.is_empty());

    let res = send(
        &app,
        "GET",
        &format!("/pads/{}/notes", pad_id),
        Some(&cookie),
        None,
    )
    .await;
    let pad_view: PadNotesView = body_json(res).await;
    assert!(pad_view.notes.is_empty());
}

#[tokio::test]
async fn users_only_see_their_own_notes() {
    let app = app();
    let alice = sign_in(&app, "alice@x.com", "password1").await;
    let bob = sign_in(&app, "bob@x.com", "password2").await;

    let res = send(
        &app,
        "POST",
        "/notes/create",
        Some(&alice),
        Some(json!({ "name": "Secret", "text": "alice only" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let view = list_notes(&app, &bob, "/notes").await;
    assert!(view.notes.is_empty());

    let note_id = list_notes(&app, &alice, "/notes").await.notes[0].id;

    for (method, uri) in [
        ("GET", format!("/notes/{}", note_id)),
        ("GET", format!("/notes/{}/delete", note_id)),
        ("POST", format!("/notes/{}/delete", note_id)),
    ] {
        let res = send(&app, method, &uri, Some(&bob), None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{} {}", method, uri);
    }

    let res = send(
        &app,
        "POST",
        &format!("/notes/{}/edit", note_id),
        Some(&bob),
        Some(json!({ "name": "stolen", "text": "mine now" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Alice's note is untouched
    let view = list_notes(&app, &alice, "/notes").await;
    assert_eq!(view.notes[0].name, "Secret");
}

#[tokio::test]
async fn note_listing_order_keys() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;

    for name in ["banana", "apple", "cherry"] {
        let res = send(
            &app,
            "POST",
            "/notes/create",
            Some(&cookie),
            Some(json!({ "name": name, "text": "text" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    let names = |view: NoteListView| -> Vec<String> {
        view.notes.into_iter().map(|n| n.name).collect()
    };

    let view = list_notes(&app, &cookie, "/notes?order=name").await;
    assert_eq!(names(view), ["apple", "banana", "cherry"]);

    let view = list_notes(&app, &cookie, "/notes?order=-name").await;
    assert_eq!(names(view), ["cherry", "banana", "apple"]);

    let view = list_notes(&app, &cookie, "/notes?order=updated_at").await;
    assert_eq!(names(view), ["banana", "apple", "cherry"]);

    // Unrecognized keys behave exactly like the default
    let view = list_notes(&app, &cookie, "/notes?order=bogus").await;
    assert_eq!(names(view), ["cherry", "apple", "banana"]);

    let view = list_notes(&app, &cookie, "/notes").await;
    assert_eq!(names(view), ["cherry", "apple", "banana"]);
}

#[tokio::test]
async fn edit_redirect_depends_on_pad() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;

    let res = send(
        &app,
        "POST",
        "/pads/create",
        Some(&cookie),
        Some(json!({ "name": "Work" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let pad_id = list_notes(&app, &cookie, "/notes").await.pads[0].id;

    for (name, pad) in [("filed", Some(pad_id)), ("loose", None)] {
        let res = send(
            &app,
            "POST",
            "/notes/create",
            Some(&cookie),
            Some(json!({ "name": name, "text": "text", "pad_id": pad })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }

    let notes = list_notes(&app, &cookie, "/notes?order=name").await.notes;
    let filed = notes.iter().find(|n| n.name == "filed").unwrap().id;
    let loose = notes.iter().find(|n| n.name == "loose").unwrap().id;

    let res = send(
        &app,
        "POST",
        &format!("/notes/{}/edit", filed),
        Some(&cookie),
        Some(json!({ "name": "filed", "text": "edited", "pad_id": pad_id })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/pads/{}/notes", pad_id));

    let res = send(
        &app,
        "POST",
        &format!("/notes/{}/edit", loose),
        Some(&cookie),
        Some(json!({ "name": "loose", "text": "edited" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/notes");
}

#[tokio::test]
async fn note_update_refreshes_updated_at() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;

    let res = send(
        &app,
        "POST",
        "/notes/create",
        Some(&cookie),
        Some(json!({ "name": "Todo", "text": "v1" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let before = list_notes(&app, &cookie, "/notes").await.notes[0].clone();

    let res = send(
        &app,
        "POST",
        &format!("/notes/{}/edit", before.id),
        Some(&cookie),
        Some(json!({ "name": "Todo", "text": "v2" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let after = list_notes(&app, &cookie, "/notes").await.notes[0].clone();
    assert_eq!(after.text, "v2");
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn note_cannot_be_filed_under_foreign_pad() {
    let app = app();
    let alice = sign_in(&app, "alice@x.com", "password1").await;
    let bob = sign_in(&app, "bob@x.com", "password2").await;

    let res = send(
        &app,
        "POST",
        "/pads/create",
        Some(&alice),
        Some(json!({ "name": "Private" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let pad_id = list_notes(&app, &alice, "/notes").await.pads[0].id;

    let res = send(
        &app,
        "POST",
        "/notes/create",
        Some(&bob),
        Some(json!({ "name": "Sneaky", "text": "text", "pad_id": pad_id })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ValidationErrorBody = body_json(res).await;
    assert!(body.errors.contains_key("pad_id"));
}

#[tokio::test]
async fn pad_delete_confirmation_flow() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;

    let res = send(
        &app,
        "POST",
        "/pads/create",
        Some(&cookie),
        Some(json!({ "name": "Work" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let pad_id = list_notes(&app, &cookie, "/notes").await.pads[0].id;

    // GET is only the prompt
    let res = send(
        &app,
        "GET",
        &format!("/pads/{}/delete", pad_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(list_notes(&app, &cookie, "/notes").await.pads.len(), 1);

    let res = send(
        &app,
        "POST",
        &format!("/pads/{}/delete", pad_id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/notes");
    assert!(list_notes(&app, &cookie, "/notes").await.pads.is_empty());
}

#[tokio::test]
async fn signout_clears_the_session_cookie() {
    let app = app();
    let cookie = sign_in(&app, "a@x.com", "password1").await;

    let res = send(&app, "GET", "/signout", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signin");
    assert_eq!(cookie_named(&res, "notejam_session"), Some("notejam_session="));
}
