//! Form validation. The schemas themselves live in notejam-types; each
//! function here checks one of them and returns field-level errors. Mapping
//! validated data onto rows happens explicitly in the handlers.

use notejam_types::api::{FieldErrors, NoteForm, PadForm, SigninForm, SignupForm};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_NAME_LEN: usize = 100;

pub(crate) fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if email.trim().is_empty() {
        push_error(errors, "email", "Email is required");
    } else if !email.contains('@') || !email.contains('.') {
        push_error(errors, "email", "Invalid email address");
    }
}

fn check_name(errors: &mut FieldErrors, name: &str) {
    if name.trim().is_empty() {
        push_error(errors, "name", "Name is required");
    } else if name.len() > MAX_NAME_LEN {
        push_error(errors, "name", "Name is too long");
    }
}

pub fn validate_signup(form: &SignupForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_email(&mut errors, &form.email);
    if form.password.len() < MIN_PASSWORD_LEN {
        push_error(&mut errors, "password", "Password must be at least 8 characters");
    }
    if form.repeat_password != form.password {
        push_error(&mut errors, "repeat_password", "Passwords must match");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_signin(form: &SigninForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.email.trim().is_empty() {
        push_error(&mut errors, "email", "Email is required");
    }
    if form.password.is_empty() {
        push_error(&mut errors, "password", "Password is required");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_note(form: &NoteForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_name(&mut errors, &form.name);
    if form.text.trim().is_empty() {
        push_error(&mut errors, "text", "Text is required");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

pub fn validate_pad(form: &PadForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_name(&mut errors, &form.name);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
