/// Database row types — these map directly to SQLite rows.
/// Distinct from the notejam-types view models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

pub struct PadRow {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: String,
}

pub struct NoteRow {
    pub id: String,
    pub name: String,
    pub text: String,
    pub user_id: String,
    pub pad_id: Option<String>,
    pub updated_at: String,
}
