use crate::models::{NoteRow, PadRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

/// Note listing order, resolved from the `?order=` query parameter.
/// Anything unrecognized (or absent) falls back to most-recently-updated
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOrder {
    NameAsc,
    NameDesc,
    UpdatedAsc,
    UpdatedDesc,
}

impl NoteOrder {
    pub fn parse(param: Option<&str>) -> Self {
        match param {
            Some("name") => NoteOrder::NameAsc,
            Some("-name") => NoteOrder::NameDesc,
            Some("updated_at") => NoteOrder::UpdatedAsc,
            _ => NoteOrder::UpdatedDesc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            NoteOrder::NameAsc => "name ASC",
            NoteOrder::NameDesc => "name DESC",
            NoteOrder::UpdatedAsc => "updated_at ASC",
            NoteOrder::UpdatedDesc => "updated_at DESC",
        }
    }
}

/// Timestamps are stored as fixed-width RFC 3339 UTC strings so that
/// lexicographic ORDER BY matches chronological order.
fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (id, email, password) VALUES (?1, ?2, ?3)",
                (id, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    // -- Notes --
    //
    // Every lookup and mutation is scoped to the owning user in the SQL
    // itself, so a note belonging to someone else is indistinguishable from
    // a note that does not exist.

    pub fn list_notes(&self, user_id: &str, order: NoteOrder) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, name, text, user_id, pad_id, updated_at
                 FROM notes WHERE user_id = ?1
                 ORDER BY {}",
                order.as_sql()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], note_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_note(&self, note_id: &str, user_id: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, text, user_id, pad_id, updated_at
                 FROM notes WHERE id = ?1 AND user_id = ?2",
            )?;
            let row = stmt.query_row([note_id, user_id], note_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn create_note(
        &self,
        id: &str,
        user_id: &str,
        name: &str,
        text: &str,
        pad_id: Option<&str>,
    ) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO notes (id, name, text, user_id, pad_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, name, text, user_id, pad_id, now_timestamp()],
            )?;
            Ok(())
        })
    }

    /// Apply an edit and refresh `updated_at`. Returns the updated row, or
    /// None when no note with that id belongs to `user_id`.
    pub fn update_note(
        &self,
        note_id: &str,
        user_id: &str,
        name: &str,
        text: &str,
        pad_id: Option<&str>,
    ) -> Result<Option<NoteRow>> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE notes SET name = ?1, text = ?2, pad_id = ?3, updated_at = ?4
                 WHERE id = ?5 AND user_id = ?6",
                rusqlite::params![name, text, pad_id, now_timestamp(), note_id, user_id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let mut stmt = tx.prepare(
                "SELECT id, name, text, user_id, pad_id, updated_at
                 FROM notes WHERE id = ?1 AND user_id = ?2",
            )?;
            let row = stmt.query_row([note_id, user_id], note_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn delete_note(&self, note_id: &str, user_id: &str) -> Result<bool> {
        self.with_tx(|tx| {
            let deleted = tx.execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                [note_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    // -- Pads --

    pub fn list_pads(&self, user_id: &str) -> Result<Vec<PadRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, user_id, created_at
                 FROM pads WHERE user_id = ?1 ORDER BY name ASC",
            )?;
            let rows = stmt
                .query_map([user_id], pad_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_pad(&self, pad_id: &str, user_id: &str) -> Result<Option<PadRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, user_id, created_at
                 FROM pads WHERE id = ?1 AND user_id = ?2",
            )?;
            let row = stmt.query_row([pad_id, user_id], pad_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_pad_notes(&self, pad_id: &str, user_id: &str) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, text, user_id, pad_id, updated_at
                 FROM notes WHERE pad_id = ?1 AND user_id = ?2
                 ORDER BY updated_at DESC",
            )?;
            let rows = stmt
                .query_map([pad_id, user_id], note_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn create_pad(&self, id: &str, user_id: &str, name: &str) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute(
                "INSERT INTO pads (id, name, user_id) VALUES (?1, ?2, ?3)",
                (id, name, user_id),
            )?;
            Ok(())
        })
    }

    pub fn update_pad(&self, pad_id: &str, user_id: &str, name: &str) -> Result<bool> {
        self.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE pads SET name = ?1 WHERE id = ?2 AND user_id = ?3",
                [name, pad_id, user_id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a pad and every note filed under it, atomically.
    pub fn delete_pad(&self, pad_id: &str, user_id: &str) -> Result<bool> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM notes WHERE pad_id = ?1 AND user_id = ?2",
                [pad_id, user_id],
            )?;
            let deleted = tx.execute(
                "DELETE FROM pads WHERE id = ?1 AND user_id = ?2",
                [pad_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password, created_at FROM users WHERE email = ?1")?;

    let row = stmt.query_row([email], user_from_row).optional()?;
    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, email, password, created_at FROM users WHERE id = ?1")?;

    let row = stmt.query_row([id], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn pad_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PadRow> {
    Ok(PadRow {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn note_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok(NoteRow {
        id: row.get(0)?,
        name: row.get(1)?,
        text: row.get(2)?,
        user_id: row.get(3)?,
        pad_id: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
