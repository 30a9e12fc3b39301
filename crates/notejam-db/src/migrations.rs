use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS pads (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_pads_user
            ON pads(user_id);

        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            text        TEXT NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id),
            pad_id      TEXT REFERENCES pads(id),
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notes_user
            ON notes(user_id, updated_at);

        CREATE INDEX IF NOT EXISTS idx_notes_pad
            ON notes(pad_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
