//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus newest-first queries over persisted notes.
//! - Expose a change counter so derived views can detect mutations.
//!
//! # Invariants
//! - `all()` and `most_recently_modified()` order by `modified_at DESC`
//!   with `id ASC` as deterministic tie-break.
//! - `delete()` is idempotent; deleting an absent note is not an error.
//! - Every successful mutation bumps `revision()`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId, NoteValidationError};
use rusqlite::{params, Connection, Row};
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    content,
    created_at,
    modified_at
FROM notes";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for note store operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    /// Connection has not been migrated to the expected schema version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column: {table}.{column}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface shared by the capture session and the library view.
///
/// All operations are synchronous; the store is the sole source of truth
/// for persisted notes.
pub trait NoteStore {
    /// Allocates, persists and returns a fresh empty note.
    fn create(&self) -> StoreResult<Note>;
    /// Persists mutations to an existing note. `NotFound` if absent.
    fn save(&self, note: &Note) -> StoreResult<()>;
    /// Gets one note by stable ID.
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Returns the note with the greatest `modified_at`, if any.
    fn most_recently_modified(&self) -> StoreResult<Option<Note>>;
    /// Returns all notes sorted newest-first by `modified_at`.
    fn all(&self) -> StoreResult<Vec<Note>>;
    /// Removes one note. Idempotent when the note is already absent.
    fn delete(&self, id: NoteId) -> StoreResult<()>;
    /// Monotonic counter bumped by every successful mutation through this
    /// handle. Derived views compare it against the last value they acted
    /// on and recompute when it moved.
    fn revision(&self) -> u64;
}

/// SQLite-backed note store.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
    revision: Cell<u64>,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    ///
    /// Rejects connections whose schema is unmigrated or structurally
    /// incomplete instead of failing later inside a query.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            revision: Cell::new(0),
        })
    }

    fn bump_revision(&self) {
        self.revision.set(self.revision.get() + 1);
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn create(&self) -> StoreResult<Note> {
        let note = Note::new(crate::model::note::now_epoch_ms());
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (id, content, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note.id.to_string(),
                note.content.as_str(),
                note.created_at,
                note.modified_at,
            ],
        )?;

        self.bump_revision();
        Ok(note)
    }

    fn save(&self, note: &Note) -> StoreResult<()> {
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                content = ?2,
                modified_at = ?3
             WHERE id = ?1;",
            params![note.id.to_string(), note.content.as_str(), note.modified_at],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(note.id));
        }

        self.bump_revision();
        Ok(())
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn most_recently_modified(&self) -> StoreResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             ORDER BY modified_at DESC, id ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn all(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             ORDER BY modified_at DESC, id ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn delete(&self, id: NoteId) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id.to_string()])?;

        self.bump_revision();
        Ok(())
    }

    fn revision(&self) -> u64 {
        self.revision.get()
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    let note = Note {
        id,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        modified_at: row.get("modified_at")?,
    };
    note.validate()?;
    Ok(note)
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "notes")? {
        return Err(StoreError::MissingRequiredTable("notes"));
    }

    for column in ["id", "content", "created_at", "modified_at"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
