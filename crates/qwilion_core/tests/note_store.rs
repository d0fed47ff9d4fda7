use qwilion_core::db::migrations::latest_version;
use qwilion_core::db::open_db_in_memory;
use qwilion_core::{Note, NoteStore, SqliteNoteStore, StoreError};
use rusqlite::{params, Connection};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let created = store.create().unwrap();
    assert!(created.content.is_empty());
    assert_eq!(created.created_at, created.modified_at);

    let loaded = store.get(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn save_persists_content_and_modified_at() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let mut note = store.create().unwrap();
    note.edit("first draft", note.modified_at + 10);
    store.save(&note).unwrap();

    let loaded = store.get(note.id).unwrap().unwrap();
    assert_eq!(loaded.content, "first draft");
    assert_eq!(loaded.modified_at, note.modified_at);
    assert_eq!(loaded.created_at, note.created_at);
}

#[test]
fn save_missing_note_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let unsaved = Note::new(1000);
    let err = store.save(&unsaved).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == unsaved.id));
}

#[test]
fn save_rejects_invalid_timestamp_ordering() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let mut note = store.create().unwrap();
    note.modified_at = note.created_at - 1;
    let err = store.save(&note).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn all_returns_notes_newest_first_with_stable_tie_break() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let note_a = store.create().unwrap();
    let note_b = store.create().unwrap();
    let note_c = store.create().unwrap();

    set_modified_at(&conn, note_a.id, 1000);
    set_modified_at(&conn, note_b.id, 3000);
    set_modified_at(&conn, note_c.id, 2000);

    let listed = store.all().unwrap();
    let ids: Vec<_> = listed.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![note_b.id, note_c.id, note_a.id]);
}

#[test]
fn most_recently_modified_tracks_the_greatest_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    assert!(store.most_recently_modified().unwrap().is_none());

    let older = store.create().unwrap();
    let newer = store.create().unwrap();
    set_modified_at(&conn, older.id, 1000);
    set_modified_at(&conn, newer.id, 2000);

    let top = store.most_recently_modified().unwrap().unwrap();
    assert_eq!(top.id, newer.id);
}

#[test]
fn delete_removes_the_note_and_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let note = store.create().unwrap();
    store.delete(note.id).unwrap();
    store.delete(note.id).unwrap();
    store.delete(Uuid::new_v4()).unwrap();

    assert!(store.get(note.id).unwrap().is_none());
    assert!(store.all().unwrap().is_empty());
}

#[test]
fn revision_bumps_on_every_mutation_and_not_on_reads() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    let before = store.revision();
    let mut note = store.create().unwrap();
    assert_eq!(store.revision(), before + 1);

    note.edit("changed", note.modified_at + 1);
    store.save(&note).unwrap();
    assert_eq!(store.revision(), before + 2);

    store.all().unwrap();
    store.get(note.id).unwrap();
    assert_eq!(store.revision(), before + 2);

    store.delete(note.id).unwrap();
    assert_eq!(store.revision(), before + 3);
}

#[test]
fn read_paths_reject_invalid_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO notes (id, content, created_at, modified_at)
         VALUES ('not-a-uuid', 'junk', 1000, 2000);",
        [],
    )
    .unwrap();

    let err = store.all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteNoteStore::try_new(&conn);
    match result {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteStore::try_new(&conn);
    assert!(matches!(result, Err(StoreError::MissingRequiredTable("notes"))));
}

#[test]
fn store_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id TEXT PRIMARY KEY NOT NULL,
            content TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteStore::try_new(&conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredColumn {
            table: "notes",
            column: "created_at"
        })
    ));
}

fn set_modified_at(conn: &Connection, id: Uuid, modified_at: i64) {
    conn.execute(
        "UPDATE notes SET created_at = 0, modified_at = ?2 WHERE id = ?1;",
        params![id.to_string(), modified_at],
    )
    .unwrap();
}
