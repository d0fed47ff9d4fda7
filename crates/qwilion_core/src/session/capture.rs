//! Capture session: one "current" note bound to the editing pane.
//!
//! # Responsibility
//! - Bind the most recently modified note on activation, or create the
//!   first note when the store is empty.
//! - Persist every buffer change unconditionally (autosave).
//! - Create-and-bind a fresh note on the explicit new-note trigger.
//!
//! # Invariants
//! - At most one note is bound at any time.
//! - The in-memory buffer always holds the latest edit, including when a
//!   save fails; persistence is re-attempted on the next edit.
//! - A new note is never created while the bound note is still empty, so
//!   the store never accumulates duplicate empty notes.

use crate::model::note::{now_epoch_ms, Note, NoteId};
use crate::repo::note_store::{NoteStore, StoreResult};
use log::{debug, error};

/// Editing session for the capture pane.
///
/// Generic over the store so tests can substitute failure-injecting
/// implementations.
pub struct CaptureSession<'a, S: NoteStore> {
    store: &'a S,
    note: Option<Note>,
    buffer: String,
    seen_revision: u64,
}

impl<'a, S: NoteStore> CaptureSession<'a, S> {
    /// Creates an unbound session over the shared store handle.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            note: None,
            buffer: String::new(),
            seen_revision: store.revision(),
        }
    }

    /// Binds a current note if none is bound yet.
    ///
    /// Prefers the most recently modified persisted note; creates the first
    /// note when the store is empty. A failed fetch propagates instead of
    /// falling back to creation, so a read failure cannot silently spawn
    /// notes on top of existing data.
    pub fn activate(&mut self) -> StoreResult<()> {
        if self.note.is_some() {
            return Ok(());
        }

        let note = match self.store.most_recently_modified()? {
            Some(existing) => existing,
            None => self.store.create()?,
        };

        debug!(
            "event=capture_activate module=session status=ok note_id={} content_len={}",
            note.id,
            note.content.len()
        );
        self.buffer = note.content.clone();
        self.note = Some(note);
        self.seen_revision = self.store.revision();
        Ok(())
    }

    /// Applies one buffer change and autosaves it.
    ///
    /// The buffer is updated before any persistence attempt, so a store
    /// failure never loses a keystroke; the stale persisted copy catches up
    /// on the next successful save. An edit arriving while no note is
    /// bound only updates the buffer.
    pub fn apply_edit(&mut self, text: impl Into<String>) -> StoreResult<()> {
        self.buffer = text.into();

        let Some(note) = self.note.as_mut() else {
            return Ok(());
        };

        note.edit(self.buffer.clone(), now_epoch_ms());
        match self.store.save(note) {
            Ok(()) => {
                self.seen_revision = self.store.revision();
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=autosave module=session status=error note_id={} error={err}",
                    note.id
                );
                Err(err)
            }
        }
    }

    /// Handles the explicit new-note trigger.
    ///
    /// Flushes the bound note first when it carries content, then binds a
    /// freshly created empty note. When the bound note is still empty it is
    /// reused as-is rather than persisting a second empty note.
    pub fn start_new_note(&mut self) -> StoreResult<NoteId> {
        if let Some(note) = self.note.as_ref() {
            if note.content.is_empty() {
                self.buffer.clear();
                return Ok(note.id);
            }
            self.store.save(note)?;
        }

        let fresh = self.store.create()?;
        debug!(
            "event=new_note module=session status=ok note_id={}",
            fresh.id
        );
        let id = fresh.id;
        self.note = Some(fresh);
        self.buffer.clear();
        self.seen_revision = self.store.revision();
        Ok(id)
    }

    /// Reacts to store changes made outside this session.
    ///
    /// The session is the sole content writer, so its in-memory copy stays
    /// authoritative while the bound note exists; only an external delete
    /// unbinds. The next `activate()` rebinds or recreates.
    pub fn sync(&mut self) -> StoreResult<()> {
        let current_revision = self.store.revision();
        if current_revision == self.seen_revision {
            return Ok(());
        }
        self.seen_revision = current_revision;

        if let Some(note) = self.note.as_ref() {
            if self.store.get(note.id)?.is_none() {
                debug!(
                    "event=capture_unbind module=session status=ok note_id={} reason=deleted",
                    note.id
                );
                self.note = None;
                self.buffer.clear();
            }
        }
        Ok(())
    }

    /// Returns the editable text buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Returns the currently bound note, if any.
    pub fn current(&self) -> Option<&Note> {
        self.note.as_ref()
    }
}
