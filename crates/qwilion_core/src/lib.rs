//! Core domain logic for Qwilion, a two-pane note-taking app.
//! This crate is the single source of truth for business invariants:
//! which note is "current", when autosave fires, and how library search
//! filters and highlights.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod session;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{now_epoch_ms, Note, NoteId, NoteValidationError};
pub use repo::note_store::{NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use search::library::{
    derive_preview_text, filter_notes, find_match_span, LibraryEntry, LibrarySearch,
};
pub use session::capture::CaptureSession;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
