//! Domain model for the capture/library core.
//!
//! # Responsibility
//! - Define the canonical data structure shared by both panes.
//!
//! # Invariants
//! - Every domain object is identified by a stable `NoteId`.
//! - Timestamp ordering is validated before and after persistence.

pub mod note;
