//! Persistence layer abstraction and SQLite implementation.
//!
//! # Responsibility
//! - Define the note store contract both panes read/write through.
//! - Isolate SQL details from session/search orchestration.
//!
//! # Invariants
//! - Write paths validate notes before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod note_store;
