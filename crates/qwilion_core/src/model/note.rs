//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the capture/library panes.
//! - Enforce timestamp ordering on every content mutation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `modified_at >= created_at` at all times.
//! - Every edit strictly increases `modified_at`, even within one
//!   millisecond.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for a note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// A single persisted unit of text with creation/modification timestamps.
///
/// All fields are required with explicit defaults; there is no nullable
/// field to unwrap at the data-model boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable global ID, assigned at creation.
    pub id: NoteId,
    /// Plain text body. Defaults to empty.
    pub content: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, advanced on every content mutation.
    pub modified_at: i64,
}

/// Validation error for note timestamp ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// `modified_at` is earlier than `created_at`.
    ModifiedBeforeCreated { created_at: i64, modified_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModifiedBeforeCreated {
                created_at,
                modified_at,
            } => write!(
                f,
                "modified_at {modified_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for NoteValidationError {}

impl Note {
    /// Creates an empty note with a generated stable ID.
    ///
    /// # Invariants
    /// - `content` starts empty.
    /// - `created_at == modified_at == now_ms`.
    pub fn new(now_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), now_ms)
    }

    /// Creates an empty note with a caller-provided stable ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(id: NoteId, now_ms: i64) -> Self {
        Self {
            id,
            content: String::new(),
            created_at: now_ms,
            modified_at: now_ms,
        }
    }

    /// Replaces content and advances the modification timestamp.
    ///
    /// # Contract
    /// - `modified_at` becomes `max(now_ms, modified_at + 1)`, so a burst
    ///   of edits inside one millisecond still yields strictly increasing
    ///   timestamps.
    pub fn edit(&mut self, content: impl Into<String>, now_ms: i64) {
        self.content = content.into();
        self.modified_at = now_ms.max(self.modified_at + 1);
    }

    /// Checks timestamp ordering.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.modified_at < self.created_at {
            return Err(NoteValidationError::ModifiedBeforeCreated {
                created_at: self.created_at,
                modified_at: self.modified_at,
            });
        }
        Ok(())
    }
}

/// Returns the current wall clock as Unix epoch milliseconds.
///
/// Clamps to zero for clocks set before the epoch instead of panicking.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
