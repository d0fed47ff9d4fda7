//! Library view: filtered, highlighted projection of the note collection.
//!
//! # Responsibility
//! - Filter notes by case-insensitive substring containment.
//! - Compute the byte span of the first match for highlight rendering.
//! - Recompute the derived view when the query or the store changes.
//!
//! # Invariants
//! - An empty query yields the full collection unfiltered.
//! - Filtered results preserve the store's newest-first order.
//! - Returned spans always start and end on `char` boundaries of the
//!   original content.
//! - Deleting a note removes it from the store and the derived view in one
//!   step; no stale entry survives.

use crate::model::note::{Note, NoteId};
use crate::repo::note_store::{NoteStore, StoreResult};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_MAX_CHARS: usize = 100;

/// One row of the library pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// The underlying note, owned snapshot.
    pub note: Note,
    /// Byte range of the first query match in `note.content`, present only
    /// while a non-empty query is active.
    pub match_span: Option<Range<usize>>,
    /// Whitespace-normalized summary for the preview card.
    pub preview_text: Option<String>,
}

/// Derived search state over the shared note store.
pub struct LibrarySearch<'a, S: NoteStore> {
    store: &'a S,
    query: String,
    entries: Vec<LibraryEntry>,
    seen_revision: Option<u64>,
}

impl<'a, S: NoteStore> LibrarySearch<'a, S> {
    /// Creates an empty-query view; call [`refresh`](Self::refresh) to
    /// populate it.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            query: String::new(),
            entries: Vec::new(),
            seen_revision: None,
        }
    }

    /// Returns the active query string.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replaces the query and recomputes the derived view.
    pub fn set_query(&mut self, query: impl Into<String>) -> StoreResult<()> {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.seen_revision = None;
        }
        self.refresh()
    }

    /// Recomputes entries when the store changed since the last refresh.
    ///
    /// This is the receiving end of the store's change notification
    /// contract: callers invoke it after any event that may have mutated
    /// the collection, and it no-ops when `revision()` has not moved.
    pub fn refresh(&mut self) -> StoreResult<()> {
        let current_revision = self.store.revision();
        if self.seen_revision == Some(current_revision) {
            return Ok(());
        }

        let notes = self.store.all()?;
        self.entries = filter_notes(notes, &self.query);
        self.seen_revision = Some(current_revision);
        debug!(
            "event=library_refresh module=search status=ok query_len={} entries={}",
            self.query.len(),
            self.entries.len()
        );
        Ok(())
    }

    /// Returns the current derived entries, newest-first.
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    /// Deletes a note and drops it from the derived view atomically.
    pub fn delete(&mut self, id: NoteId) -> StoreResult<()> {
        self.store.delete(id)?;
        self.refresh()
    }
}

/// Applies the query to an already newest-first collection.
///
/// Empty query keeps every note with no span; a non-empty query retains
/// exactly the notes containing it case-insensitively, order preserved.
pub fn filter_notes(notes: Vec<Note>, query: &str) -> Vec<LibraryEntry> {
    notes
        .into_iter()
        .filter_map(|note| {
            let match_span = if query.is_empty() {
                None
            } else {
                Some(find_match_span(&note.content, query)?)
            };
            let preview_text = derive_preview_text(&note.content);
            Some(LibraryEntry {
                note,
                match_span,
                preview_text,
            })
        })
        .collect()
}

/// Finds the byte range of the first case-insensitive occurrence of
/// `query` in `content`.
///
/// Comparison lowercases both sides per `char`, so offsets are computed
/// against the original text rather than a lowercased copy whose byte
/// layout may differ. A candidate whose end would land inside a multi-char
/// lowercase expansion is rejected. Empty queries match nothing.
pub fn find_match_span(content: &str, query: &str) -> Option<Range<usize>> {
    if query.is_empty() {
        return None;
    }

    let query_folded: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    for (start, _) in content.char_indices() {
        if let Some(end) = match_end_at(content, start, &query_folded) {
            return Some(start..end);
        }
    }
    None
}

/// Checks whether the folded query matches at byte offset `start`;
/// returns the exclusive end offset of the match.
fn match_end_at(content: &str, start: usize, query_folded: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (offset, ch) in content[start..].char_indices() {
        if matched == query_folded.len() {
            return Some(start + offset);
        }
        for folded in ch.to_lowercase() {
            if matched >= query_folded.len() || folded != query_folded[matched] {
                return None;
            }
            matched += 1;
        }
    }

    (matched == query_folded.len()).then_some(content.len())
}

/// Derives the preview card text: whitespace collapsed, leading/trailing
/// blanks removed, first 100 chars retained.
pub fn derive_preview_text(content: &str) -> Option<String> {
    let normalized = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_preview_text, find_match_span};

    #[test]
    fn span_covers_first_case_insensitive_occurrence() {
        assert_eq!(find_match_span("Hello WORLD", "world"), Some(6..11));
        assert_eq!(find_match_span("abc", "b"), Some(1..2));
    }

    #[test]
    fn span_prefers_the_earliest_match() {
        assert_eq!(find_match_span("aa AA aa", "aa"), Some(0..2));
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert_eq!(find_match_span("anything", ""), None);
        assert_eq!(find_match_span("", ""), None);
    }

    #[test]
    fn span_offsets_are_bytes_into_the_original_text() {
        // The memo emoji occupies 4 bytes; the match must account for them.
        let content = "\u{1f4dd} Notes";
        let span = find_match_span(content, "notes").expect("should match");
        assert_eq!(span, 5..10);
        assert_eq!(&content[span], "Notes");
    }

    #[test]
    fn span_handles_non_ascii_case_folding() {
        let content = "GRÜSSE aus Wien";
        let span = find_match_span(content, "grüsse").expect("should match");
        assert_eq!(&content[span], "GRÜSSE");
    }

    #[test]
    fn match_at_end_of_content_is_found() {
        assert_eq!(find_match_span("say hello", "HELLO"), Some(4..9));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(find_match_span("Hello WORLD", "moon"), None);
    }

    #[test]
    fn preview_collapses_whitespace_and_caps_length() {
        let text = derive_preview_text("  line one\n\nline   two  ").expect("non-blank");
        assert_eq!(text, "line one line two");

        let long = "x".repeat(500);
        assert_eq!(derive_preview_text(&long).expect("non-blank").chars().count(), 100);
    }

    #[test]
    fn preview_of_blank_content_is_none() {
        assert_eq!(derive_preview_text(""), None);
        assert_eq!(derive_preview_text("  \n\t"), None);
    }
}
