//! Library-pane search entry points.
//!
//! # Responsibility
//! - Expose substring filtering with highlight spans over the collection.
//! - Keep result shaping inside core.

pub mod library;
