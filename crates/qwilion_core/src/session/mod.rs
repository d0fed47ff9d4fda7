//! Capture-pane orchestration.
//!
//! # Responsibility
//! - Track the single note bound for editing and autosave every change.
//! - Keep UI layers decoupled from storage details.

pub mod capture;
