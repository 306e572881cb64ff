//! # Interface Layer
//!
//! The user-facing behaviour: which dialogs a bot variant runs and how it reacts to messages.

pub mod bots;
