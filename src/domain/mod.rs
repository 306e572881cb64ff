//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the bot.
//! Independent of Matrix and HTTP specifics, serving as the contract for the other layers.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
