//! # Domain Traits
//!
//! Abstract interfaces for the bot's collaborators (chat, SPARQL, storage, randomness).
//! Allows for pluggable implementations in the Infrastructure layer and stubs in tests.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::BotResult;
use crate::domain::types::{Card, SparqlResults};

/// Abstract interface for a Chat Provider (e.g., Matrix, Console)
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a plain (markdown) message to the room
    async fn send_message(&self, content: &str) -> Result<(), String>;

    /// Send a prompt offering a fixed set of choices
    async fn send_choices(&self, prompt: &str, choices: &[String]) -> Result<(), String>;

    /// Send a group of cards as a single message
    async fn send_cards(&self, cards: &[Card]) -> Result<(), String>;

    /// Get the current room ID
    fn room_id(&self) -> String;
}

/// Source of raw SPARQL result documents.
#[async_trait]
pub trait SparqlSource: Send + Sync {
    async fn fetch_raw(&self, query: &str) -> BotResult<SparqlResults>;
}

/// Keyed JSON storage for user and conversation state.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn read(&self, key: &str) -> BotResult<Option<Value>>;

    async fn write(&self, key: &str, value: Value) -> BotResult<()>;

    async fn delete(&self, key: &str) -> BotResult<()>;
}

/// Uniform random choices, injectable so tests can pin the outcome.
pub trait Sampler: Send + Sync {
    /// Up to `amount` distinct indices below `len`.
    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize>;

    /// One index below `len`, or `None` when `len` is zero.
    fn pick_index(&self, len: usize) -> Option<usize>;
}
