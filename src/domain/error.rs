//! # Bot Errors
//!
//! The error taxonomy shared by every layer below `main`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The SPARQL endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    #[error("SPARQL endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed SPARQL response: {0}")]
    Parse(String),

    /// A request kind that is neither attractions nor events.
    #[error("Invalid request type: {0}")]
    InvalidRequest(String),

    #[error("Failed to read query file {path:?}: {source}")]
    Query {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State storage error: {0}")]
    Storage(String),

    #[error("Chat delivery failed: {0}")]
    Chat(String),

    #[error("Unknown dialog: {0}")]
    UnknownDialog(String),
}

pub type BotResult<T> = Result<T, BotError>;
