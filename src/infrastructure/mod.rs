//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatProvider, SparqlSource, StateStore).

pub mod matrix;
pub mod queries;
pub mod sparql;
pub mod storage;
