//! # Application Layer
//!
//! Contains the core logic and orchestration of the bot.
//! This includes the data service, response flattening, the dialog runner, state bags and turn dispatch.

pub mod data;
pub mod dialog;
pub mod dispatcher;
pub mod flatten;
pub mod sampling;
pub mod state;
pub mod turn;
