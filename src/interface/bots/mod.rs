//! # Bot Variants
//!
//! The two conversational behaviours the binary can run.

pub mod name;
pub mod visit;

use std::sync::Arc;

use crate::application::data::DataService;
use crate::application::dispatcher::TurnHandler;
use crate::domain::config::BotVariant;

pub fn handler_for(variant: BotVariant, data: Arc<DataService>) -> Arc<dyn TurnHandler> {
    match variant {
        BotVariant::Visit => Arc::new(visit::VisitBot::new(data)),
        BotVariant::Name => Arc::new(name::NameBot::new(data)),
    }
}
