//! # Turn Context
//!
//! Everything a handler touches during one inbound activity: the chat to answer
//! on, the activity itself and the loaded user/conversation bags. Tracks whether
//! anything has been sent yet.

use crate::application::state::PropertyBag;
use crate::domain::error::{BotError, BotResult};
use crate::domain::traits::ChatProvider;
use crate::domain::types::{Activity, Card};

pub struct TurnContext<'a> {
    chat: &'a dyn ChatProvider,
    pub activity: Activity,
    pub user: PropertyBag,
    pub conversation: PropertyBag,
    responded: bool,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        chat: &'a dyn ChatProvider,
        activity: Activity,
        user: PropertyBag,
        conversation: PropertyBag,
    ) -> Self {
        Self {
            chat,
            activity,
            user,
            conversation,
            responded: false,
        }
    }

    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Text of the inbound message, empty for non-message activities.
    pub fn text(&self) -> &str {
        self.activity.text().unwrap_or_default()
    }

    pub async fn send_text(&mut self, content: &str) -> BotResult<()> {
        self.chat.send_message(content).await.map_err(BotError::Chat)?;
        self.responded = true;
        Ok(())
    }

    pub async fn send_choices(&mut self, prompt: &str, choices: &[String]) -> BotResult<()> {
        self.chat
            .send_choices(prompt, choices)
            .await
            .map_err(BotError::Chat)?;
        self.responded = true;
        Ok(())
    }

    pub async fn send_cards(&mut self, cards: &[Card]) -> BotResult<()> {
        self.chat.send_cards(cards).await.map_err(BotError::Chat)?;
        self.responded = true;
        Ok(())
    }
}
