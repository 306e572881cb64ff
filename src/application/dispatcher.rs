//! # Turn Dispatcher
//!
//! Entry point for every inbound activity. Loads the user and conversation bags,
//! hands messages to the bot variant, greets newly added members, then flushes
//! user state followed by conversation state exactly once, whatever happened.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::state::BotState;
use crate::application::turn::TurnContext;
use crate::domain::error::BotResult;
use crate::domain::traits::{ChatProvider, StateStore};
use crate::domain::types::{Activity, ActivityKind};
use crate::strings::messages;

/// Behaviour of one bot variant.
#[async_trait]
pub trait TurnHandler: Send + Sync {
    async fn on_message(&self, turn: &mut TurnContext<'_>) -> BotResult<()>;
}

pub struct TurnDispatcher {
    user_state: BotState,
    conversation_state: BotState,
    handler: Arc<dyn TurnHandler>,
}

impl TurnDispatcher {
    pub fn new(store: Arc<dyn StateStore>, handler: Arc<dyn TurnHandler>) -> Self {
        Self {
            user_state: BotState::user(store.clone()),
            conversation_state: BotState::conversation(store),
            handler,
        }
    }

    pub async fn on_turn(&self, chat: &dyn ChatProvider, activity: Activity) -> BotResult<()> {
        tracing::info!(
            "Dispatching {:?} in {} from {}",
            activity.kind,
            activity.conversation_id,
            activity.from
        );

        let user = self.user_state.load(&activity).await?;
        let conversation = self.conversation_state.load(&activity).await?;
        let mut turn = TurnContext::new(chat, activity, user, conversation);

        let handled = match turn.activity.kind.clone() {
            ActivityKind::Message { .. } => self.handler.on_message(&mut turn).await,
            ActivityKind::MembersAdded { members } => welcome_members(&mut turn, &members).await,
        };

        let flushed = self.flush(&mut turn).await;
        handled?;
        flushed
    }

    async fn flush(&self, turn: &mut TurnContext<'_>) -> BotResult<()> {
        self.user_state.save_changes(&mut turn.user).await?;
        self.conversation_state
            .save_changes(&mut turn.conversation)
            .await
    }
}

/// Greets every added member except the bot itself.
async fn welcome_members(turn: &mut TurnContext<'_>, members: &[String]) -> BotResult<()> {
    for member in members {
        if *member != turn.activity.recipient {
            turn.send_text(messages::WELCOME).await?;
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::LoggingStore;
    use super::*;
    use crate::application::turn::test_support::{RecordingChat, Sent};
    use crate::domain::error::BotError;

    /// Remembers the last message and replies once.
    struct Echo {
        fail: bool,
    }

    #[async_trait]
    impl TurnHandler for Echo {
        async fn on_message(&self, turn: &mut TurnContext<'_>) -> BotResult<()> {
            let text = turn.text().to_string();
            turn.user.set("last", &text)?;
            turn.conversation.set("seen", &true)?;
            if self.fail {
                return Err(BotError::Network("endpoint down".to_string()));
            }
            turn.send_text(&text).await
        }
    }

    #[tokio::test]
    async fn test_members_added_skips_bot() {
        let store = Arc::new(LoggingStore::default());
        let dispatcher = TurnDispatcher::new(store.clone(), Arc::new(Echo { fail: false }));
        let chat = RecordingChat::new("!r");

        let activity = Activity::members_added(
            "!r",
            "@bot:example.org",
            vec!["@bot:example.org".to_string(), "@ann:example.org".to_string()],
        );
        dispatcher.on_turn(&chat, activity).await.unwrap();
        assert_eq!(chat.take(), vec![Sent::Text(messages::WELCOME.to_string())]);

        let only_bot = Activity::members_added("!r", "@bot:example.org", vec!["@bot:example.org".to_string()]);
        dispatcher.on_turn(&chat, only_bot).await.unwrap();
        assert!(chat.take().is_empty());
        assert!(store.take_ops().is_empty());
    }

    #[tokio::test]
    async fn test_bot_join_greets_each_member_in_room() {
        let store = Arc::new(LoggingStore::default());
        let dispatcher = TurnDispatcher::new(store, Arc::new(Echo { fail: false }));
        let chat = RecordingChat::new("!r");

        let activity = Activity::members_added(
            "!r",
            "@bot:example.org",
            vec![
                "@ann:example.org".to_string(),
                "@bot:example.org".to_string(),
                "@bob:example.org".to_string(),
            ],
        );
        dispatcher.on_turn(&chat, activity).await.unwrap();
        assert_eq!(
            chat.take(),
            vec![
                Sent::Text(messages::WELCOME.to_string()),
                Sent::Text(messages::WELCOME.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_flush_user_then_conversation() {
        let store = Arc::new(LoggingStore::default());
        let dispatcher = TurnDispatcher::new(store.clone(), Arc::new(Echo { fail: false }));
        let chat = RecordingChat::new("!r");

        dispatcher
            .on_turn(&chat, Activity::message("!r", "@ann", "@bot", "hoi"))
            .await
            .unwrap();
        assert_eq!(
            store.take_ops(),
            vec!["write user/!r/@ann", "write conversation/!r"]
        );

        // Nothing changed on the second identical turn.
        dispatcher
            .on_turn(&chat, Activity::message("!r", "@ann", "@bot", "hoi"))
            .await
            .unwrap();
        assert!(store.take_ops().is_empty());
    }

    #[tokio::test]
    async fn test_failed_turn_still_flushes() {
        let store = Arc::new(LoggingStore::default());
        let dispatcher = TurnDispatcher::new(store.clone(), Arc::new(Echo { fail: true }));
        let chat = RecordingChat::new("!r");

        let err = dispatcher
            .on_turn(&chat, Activity::message("!r", "@ann", "@bot", "hoi"))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Network(_)));
        assert_eq!(
            store.take_ops(),
            vec!["write user/!r/@ann", "write conversation/!r"]
        );
        assert!(chat.take().is_empty());
    }
}
