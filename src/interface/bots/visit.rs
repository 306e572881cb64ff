//! # Visit Bot
//!
//! Variant A: offers events or attractions, shows a carousel of cards for the
//! chosen kind and asks whether the user wants to see something else. Typing
//! `Reset` wipes all state for the conversation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::data::DataService;
use crate::application::dialog::{DialogRunner, Prompt, StepOutcome, StepValue, Waterfall};
use crate::application::dispatcher::TurnHandler;
use crate::application::turn::TurnContext;
use crate::domain::error::{BotError, BotResult};
use crate::domain::types::RequestKind;
use crate::strings::messages;

pub const WHAT_DATA: &str = "what_data";
pub const RESET_DIALOG: &str = "reset_dialog";
pub const WANTS_INFO_PROPERTY: &str = "wants_info";

pub struct VisitBot {
    dialogs: DialogRunner,
}

impl VisitBot {
    pub fn new(data: Arc<DataService>) -> Self {
        Self {
            dialogs: DialogRunner::new()
                .add(Arc::new(WhatData { data }))
                .add(Arc::new(ResetDialog)),
        }
    }
}

#[async_trait]
impl TurnHandler for VisitBot {
    async fn on_message(&self, turn: &mut TurnContext<'_>) -> BotResult<()> {
        if turn.text() == messages::RESET_KEYWORD {
            self.dialogs.begin(turn, RESET_DIALOG).await?;
            return Ok(());
        }

        self.dialogs.resume(turn).await?;

        if !turn.responded() {
            if turn.user.get_or(WANTS_INFO_PROPERTY, true)? {
                self.dialogs.begin(turn, WHAT_DATA).await?;
            } else {
                turn.send_text(messages::WONT_BOTHER).await?;
                turn.user.set(WANTS_INFO_PROPERTY, &true)?;
            }
        }
        Ok(())
    }
}

/// Ask -> fetch and show -> remember whether the user wants more.
struct WhatData {
    data: Arc<DataService>,
}

#[async_trait]
impl Waterfall for WhatData {
    fn id(&self) -> &'static str {
        WHAT_DATA
    }

    fn step_count(&self) -> usize {
        3
    }

    async fn run_step(
        &self,
        index: usize,
        turn: &mut TurnContext<'_>,
        result: Option<StepValue>,
    ) -> BotResult<StepOutcome> {
        match index {
            0 => {
                let choices: Vec<String> = RequestKind::ALL
                    .iter()
                    .map(|kind| kind.label().to_string())
                    .collect();
                turn.send_choices(messages::WHAT_TO_SEE, &choices).await?;
                Ok(StepOutcome::Suspend)
            }
            1 => {
                let label = result
                    .as_ref()
                    .and_then(StepValue::as_text)
                    .unwrap_or_default();

                let cards = match self.data.fetch_cards(label).await {
                    Ok(cards) => cards,
                    Err(BotError::InvalidRequest(choice)) => {
                        tracing::debug!("Unrecognized choice '{}', restarting", choice);
                        turn.send_text(messages::PICK_A_BUTTON).await?;
                        return Ok(StepOutcome::Replace(WHAT_DATA));
                    }
                    Err(e) => return Err(e),
                };

                if cards.is_empty() {
                    turn.send_text(messages::NOTHING_FOUND).await?;
                } else {
                    turn.send_cards(&cards).await?;
                }
                Ok(StepOutcome::Prompt(Prompt::confirm(messages::SEE_SOMETHING_ELSE)))
            }
            _ => {
                let wants_info = result.and_then(|v| v.as_bool()).unwrap_or(true);
                turn.user.set(WANTS_INFO_PROPERTY, &wants_info)?;
                Ok(StepOutcome::End(None))
            }
        }
    }
}

/// Forgets everything about the user and the conversation.
struct ResetDialog;

#[async_trait]
impl Waterfall for ResetDialog {
    fn id(&self) -> &'static str {
        RESET_DIALOG
    }

    fn step_count(&self) -> usize {
        1
    }

    async fn run_step(
        &self,
        _index: usize,
        turn: &mut TurnContext<'_>,
        _result: Option<StepValue>,
    ) -> BotResult<StepOutcome> {
        turn.user.clear();
        turn.conversation.clear();
        turn.send_text(messages::CONVERSATION_RESET).await?;
        Ok(StepOutcome::CancelAll)
    }
}
