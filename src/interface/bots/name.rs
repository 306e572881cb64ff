//! # Name Bot
//!
//! Variant B: asks for the user's name and remembers it. Once a name is stored,
//! later messages get it announced back.

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::data::{DataService, text_field};
use crate::application::dialog::{DialogRunner, Prompt, StepOutcome, StepValue, Waterfall};
use crate::application::dispatcher::TurnHandler;
use crate::application::turn::TurnContext;
use crate::domain::error::BotResult;
use crate::domain::types::RequestKind;
use crate::strings::messages;

pub const ASK_NAME: &str = "ask_name";
pub const ANNOUNCE_NAME: &str = "announce_name";
pub const USER_NAME_PROPERTY: &str = "user_name";

pub struct NameBot {
    dialogs: DialogRunner,
}

impl NameBot {
    pub fn new(data: Arc<DataService>) -> Self {
        Self {
            dialogs: DialogRunner::new()
                .add(Arc::new(AskName))
                .add(Arc::new(AnnounceName { data })),
        }
    }
}

#[async_trait]
impl TurnHandler for NameBot {
    async fn on_message(&self, turn: &mut TurnContext<'_>) -> BotResult<()> {
        self.dialogs.resume(turn).await?;

        if !turn.responded() {
            let known = turn.user.get::<String>(USER_NAME_PROPERTY).is_some();
            let next = if known { ANNOUNCE_NAME } else { ASK_NAME };
            self.dialogs.begin(turn, next).await?;
        }
        Ok(())
    }
}

struct AskName;

#[async_trait]
impl Waterfall for AskName {
    fn id(&self) -> &'static str {
        ASK_NAME
    }

    fn step_count(&self) -> usize {
        2
    }

    async fn run_step(
        &self,
        index: usize,
        turn: &mut TurnContext<'_>,
        result: Option<StepValue>,
    ) -> BotResult<StepOutcome> {
        if index == 0 {
            return Ok(StepOutcome::Prompt(Prompt::text(messages::ASK_NAME)));
        }

        let name = result
            .as_ref()
            .and_then(StepValue::as_text)
            .unwrap_or_default()
            .to_string();
        turn.user.set(USER_NAME_PROPERTY, &name)?;
        turn.send_text(&messages::name_stored(&name)).await?;
        Ok(StepOutcome::End(Some(StepValue::Text(name))))
    }
}

/// Announces the name of a randomly sampled attraction as the user's name,
/// not the stored one. Kept as-is until product decides what it should say.
struct AnnounceName {
    data: Arc<DataService>,
}

#[async_trait]
impl Waterfall for AnnounceName {
    fn id(&self) -> &'static str {
        ANNOUNCE_NAME
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
        let sampled = self.data.sample_record(RequestKind::Attractions).await?;
        match sampled.as_ref().and_then(|record| text_field(record, "name")) {
            Some(name) => turn.send_text(&messages::name_announced(&name)).await?,
            None => turn.send_text(messages::NOTHING_FOUND).await?,
        }
        Ok(StepOutcome::End(None))
    }
}
