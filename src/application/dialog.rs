//! # Dialog Runner
//!
//! A small waterfall runner. Each dialog is an ordered list of steps; a step may
//! send messages and then either suspend until the next inbound message, issue a
//! prompt, hand a value to the next step, end, restart itself or cancel everything.
//!
//! The dialog stack lives in the conversation bag under `dialog_state`, so it is
//! persisted with the rest of the conversation state at the end of the turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::turn::TurnContext;
use crate::domain::error::{BotError, BotResult};
use crate::strings::messages;

pub const DIALOG_STATE_PROPERTY: &str = "dialog_state";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptKind {
    /// Any non-empty reply.
    Text,
    /// Yes or no.
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Text,
            text: text.into(),
        }
    }

    pub fn confirm(text: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Confirm,
            text: text.into(),
        }
    }
}

/// Value handed from one step to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    Text(String),
    Bool(bool),
}

impl StepValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StepValue::Text(s) => Some(s),
            StepValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StepValue::Bool(b) => Some(*b),
            StepValue::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Wait for the next message; the following step receives its raw text.
    Suspend,
    /// Send a prompt and wait; the following step receives the recognized answer.
    Prompt(Prompt),
    /// Pop this dialog, resuming the parent (if any) with the value.
    End(Option<StepValue>),
    /// Pop this dialog and start `id` from its first step.
    Replace(&'static str),
    /// Drop the whole stack.
    CancelAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTurnStatus {
    /// No dialog was active.
    Empty,
    Waiting,
    Complete,
    Cancelled,
}

#[async_trait]
pub trait Waterfall: Send + Sync {
    fn id(&self) -> &'static str;

    fn step_count(&self) -> usize;

    async fn run_step(
        &self,
        index: usize,
        turn: &mut TurnContext<'_>,
        result: Option<StepValue>,
    ) -> BotResult<StepOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DialogInstance {
    id: String,
    step: usize,
    #[serde(default)]
    pending: Option<Prompt>,
}

impl DialogInstance {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            step: 0,
            pending: None,
        }
    }
}

#[derive(Default)]
pub struct DialogRunner {
    dialogs: HashMap<&'static str, Arc<dyn Waterfall>>,
}

impl DialogRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, dialog: Arc<dyn Waterfall>) -> Self {
        self.dialogs.insert(dialog.id(), dialog);
        self
    }

    fn find(&self, id: &str) -> BotResult<Arc<dyn Waterfall>> {
        self.dialogs
            .get(id)
            .cloned()
            .ok_or_else(|| BotError::UnknownDialog(id.to_string()))
    }

    fn load_stack(turn: &TurnContext<'_>) -> Vec<DialogInstance> {
        turn.conversation
            .get(DIALOG_STATE_PROPERTY)
            .unwrap_or_default()
    }

    fn store_stack(turn: &mut TurnContext<'_>, stack: &[DialogInstance]) -> BotResult<()> {
        if stack.is_empty() {
            turn.conversation.remove(DIALOG_STATE_PROPERTY);
            Ok(())
        } else {
            turn.conversation.set(DIALOG_STATE_PROPERTY, stack)
        }
    }

    /// Pushes `id` on the stack and runs its first step.
    pub async fn begin(&self, turn: &mut TurnContext<'_>, id: &str) -> BotResult<DialogTurnStatus> {
        self.find(id)?;
        tracing::debug!("Beginning dialog '{}' in {}", id, turn.activity.conversation_id);

        let mut stack = Self::load_stack(turn);
        stack.push(DialogInstance::new(id));
        let status = self.run(turn, &mut stack, None).await?;
        Self::store_stack(turn, &stack)?;
        Ok(status)
    }

    /// Feeds the inbound message to the active dialog, if any.
    ///
    /// A reply that does not answer a pending prompt re-sends the prompt and leaves
    /// the dialog where it was. When a step fails the stored stack is left untouched,
    /// so the same step runs again on the next message. A stored stack naming a
    /// dialog this runner does not know is dropped and reported as `Empty`.
    pub async fn resume(&self, turn: &mut TurnContext<'_>) -> BotResult<DialogTurnStatus> {
        let mut stack = Self::load_stack(turn);
        if let Some(stale) = stack.iter().find(|d| !self.dialogs.contains_key(d.id.as_str())) {
            tracing::warn!(
                "Dropping dialog stack with unregistered dialog '{}' in {}",
                stale.id,
                turn.activity.conversation_id
            );
            self.cancel_all(turn)?;
            return Ok(DialogTurnStatus::Empty);
        }

        let Some(top) = stack.last_mut() else {
            return Ok(DialogTurnStatus::Empty);
        };

        let result = match top.pending.take() {
            None => Some(StepValue::Text(turn.text().to_string())),
            Some(prompt) => match recognize(prompt.kind, turn.text()) {
                Some(value) => Some(value),
                None => {
                    tracing::debug!("Reply '{}' does not answer prompt, asking again", turn.text());
                    send_prompt(turn, &prompt).await?;
                    return Ok(DialogTurnStatus::Waiting);
                }
            },
        };

        let status = self.run(turn, &mut stack, result).await?;
        Self::store_stack(turn, &stack)?;
        Ok(status)
    }

    pub fn cancel_all(&self, turn: &mut TurnContext<'_>) -> BotResult<()> {
        Self::store_stack(turn, &[])
    }

    async fn run(
        &self,
        turn: &mut TurnContext<'_>,
        stack: &mut Vec<DialogInstance>,
        mut result: Option<StepValue>,
    ) -> BotResult<DialogTurnStatus> {
        loop {
            let Some(top) = stack.last_mut() else {
                return Ok(DialogTurnStatus::Complete);
            };
            let dialog = self.find(&top.id)?;
            if top.step >= dialog.step_count() {
                stack.pop();
                continue;
            }

            let index = top.step;
            top.step += 1;

            match dialog.run_step(index, turn, result.take()).await? {
                StepOutcome::Suspend => return Ok(DialogTurnStatus::Waiting),
                StepOutcome::Prompt(prompt) => {
                    send_prompt(turn, &prompt).await?;
                    if let Some(top) = stack.last_mut() {
                        top.pending = Some(prompt);
                    }
                    return Ok(DialogTurnStatus::Waiting);
                }
                StepOutcome::End(value) => {
                    stack.pop();
                    result = value;
                }
                StepOutcome::Replace(id) => {
                    self.find(id)?;
                    stack.pop();
                    stack.push(DialogInstance::new(id));
                }
                StepOutcome::CancelAll => {
                    stack.clear();
                    return Ok(DialogTurnStatus::Cancelled);
                }
            }
        }
    }
}

async fn send_prompt(turn: &mut TurnContext<'_>, prompt: &Prompt) -> BotResult<()> {
    match prompt.kind {
        PromptKind::Text => turn.send_text(&prompt.text).await,
        PromptKind::Confirm => {
            let choices = [messages::CONFIRM_YES.to_string(), messages::CONFIRM_NO.to_string()];
            turn.send_choices(&prompt.text, &choices).await
        }
    }
}

fn recognize(kind: PromptKind, reply: &str) -> Option<StepValue> {
    let reply = reply.trim();
    match kind {
        PromptKind::Text if reply.is_empty() => None,
        PromptKind::Text => Some(StepValue::Text(reply.to_string())),
        PromptKind::Confirm => match reply.to_lowercase().as_str() {
            "yes" | "y" | "ja" | "true" | "ok" => Some(StepValue::Bool(true)),
            "no" | "n" | "nee" | "false" => Some(StepValue::Bool(false)),
            _ => None,
        },
    }
}
