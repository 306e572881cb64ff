//! # Domain Types
//!
//! Common data structures used across the bot: request kinds, SPARQL documents,
//! flattened records, display cards and inbound activities.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::BotError;

/// What the user can ask the visit bot to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Attractions,
    Events,
}

impl RequestKind {
    pub const ALL: [RequestKind; 2] = [RequestKind::Events, RequestKind::Attractions];

    /// Button label offered to the user.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Attractions => "Attractions",
            RequestKind::Events => "Events",
        }
    }

    /// Name of the query document in the queries directory.
    pub fn query_file(&self) -> &'static str {
        match self {
            RequestKind::Attractions => "attractions.rq",
            RequestKind::Events => "events.rq",
        }
    }

    /// Record field carrying the external page of an item.
    pub fn link_field(&self) -> &'static str {
        match self {
            RequestKind::Attractions => "strurl",
            RequestKind::Events => "page",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RequestKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| BotError::InvalidRequest(s.to_string()))
    }
}

/// One bound value of a SPARQL result row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Term {
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<HashMap<String, Term>>,
}

/// A `application/sparql-results+json` document as returned by the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
    pub head: ResultsHead,
    pub results: ResultsBody,
}

/// A flattened value: plain text, or a split `*List` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }
}

/// Field name to value, one per retained result row.
pub type Record = BTreeMap<String, FieldValue>;

/// A hero card shown in a carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub image_url: Option<String>,
    pub subtitle: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Message { text: String },
    MembersAdded { members: Vec<String> },
}

/// One inbound event for a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub conversation_id: String,
    pub from: String,
    /// The bot's own user id.
    pub recipient: String,
    pub kind: ActivityKind,
}

impl Activity {
    pub fn message(
        conversation_id: impl Into<String>,
        from: impl Into<String>,
        recipient: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            from: from.into(),
            recipient: recipient.into(),
            kind: ActivityKind::Message { text: text.into() },
        }
    }

    pub fn members_added(
        conversation_id: impl Into<String>,
        recipient: impl Into<String>,
        members: Vec<String>,
    ) -> Self {
        let recipient = recipient.into();
        Self {
            conversation_id: conversation_id.into(),
            from: recipient.clone(),
            recipient,
            kind: ActivityKind::MembersAdded { members },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ActivityKind::Message { text } => Some(text),
            ActivityKind::MembersAdded { .. } => None,
        }
    }
}
