//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the `matrix_sdk`.
//! This module acts as the bridge between the generic `ChatProvider` interface used by the bot's core logic
//! and the specific implementation details of the Matrix SDK.
//!
//! Matrix has no buttons or carousels, so choices become a bullet list the user
//! answers by typing a label, and a card group becomes one markdown message.

use crate::domain::traits::ChatProvider;
use crate::domain::types::Card;
use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<(), String> {
        tracing::info!("Bot sending message to {}: {}", self.room_id(), content);
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn send_choices(&self, prompt: &str, choices: &[String]) -> Result<(), String> {
        self.send_message(&render_choices(prompt, choices)).await
    }

    async fn send_cards(&self, cards: &[Card]) -> Result<(), String> {
        self.send_message(&render_cards(cards)).await
    }
}

pub fn render_choices(prompt: &str, choices: &[String]) -> String {
    let mut out = String::from(prompt);
    out.push('\n');
    for choice in choices {
        out.push_str(&format!("\n- **{}**", choice));
    }
    out
}

pub fn render_cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn render_card(card: &Card) -> String {
    let mut out = match &card.link {
        Some(link) => format!("### [{}]({})", card.title, link),
        None => format!("### {}", card.title),
    };
    if let Some(subtitle) = &card.subtitle {
        out.push_str(&format!("\n\n{}", subtitle));
    }
    if let Some(image) = &card.image_url {
        out.push_str(&format!("\n\n[🖼️ Image]({})", image));
    }
    if let Some(link) = &card.link {
        out.push_str(&format!(" · [Open Page]({})", link));
    }
    out
}

/// Users a join of `joined` adds to the conversation. When the bot itself joins,
/// everyone already in the room counts as added.
pub fn added_members(joined: &str, own_user_id: &str, room_members: &[String]) -> Vec<String> {
    if joined == own_user_id {
        room_members.to_vec()
    } else {
        vec![joined.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_choices() {
        let out = render_choices(
            "What would you like to see?",
            &["Events".to_string(), "Attractions".to_string()],
        );
        assert_eq!(out, "What would you like to see?\n\n- **Events**\n- **Attractions**");
    }

    #[test]
    fn test_render_cards() {
        let cards = vec![
            Card {
                title: "Gravensteen".to_string(),
                image_url: Some("https://img/1.jpg".to_string()),
                subtitle: Some("Castle".to_string()),
                link: Some("https://visit.gent.be/gravensteen".to_string()),
            },
            Card {
                title: "Belfort".to_string(),
                image_url: None,
                subtitle: None,
                link: None,
            },
        ];
        let out = render_cards(&cards);
        assert!(out.starts_with("### [Gravensteen](https://visit.gent.be/gravensteen)\n\nCastle"));
        assert!(out.contains("[🖼️ Image](https://img/1.jpg) · [Open Page](https://visit.gent.be/gravensteen)"));
        assert!(out.ends_with("---\n\n### Belfort"));
    }

    #[test]
    fn test_added_members_on_own_join() {
        let room = vec!["@ann:gent.be".to_string(), "@bot:gent.be".to_string()];
        assert_eq!(added_members("@bot:gent.be", "@bot:gent.be", &room), room);
    }

    #[test]
    fn test_added_members_on_user_join() {
        let room = vec!["@ann:gent.be".to_string(), "@bot:gent.be".to_string()];
        assert_eq!(
            added_members("@bob:gent.be", "@bot:gent.be", &room),
            vec!["@bob:gent.be".to_string()]
        );
    }
}
