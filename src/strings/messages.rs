//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.

pub const WELCOME: &str = "I am a bot that displays the events and attractions in Ghent. \
                           Data is coming from https://visit.gent.be/nl";

/// Typed on its own, wipes everything the bot remembers about the conversation.
pub const RESET_KEYWORD: &str = "Reset";
pub const CONVERSATION_RESET: &str = "Conversation Reset";

pub const WHAT_TO_SEE: &str = "What would you like to see?";
pub const PICK_A_BUTTON: &str = "Please click one of the buttons.";
pub const SEE_SOMETHING_ELSE: &str = "Would you like to see something else?";
pub const NOTHING_FOUND: &str = "I couldn't find anything to show right now.";
pub const WONT_BOTHER: &str = "Alright, I won't bother you until you send me another message.";

pub const CONFIRM_YES: &str = "Yes";
pub const CONFIRM_NO: &str = "No";

pub const ASK_NAME: &str = "What is your name?";

pub fn name_stored(name: &str) -> String {
    format!("Thanks {name}, I'll remember that.")
}

pub fn name_announced(name: &str) -> String {
    format!("Your name is {name}.")
}
