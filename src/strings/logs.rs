//! # Log Lines
//!
//! Messages written to the tracing log by the startup and event-loop code.

pub fn config_loaded(user: &str) -> String {
    format!("Loaded configuration for user: {user}")
}

pub fn bot_variant(variant: &str) -> String {
    format!("Running the {variant} bot")
}

pub const LOGIN_SUCCESS: &str = "Logged in successfully!";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}

pub const JOIN_INVITE_SUCCESS: &str = "✅ Successfully joined room!";

pub fn turn_failed(room_id: &str, err: &str) -> String {
    format!("Failed to handle turn in {room_id}: {err}")
}

pub fn room_members_fail(room_id: &str, err: &str) -> String {
    format!("Failed to list members of {room_id}: {err}")
}
