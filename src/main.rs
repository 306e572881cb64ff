//! # Main Entry Point
//!
//! Initializes the bot using the layered architecture:
//! - Domain: Configuration, Types, Traits and Errors
//! - Infrastructure: Matrix, SPARQL, Query files, State storage
//! - Application: Data service, Dialog runner, State, Turn dispatch
//! - Interface: Bot variants
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::{
    Client, RoomMemberships,
    config::SyncSettings,
    room::Room,
    ruma::events::room::{
        member::{MembershipChange, MembershipState, OriginalSyncRoomMemberEvent, StrippedRoomMemberEvent},
        message::{MessageType, SyncRoomMessageEvent},
    },
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::application::data::DataService;
use crate::application::dispatcher::TurnDispatcher;
use crate::application::sampling::RandomSampler;
use crate::domain::config::{AppConfig, BotVariant};
use crate::domain::traits::ChatProvider;
use crate::domain::types::Activity;
use crate::infrastructure::matrix::{MatrixService, added_members};
use crate::infrastructure::queries::QueryCatalog;
use crate::infrastructure::sparql::SparqlClient;
use crate::infrastructure::storage::JsonFileStore;
use crate::strings::logs;

#[derive(Debug, Parser)]
#[command(version, about = "Matrix bot showing events and attractions in Ghent")]
struct Cli {
    /// Path to the YAML configuration
    #[arg(long, default_value = "data/config.yaml")]
    config: PathBuf,

    /// Bot variant to run, overriding the configuration
    #[arg(long, value_enum)]
    variant: Option<BotVariant>,
}

/// Serializes turns so one activity is handled at a time.
#[derive(Clone)]
struct Bot {
    dispatcher: Arc<TurnDispatcher>,
    gate: Arc<Mutex<()>>,
}

impl Bot {
    async fn handle(&self, room: Room, activity: Activity) {
        let chat = MatrixService::new(room);
        let _turn = self.gate.lock().await;
        if let Err(e) = self.dispatcher.on_turn(&chat, activity).await {
            tracing::error!("{}", logs::turn_failed(&chat.room_id(), &e.to_string()));
        }
    }
}

fn is_before(ts_millis: u64, start_time: SystemTime) -> bool {
    UNIX_EPOCH + Duration::from_millis(ts_millis) < start_time
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(variant) = cli.variant {
        config.bot.variant = variant;
    }

    // 2. Logging Setup
    let log_dir = &config.logging.dir;
    if !log_dir.exists() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Clear previous session log
    let log_path = log_dir.join(&config.logging.file);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, &config.logging.file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn,reqwest=warn",
        )
    });

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);
    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("{}", logs::config_loaded(&config.services.matrix.username));
    tracing::info!("{}", logs::bot_variant(&format!("{:?}", config.bot.variant).to_lowercase()));

    // 3. Initialize Infrastructure
    let sparql = Arc::new(SparqlClient::new(config.sparql.endpoint.clone())?);
    tracing::info!("Using SPARQL endpoint {}", sparql.endpoint());
    let store = Arc::new(JsonFileStore::open(&config.storage.path));
    let sampler = Arc::new(RandomSampler::new(config.bot.seed));

    // 4. Initialize Application Components
    let data = Arc::new(DataService::new(
        sparql,
        QueryCatalog::new(&config.sparql.queries_dir),
        sampler,
        config.sparql.language.clone(),
        config.bot.cards_per_reply,
    ));
    let handler = interface::bots::handler_for(config.bot.variant, data);
    let bot = Bot {
        dispatcher: Arc::new(TurnDispatcher::new(store, handler)),
        gate: Arc::new(Mutex::new(())),
    };

    // 5. Matrix Setup
    let client = Client::builder()
        .homeserver_url(&config.services.matrix.homeserver)
        .build()
        .await?;

    client
        .matrix_auth()
        .login_username(
            &config.services.matrix.username,
            &config.services.matrix.password,
        )
        .send()
        .await?;

    tracing::info!("{}", logs::LOGIN_SUCCESS);

    if let Some(name) = &config.services.matrix.display_name {
        tracing::info!("{}", logs::setting_display_name(name));
        if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
            tracing::warn!("{}", logs::set_display_name_fail(&e.to_string()));
        }
    }

    // 6. Event Handlers
    let start_time = SystemTime::now();

    let message_bot = bot.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let bot = message_bot.clone();
        async move {
            let Some(original_msg) = ev.as_original() else {
                return;
            };
            // Ignore events older than start_time
            if is_before(ev.origin_server_ts().get().into(), start_time) {
                return;
            }
            let MessageType::Text(text_content) = &original_msg.content.msgtype else {
                return;
            };
            if original_msg.sender == room.own_user_id() {
                return;
            }

            tracing::info!(
                "Received message from {}: \n{}",
                original_msg.sender,
                text_content.body
            );
            let activity = Activity::message(
                room.room_id().as_str(),
                original_msg.sender.as_str(),
                room.own_user_id().as_str(),
                text_content.body.clone(),
            );
            bot.handle(room, activity).await;
        }
    });

    let member_bot = bot.clone();
    client.add_event_handler(move |ev: OriginalSyncRoomMemberEvent, room: Room| {
        let bot = member_bot.clone();
        async move {
            if is_before(ev.origin_server_ts.get().into(), start_time) {
                return;
            }
            if !matches!(ev.membership_change(), MembershipChange::Joined) {
                return;
            }

            // Our own join adds the whole room; fetch who is already there.
            let room_members: Vec<String> = if ev.state_key == room.own_user_id() {
                match room.members(RoomMemberships::JOIN).await {
                    Ok(members) => members.iter().map(|m| m.user_id().to_string()).collect(),
                    Err(e) => {
                        tracing::warn!(
                            "{}",
                            logs::room_members_fail(room.room_id().as_str(), &e.to_string())
                        );
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            };

            let activity = Activity::members_added(
                room.room_id().as_str(),
                room.own_user_id().as_str(),
                added_members(
                    ev.state_key.as_str(),
                    room.own_user_id().as_str(),
                    &room_members,
                ),
            );
            bot.handle(room, activity).await;
        }
    });

    // Handle Invites
    client.add_event_handler(|ev: StrippedRoomMemberEvent, room: Room| async move {
        if ev.content.membership == MembershipState::Invite {
            tracing::info!("{}", logs::invite_received(room.room_id().as_str()));
            match room.join().await {
                Ok(_) => tracing::info!("{}", logs::JOIN_INVITE_SUCCESS),
                Err(e) => tracing::error!("{}", logs::join_invite_fail(&e.to_string())),
            }
        }
    });

    // 7. Sync until the process is stopped
    tracing::info!("{}", logs::SYNC_LOOP_START);
    if let Err(e) = client.sync(SyncSettings::default()).await {
        tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
        return Err(e.into());
    }

    Ok(())
}
