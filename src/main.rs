use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::Parser;
use log::{error, info, warn};
use serde::Deserialize;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, Message};

mod callback_handlers;
mod helpers;
mod message_handlers;
mod messenger;
mod reply_dispatch;
mod store;

use helpers::*;
use messenger::{Messenger, Outbound, OutboundBody};
use store::Store;

const DEFAULT_DB_PATH: &str = "inbox.db";
const TOKEN_ENV: &str = "BOT_TOKEN";
const REPLY_CALLBACK_PREFIX: &str = "reply:";

const SUBMISSION_ACK: &str = "Принято 🖤";
const SUBMISSION_HEADER: &str = "📩 Анонимные вопросы";
const UNSUPPORTED_NOTICE: &str = "(Неподдерживаемый тип сообщения)";
const REPLY_BUTTON_LABEL: &str = "↩️ Ответить";
const REPLY_MODE_ON: &str = "Режим ответа включён";
const REPLY_MODE_CANCELLED: &str = "Режим ответа отменён.";
const REPLY_SENT: &str = "✅ Ответ отправлен.";
const NOT_FOR_YOU: &str = "Не для тебя.";

type TicketId = i64;

#[derive(Debug, Clone)]
struct Config {
    token: String,
    admin_id: u64,
    channel_id: i64,
    channel_handle: Option<String>,
    db_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    token: Option<String>,
    admin_id: UserIdInput,
    channel_id: i64,
    channel_handle: Option<String>,
    db_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserIdInput {
    Number(u64),
    String(String),
    File { file: PathBuf },
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    config: PathBuf,
}

struct AppState {
    config: Config,
    store: Store,
}

/// Relayable payload of an inbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Content {
    Text(String),
    Photo {
        file_id: String,
        caption: Option<String>,
    },
    Video {
        file_id: String,
        caption: Option<String>,
    },
    Unsupported,
}

/// The parts of a Telegram message the router looks at.
#[derive(Clone, Debug)]
struct Envelope {
    chat_id: ChatId,
    sender: Option<u64>,
    forwarded_from_channel: Option<i64>,
    content: Content,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReplyOrigin {
    AdminChat,
    ChannelForward,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum InboundEvent {
    Cancel,
    Reply { origin: ReplyOrigin, content: Content },
    Submission { sender: u64, content: Content },
    Ignored,
}

/// An inline reply button activation.
#[derive(Clone, Debug)]
struct ReplyClick {
    id: String,
    from: u64,
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args.config)?;
    let store = Store::open(&config.db_path)?;
    info!(
        "inbox opened at {} (admin {}, channel {})",
        config.db_path.display(),
        config.admin_id,
        config.channel_id
    );

    let bot = Bot::new(config.token.clone());
    let state = std::sync::Arc::new(AppState { config, store });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handlers::handle_message))
        .branch(Update::filter_callback_query().endpoint(callback_handlers::handle_callback));

    info!("polling starting");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
