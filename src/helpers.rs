use super::*;

pub(super) fn ticket_header(ticket_id: TicketId) -> String {
    format!("{} #{}", SUBMISSION_HEADER, ticket_id)
}

pub(super) fn reply_prefix(ticket_id: TicketId) -> String {
    format!("↩️ Ответ на анонимку #{}:\n\n", ticket_id)
}

pub(super) fn reply_mode_prompt(ticket_id: TicketId) -> String {
    format!(
        "✍️ Ответ на анонимку #{}\nОтправь следующее сообщение.\nОтмена: /cancel",
        ticket_id
    )
}

pub(super) fn send_error_text(err: &anyhow::Error) -> String {
    format!("❌ Ошибка отправки: {}", err)
}

pub(super) fn submission_ack(channel_handle: Option<&str>) -> String {
    match channel_handle {
        Some(handle) if !handle.trim().is_empty() => {
            format!("{} Ответ будет в канале {}.", SUBMISSION_ACK, handle.trim())
        }
        _ => SUBMISSION_ACK.to_string(),
    }
}

/// What the administrator sees for a new ticket.
pub(super) fn build_admin_notification(ticket_id: TicketId, content: &Content) -> Outbound {
    let header = ticket_header(ticket_id);
    let body = match content {
        Content::Text(text) => OutboundBody::Text(format!("{}\n\n{}", header, text)),
        Content::Photo { file_id, caption } => OutboundBody::Photo {
            file_id: file_id.clone(),
            caption: header_caption(&header, caption.as_deref()),
        },
        Content::Video { file_id, caption } => OutboundBody::Video {
            file_id: file_id.clone(),
            caption: header_caption(&header, caption.as_deref()),
        },
        Content::Unsupported => {
            OutboundBody::Text(format!("{}\n\n{}", header, UNSUPPORTED_NOTICE))
        }
    };
    Outbound::new(body).with_reply_button(ticket_id)
}

fn header_caption(header: &str, caption: Option<&str>) -> String {
    format!("{}\n\n{}", header, caption.unwrap_or("")).trim().to_string()
}

/// What the original sender receives, or `None` when there is nothing to relay.
pub(super) fn build_reply_delivery(ticket_id: TicketId, content: &Content) -> Option<Outbound> {
    let prefix = reply_prefix(ticket_id);
    let body = match content {
        Content::Text(text) if !is_cancel_command(text) => {
            OutboundBody::Text(format!("{}{}", prefix, text))
        }
        Content::Text(_) | Content::Unsupported => return None,
        Content::Photo { file_id, caption } => OutboundBody::Photo {
            file_id: file_id.clone(),
            caption: format!("{}{}", prefix, caption.as_deref().unwrap_or("")),
        },
        Content::Video { file_id, caption } => OutboundBody::Video {
            file_id: file_id.clone(),
            caption: format!("{}{}", prefix, caption.as_deref().unwrap_or("")),
        },
    };
    Some(Outbound::new(body))
}

pub(super) fn build_reply_keyboard(ticket_id: TicketId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        REPLY_BUTTON_LABEL,
        reply_callback_data(ticket_id),
    )]])
}

pub(super) fn reply_callback_data(ticket_id: TicketId) -> String {
    format!("{}{}", REPLY_CALLBACK_PREFIX, ticket_id)
}

pub(super) fn parse_reply_callback(data: &str) -> Option<TicketId> {
    data.strip_prefix(REPLY_CALLBACK_PREFIX)?
        .trim()
        .parse::<TicketId>()
        .ok()
}

pub(super) fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    let cmd = first.trim_start_matches('/');
    Some(cmd.split('@').next().unwrap_or(cmd))
}

pub(super) fn is_cancel_command(text: &str) -> bool {
    text.split_whitespace().count() == 1 && parse_command(text) == Some("cancel")
}

pub(super) fn pick_best_photo(
    photos: &[teloxide::types::PhotoSize],
) -> Option<&teloxide::types::PhotoSize> {
    photos
        .iter()
        .max_by_key(|photo| (photo.width as u64) * (photo.height as u64))
}

pub(super) fn content_from_message(msg: &Message) -> Content {
    if let Some(text) = msg.text() {
        return Content::Text(text.to_string());
    }
    let caption = msg.caption().map(|text| text.to_string());
    if let Some(photo) = msg.photo().and_then(pick_best_photo) {
        return Content::Photo {
            file_id: photo.file.id.clone(),
            caption,
        };
    }
    if let Some(video) = msg.video() {
        return Content::Video {
            file_id: video.file.id.clone(),
            caption,
        };
    }
    Content::Unsupported
}

pub(super) fn envelope_from_message(msg: &Message) -> Envelope {
    let forwarded_from_channel = msg
        .forward_from_chat()
        .filter(|chat| chat.is_channel())
        .map(|chat| chat.id.0);
    Envelope {
        chat_id: msg.chat.id,
        sender: msg.from().map(|user| user.id.0),
        forwarded_from_channel,
        content: content_from_message(msg),
    }
}

pub(super) fn chat_id_from_user_id(user_id: u64) -> ChatId {
    ChatId(user_id as i64)
}

pub(super) fn resolve_token(
    configured: Option<String>,
    env_value: Option<String>,
) -> Result<String> {
    configured
        .into_iter()
        .chain(env_value)
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("bot token missing: set `token` in config or {}", TOKEN_ENV))
}

pub(super) fn resolve_user_id(input: UserIdInput, config_dir: &Path) -> Result<u64> {
    match input {
        UserIdInput::Number(value) => Ok(value),
        UserIdInput::String(raw) => resolve_user_id_string(&raw, config_dir),
        UserIdInput::File { file } => {
            let path = resolve_config_path(&file, config_dir);
            read_user_id_file(&path)
        }
    }
}

pub(super) fn resolve_user_id_string(raw: &str, config_dir: &Path) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("admin_id is empty"));
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return parse_user_id_value(trimmed).context("parse admin_id");
    }
    let path = resolve_config_path(Path::new(trimmed), config_dir);
    read_user_id_file(&path)
}

pub(super) fn resolve_config_path(path: &Path, config_dir: &Path) -> PathBuf {
    if path.is_relative() {
        config_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

pub(super) fn read_user_id_file(path: &Path) -> Result<u64> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read admin_id file {}", path.display()))?;
    parse_user_id_value(contents.trim())
        .with_context(|| format!("parse admin_id from {}", path.display()))
}

pub(super) fn parse_user_id_value(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("admin_id is empty"));
    }
    trimmed.parse::<u64>().context("parse admin_id")
}

pub(super) fn load_config(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_config(&contents, config_dir, std::env::var(TOKEN_ENV).ok())
}

pub(super) fn parse_config(
    contents: &str,
    config_dir: &Path,
    env_token: Option<String>,
) -> Result<Config> {
    let config_file: ConfigFile = toml::from_str(contents).context("parse config")?;
    let token = resolve_token(config_file.token, env_token)?;
    let admin_id = resolve_user_id(config_file.admin_id, config_dir)?;
    let db_path = config_file
        .db_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
    Ok(Config {
        token,
        admin_id,
        channel_id: config_file.channel_id,
        channel_handle: config_file.channel_handle,
        db_path: resolve_config_path(&db_path, config_dir),
    })
}
