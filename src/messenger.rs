use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum OutboundBody {
    Text(String),
    Photo { file_id: String, caption: String },
    Video { file_id: String, caption: String },
}

/// A message to deliver, optionally carrying the reply button for a ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Outbound {
    pub(super) body: OutboundBody,
    pub(super) reply_button: Option<TicketId>,
}

impl Outbound {
    pub(super) fn new(body: OutboundBody) -> Self {
        Self {
            body,
            reply_button: None,
        }
    }

    pub(super) fn text(text: impl Into<String>) -> Self {
        Self::new(OutboundBody::Text(text.into()))
    }

    pub(super) fn with_reply_button(mut self, ticket_id: TicketId) -> Self {
        self.reply_button = Some(ticket_id);
        self
    }
}

/// The slice of the Bot API the relay needs.
#[async_trait]
pub(super) trait Messenger: Send + Sync {
    async fn send(&self, chat_id: ChatId, outbound: Outbound) -> Result<()>;

    async fn answer_click(&self, click_id: &str, text: Option<&str>, alert: bool) -> Result<()>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send(&self, chat_id: ChatId, outbound: Outbound) -> Result<()> {
        let markup = outbound.reply_button.map(build_reply_keyboard);
        match outbound.body {
            OutboundBody::Text(text) => {
                let mut request = self.send_message(chat_id, text);
                if let Some(kb) = markup {
                    request = request.reply_markup(kb);
                }
                request.await?;
            }
            OutboundBody::Photo { file_id, caption } => {
                let mut request = self
                    .send_photo(chat_id, InputFile::file_id(file_id))
                    .caption(caption);
                if let Some(kb) = markup {
                    request = request.reply_markup(kb);
                }
                request.await?;
            }
            OutboundBody::Video { file_id, caption } => {
                let mut request = self
                    .send_video(chat_id, InputFile::file_id(file_id))
                    .caption(caption);
                if let Some(kb) = markup {
                    request = request.reply_markup(kb);
                }
                request.await?;
            }
        }
        Ok(())
    }

    async fn answer_click(&self, click_id: &str, text: Option<&str>, alert: bool) -> Result<()> {
        let mut request = self.answer_callback_query(click_id.to_string());
        if let Some(text) = text {
            request = request.text(text).show_alert(alert);
        }
        request.await?;
        Ok(())
    }
}
