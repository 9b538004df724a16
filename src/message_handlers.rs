use super::*;

pub(super) async fn handle_message(
    bot: Bot,
    msg: Message,
    state: std::sync::Arc<AppState>,
) -> Result<()> {
    let envelope = envelope_from_message(&msg);
    process_message(&bot, &state, envelope).await
}

/// Classifies one inbound message. Exactly one event comes out per message.
///
/// `/cancel@botname` from the administrator also cancels, even while a reply is armed.
pub(super) fn route(envelope: &Envelope, config: &Config) -> InboundEvent {
    let from_admin = envelope.sender == Some(config.admin_id);

    if from_admin {
        if let Content::Text(text) = &envelope.content {
            if is_cancel_command(text) {
                return InboundEvent::Cancel;
            }
        }
        return InboundEvent::Reply {
            origin: ReplyOrigin::AdminChat,
            content: envelope.content.clone(),
        };
    }

    if envelope.forwarded_from_channel == Some(config.channel_id) {
        return InboundEvent::Reply {
            origin: ReplyOrigin::ChannelForward,
            content: envelope.content.clone(),
        };
    }

    match envelope.sender {
        Some(sender) => InboundEvent::Submission {
            sender,
            content: envelope.content.clone(),
        },
        None => InboundEvent::Ignored,
    }
}

pub(super) async fn process_message<M: Messenger>(
    messenger: &M,
    state: &AppState,
    envelope: Envelope,
) -> Result<()> {
    match route(&envelope, &state.config) {
        InboundEvent::Cancel => handle_cancel(messenger, state, envelope.chat_id).await,
        InboundEvent::Reply { origin, content } => {
            let outcome =
                reply_dispatch::dispatch_reply(messenger, state, envelope.chat_id, origin, &content)
                    .await?;
            log::debug!("reply attempt: {:?}", outcome);
            Ok(())
        }
        InboundEvent::Submission { sender, content } => {
            handle_submission(messenger, state, envelope.chat_id, sender, &content).await?;
            Ok(())
        }
        InboundEvent::Ignored => Ok(()),
    }
}

async fn handle_cancel<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
) -> Result<()> {
    state
        .store
        .clear_pending_reply(state.config.admin_id)
        .await?;
    info!("reply mode cancelled");
    messenger
        .send(chat_id, Outbound::text(REPLY_MODE_CANCELLED))
        .await
}

pub(super) async fn handle_submission<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
    sender: u64,
    content: &Content,
) -> Result<TicketId> {
    let ticket_id = state.store.create_ticket(sender).await?;
    info!("ticket #{} opened", ticket_id);

    let ack = submission_ack(state.config.channel_handle.as_deref());
    messenger.send(chat_id, Outbound::text(ack)).await?;

    let notification = build_admin_notification(ticket_id, content);
    messenger
        .send(chat_id_from_user_id(state.config.admin_id), notification)
        .await?;
    Ok(ticket_id)
}
