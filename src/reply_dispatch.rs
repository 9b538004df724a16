use super::*;

#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReplyOutcome {
    NoPendingTicket,
    OrphanedTicket(TicketId),
    NothingToRelay(TicketId),
    Delivered(TicketId),
    Failed(TicketId),
}

/// Arms the reply slot for `ticket_id`. Last write wins.
pub(super) async fn arm_reply(state: &AppState, ticket_id: TicketId) -> Result<()> {
    state
        .store
        .set_pending_reply(state.config.admin_id, ticket_id)
        .await?;
    info!("reply mode armed for ticket #{}", ticket_id);
    Ok(())
}

/// Relays one administrator (or channel) message to the author of the pending ticket.
///
/// A send attempt consumes the slot whether or not delivery succeeded. A message
/// with nothing relayable leaves the slot armed for the next one.
pub(super) async fn dispatch_reply<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
    origin: ReplyOrigin,
    content: &Content,
) -> Result<ReplyOutcome> {
    let admin_id = state.config.admin_id;
    let Some(ticket_id) = state.store.pending_reply(admin_id).await? else {
        return Ok(ReplyOutcome::NoPendingTicket);
    };

    let Some(user_id) = state.store.ticket_user(ticket_id).await? else {
        warn!("ticket #{} has no author, dropping reply mode", ticket_id);
        state.store.clear_pending_reply(admin_id).await?;
        return Ok(ReplyOutcome::OrphanedTicket(ticket_id));
    };

    let Some(delivery) = build_reply_delivery(ticket_id, content) else {
        return Ok(ReplyOutcome::NothingToRelay(ticket_id));
    };

    let (outcome, notice) = match messenger.send(chat_id_from_user_id(user_id), delivery).await {
        Ok(()) => {
            info!("reply to ticket #{} delivered", ticket_id);
            (ReplyOutcome::Delivered(ticket_id), REPLY_SENT.to_string())
        }
        Err(err) => {
            error!("reply to ticket #{} failed: {:#}", ticket_id, err);
            (ReplyOutcome::Failed(ticket_id), send_error_text(&err))
        }
    };

    state.store.clear_pending_reply(admin_id).await?;

    // Channel forwards have no administrator chat to answer in.
    if origin == ReplyOrigin::AdminChat {
        messenger.send(chat_id, Outbound::text(notice)).await?;
    }
    Ok(outcome)
}
