use super::*;

pub(super) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: std::sync::Arc<AppState>,
) -> Result<()> {
    let click = ReplyClick {
        id: q.id.clone(),
        from: q.from.id.0,
        data: q.data.clone(),
    };
    process_click(&bot, &state, click).await
}

pub(super) async fn process_click<M: Messenger>(
    messenger: &M,
    state: &AppState,
    click: ReplyClick,
) -> Result<()> {
    if click.from != state.config.admin_id {
        warn!("rejected reply click from {}", click.from);
        messenger
            .answer_click(&click.id, Some(NOT_FOR_YOU), true)
            .await?;
        return Ok(());
    }

    let Some(ticket_id) = click.data.as_deref().and_then(parse_reply_callback) else {
        messenger.answer_click(&click.id, None, false).await?;
        return Ok(());
    };

    reply_dispatch::arm_reply(state, ticket_id).await?;
    messenger
        .answer_click(&click.id, Some(REPLY_MODE_ON), false)
        .await?;
    messenger
        .send(
            chat_id_from_user_id(state.config.admin_id),
            Outbound::text(reply_mode_prompt(ticket_id)),
        )
        .await
}
