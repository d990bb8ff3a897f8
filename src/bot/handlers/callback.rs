use teloxide::prelude::*;

use crate::bot::handlers::{actor_from, BotHandler, HandlerResult};
use crate::delivery::{Directive, ScheduledAction};

pub async fn callback_handler(q: CallbackQuery, handler: &BotHandler) -> HandlerResult {
    let Some(message) = q.message.as_ref() else {
        handler.delivery.execute(Vec::new(), Some(q.id)).await;
        return Ok(());
    };
    let actor = actor_from(&q.from, message.chat.id);

    let directives = match q.data.as_deref() {
        Some(data) => {
            tracing::debug!(
                "Callback received: '{}' from user {} in chat {}",
                data,
                actor.user.0,
                actor.chat.0
            );
            handler.app.handle_callback(&actor, Some(message.id), data).await
        }
        None => vec![Directive::ack("")],
    };
    handler.delivery.execute(directives, Some(q.id)).await;
    Ok(())
}

/// Consumes deferred actions one at a time until every sender is gone.
pub async fn run_scheduled_actions(
    handler: BotHandler,
    mut actions: tokio::sync::mpsc::UnboundedReceiver<ScheduledAction>,
) {
    while let Some(action) = actions.recv().await {
        let directives = handler.app.on_scheduled(&action);
        handler.delivery.execute(directives, None).await;
    }
    tracing::info!("Scheduled action loop stopped");
}
