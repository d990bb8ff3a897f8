use teloxide::prelude::*;

use crate::bot::handlers::{actor_from, BotHandler, HandlerResult};

/// Plain text: display names during match setup, otherwise gentle hints.
pub async fn handle_general_message(msg: Message, handler: &BotHandler) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from(), msg.text()) else {
        return Ok(());
    };
    let actor = actor_from(user, msg.chat.id);
    let directives = handler.app.handle_text(&actor, text);
    if !directives.is_empty() {
        handler.delivery.execute(directives, None).await;
    }
    Ok(())
}
