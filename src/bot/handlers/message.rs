use teloxide::prelude::*;

use crate::bot::commands::Command;
use crate::bot::handlers::{actor_from, BotHandler, HandlerResult};

pub async fn command_handler(msg: Message, cmd: Command, handler: &BotHandler) -> HandlerResult {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let actor = actor_from(user, msg.chat.id);
    let directives = handler.app.handle_command(&actor, cmd);
    handler.delivery.execute(directives, None).await;
    Ok(())
}
