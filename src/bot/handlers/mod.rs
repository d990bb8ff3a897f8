pub mod callback;
pub mod general_message;
pub mod message;

use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*, types::User};

use crate::app::QuizApp;
use crate::delivery::{Actor, TelegramDelivery};

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

/// Builds the actor for an update sent by `user` from `chat`.
pub fn actor_from(user: &User, chat: ChatId) -> Actor {
    Actor::new(user.id, user.first_name.clone(), chat)
}

#[derive(Clone)]
pub struct BotHandler {
    pub app: Arc<QuizApp>,
    pub delivery: TelegramDelivery,
}

impl BotHandler {
    pub fn new(app: Arc<QuizApp>, delivery: TelegramDelivery) -> Self {
        Self { app, delivery }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        use teloxide::dispatching::UpdateFilterExt;

        let command_handler = self.clone();
        let callback_handler = self.clone();
        let text_handler = self.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |msg: Message, cmd: crate::bot::commands::Command| {
                        let handler = command_handler.clone();
                        async move { message::command_handler(msg, cmd, &handler).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                let handler = callback_handler.clone();
                async move { callback::callback_handler(q, &handler).await }
            }))
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let handler = text_handler.clone();
                async move { general_message::handle_general_message(msg, &handler).await }
            }))
    }
}
