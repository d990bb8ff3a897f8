use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId, ParseMode,
};

use crate::delivery::directive::{ButtonAction, Directive, EditBody, FactAttachment, Keyboard};
use crate::delivery::scheduler::Scheduler;
use crate::facts::ExtraFacts;
use crate::utils::logging::log_delivery_error;

fn markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.into_iter().map(|row| {
        row.into_iter()
            .filter_map(|button| match button.action {
                ButtonAction::Callback(data) => {
                    Some(InlineKeyboardButton::callback(button.text, data))
                }
                ButtonAction::Url(url) => match reqwest::Url::parse(&url) {
                    Ok(url) => Some(InlineKeyboardButton::url(button.text, url)),
                    Err(e) => {
                        tracing::warn!("Dropping button with bad url {}: {}", url, e);
                        None
                    }
                },
            })
            .collect::<Vec<_>>()
    }))
}

/// Executes directives against the Bot API.
///
/// Failures are logged per directive and never abort the rest of the batch.
#[derive(Clone)]
pub struct TelegramDelivery {
    bot: Bot,
    facts: Arc<ExtraFacts>,
    scheduler: Scheduler,
}

impl TelegramDelivery {
    pub fn new(bot: Bot, facts: Arc<ExtraFacts>, scheduler: Scheduler) -> Self {
        Self {
            bot,
            facts,
            scheduler,
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Runs `directives` in order. When handling a button press, the press is
    /// always answered, with the first `Ack` if there is one.
    pub async fn execute(&self, directives: Vec<Directive>, callback_id: Option<String>) {
        let mut ack: Option<(String, bool)> = None;

        for directive in directives {
            match directive {
                Directive::SendMessage {
                    chat,
                    text,
                    buttons,
                    fact,
                } => self.send_message(chat, text, buttons, fact).await,
                Directive::EditMessage {
                    chat,
                    message_id,
                    body,
                    buttons,
                } => self.edit_message(chat, message_id, body, buttons).await,
                Directive::SendPhoto {
                    chat,
                    image,
                    caption,
                    buttons,
                } => self.send_photo(chat, image, caption, buttons).await,
                Directive::ScheduleAfter { delay, payload } => {
                    self.scheduler.schedule(delay, payload);
                }
                Directive::Ack { text, alert } => {
                    if ack.is_none() {
                        ack = Some((text, alert));
                    }
                }
            }
        }

        if let Some(id) = callback_id {
            let mut request = self.bot.answer_callback_query(id);
            if let Some((text, alert)) = ack {
                if !text.is_empty() {
                    request = request.text(text).show_alert(alert);
                }
            }
            if let Err(e) = request.await {
                log_delivery_error("answer_callback_query", 0, &e.to_string());
            }
        }
    }

    async fn send_message(
        &self,
        chat: ChatId,
        text: String,
        buttons: Option<Keyboard>,
        fact: Option<FactAttachment>,
    ) {
        let mut request = self
            .bot
            .send_message(chat, text)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = buttons {
            request = request.reply_markup(markup(keyboard));
        }
        match request.await {
            Ok(sent) => {
                if let Some(attachment) = fact {
                    self.facts.register(&attachment, chat, sent.id);
                }
            }
            Err(e) => log_delivery_error("send_message", chat.0, &e.to_string()),
        }
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: MessageId,
        body: EditBody,
        buttons: Option<Keyboard>,
    ) {
        let result = match body {
            EditBody::Text(text) => {
                let mut request = self
                    .bot
                    .edit_message_text(chat, message_id, text)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = buttons {
                    request = request.reply_markup(markup(keyboard));
                }
                request.await.map(|_| ())
            }
            EditBody::Caption(caption) => {
                let mut request = self
                    .bot
                    .edit_message_caption(chat, message_id)
                    .caption(caption)
                    .parse_mode(ParseMode::MarkdownV2);
                if let Some(keyboard) = buttons {
                    request = request.reply_markup(markup(keyboard));
                }
                request.await.map(|_| ())
            }
        };
        if let Err(e) = result {
            log_delivery_error("edit_message", chat.0, &e.to_string());
        }
    }

    async fn send_photo(
        &self,
        chat: ChatId,
        image: String,
        caption: String,
        buttons: Option<Keyboard>,
    ) {
        let file = match reqwest::Url::parse(&image) {
            Ok(url) => InputFile::url(url),
            Err(_) => InputFile::file_id(image),
        };
        let mut request = self
            .bot
            .send_photo(chat, file)
            .caption(caption)
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(keyboard) = buttons {
            request = request.reply_markup(markup(keyboard));
        }
        if let Err(e) = request.await {
            log_delivery_error("send_photo", chat.0, &e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::directive::Button;

    #[test]
    fn test_markup_drops_invalid_urls() {
        let keyboard = vec![vec![
            Button::callback("Да", "fx"),
            Button::url("Ссылка", "not a url"),
            Button::url("Бот", "https://t.me/capitals_bot?start=coop-w"),
        ]];
        let markup = markup(keyboard);
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
    }
}
