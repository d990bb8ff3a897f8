use std::time::Duration;

use teloxide::types::{ChatId, MessageId, UserId};
use uuid::Uuid;

use crate::error::QuizError;
use crate::session_id::SessionId;
use crate::utils::markdown::escape_markdown;

/// What a button does when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn callback(text: impl Into<String>, data: impl ToString) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.to_string()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Rows of buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// Groups the parallel copies of one broadcast that offer "another fact".
pub type FactGroupId = Uuid;

/// Marks a sent message as carrying a fact that may be swapped later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactAttachment {
    pub group: FactGroupId,
    pub subject: String,
    /// Message text without the fact section, already escaped.
    pub body: String,
    /// The fact currently shown, plain text.
    pub fact: String,
}

/// Replacement content for an edited message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditBody {
    Text(String),
    Caption(String),
}

/// Deferred self-invocations. They carry identifiers only; the handler
/// re-fetches live state when they fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledAction {
    SimulatedMove {
        chat: ChatId,
        session: SessionId,
        turn: usize,
    },
    NextRound {
        chat: ChatId,
        session: SessionId,
        turn: usize,
    },
    SprintOver {
        user: UserId,
        session: SessionId,
    },
}

impl ScheduledAction {
    pub fn name(&self) -> &'static str {
        match self {
            ScheduledAction::SimulatedMove { .. } => "simulated_move",
            ScheduledAction::NextRound { .. } => "next_round",
            ScheduledAction::SprintOver { .. } => "sprint_over",
        }
    }
}

/// Outbound instruction produced by the engines and executed by the
/// delivery layer. Texts are MarkdownV2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    SendMessage {
        chat: ChatId,
        text: String,
        buttons: Option<Keyboard>,
        fact: Option<FactAttachment>,
    },
    EditMessage {
        chat: ChatId,
        message_id: MessageId,
        body: EditBody,
        buttons: Option<Keyboard>,
    },
    SendPhoto {
        chat: ChatId,
        image: String,
        caption: String,
        buttons: Option<Keyboard>,
    },
    ScheduleAfter {
        delay: Duration,
        payload: ScheduledAction,
    },
    /// Answer to the button press being handled.
    Ack { text: String, alert: bool },
}

impl Directive {
    pub fn message(chat: ChatId, text: impl Into<String>) -> Self {
        Directive::SendMessage {
            chat,
            text: text.into(),
            buttons: None,
            fact: None,
        }
    }

    pub fn with_buttons(chat: ChatId, text: impl Into<String>, buttons: Keyboard) -> Self {
        Directive::SendMessage {
            chat,
            text: text.into(),
            buttons: Some(buttons),
            fact: None,
        }
    }

    pub fn edit_text(chat: ChatId, message_id: MessageId, text: impl Into<String>) -> Self {
        Directive::EditMessage {
            chat,
            message_id,
            body: EditBody::Text(text.into()),
            buttons: None,
        }
    }

    pub fn schedule(delay: Duration, payload: ScheduledAction) -> Self {
        Directive::ScheduleAfter { delay, payload }
    }

    pub fn ack(text: impl Into<String>) -> Self {
        Directive::Ack {
            text: text.into(),
            alert: false,
        }
    }

    /// User-facing notice for a failed action, sent as a message.
    pub fn notice(chat: ChatId, error: &QuizError) -> Self {
        Directive::message(chat, format!("⚠️ {}", escape_markdown(error.notice())))
    }

    /// User-facing notice for a failed button press, as an acknowledgment.
    pub fn ack_error(error: &QuizError) -> Self {
        Directive::Ack {
            text: error.notice().to_string(),
            alert: error.is_alert(),
        }
    }

    /// Text of a send/edit/photo directive, for logging and tests.
    pub fn text(&self) -> Option<&str> {
        match self {
            Directive::SendMessage { text, .. } => Some(text),
            Directive::EditMessage { body: EditBody::Text(text), .. } => Some(text),
            Directive::EditMessage { body: EditBody::Caption(text), .. } => Some(text),
            Directive::SendPhoto { caption, .. } => Some(caption),
            Directive::Ack { text, .. } => Some(text),
            Directive::ScheduleAfter { .. } => None,
        }
    }

    /// Target chat of a send/edit/photo directive.
    pub fn chat(&self) -> Option<ChatId> {
        match self {
            Directive::SendMessage { chat, .. }
            | Directive::EditMessage { chat, .. }
            | Directive::SendPhoto { chat, .. } => Some(*chat),
            Directive::ScheduleAfter { .. } | Directive::Ack { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_is_escaped() {
        let directive = Directive::notice(ChatId(1), &QuizError::SessionNotFound);
        assert_eq!(directive.text(), Some("⚠️ Матч не найден\\."));
        assert_eq!(directive.chat(), Some(ChatId(1)));
    }

    #[test]
    fn test_ack_error_is_plain_text() {
        let directive = Directive::ack_error(&QuizError::WrongTurn);
        assert_eq!(
            directive,
            Directive::Ack {
                text: "Сейчас не ваш ход.".to_string(),
                alert: false
            }
        );
    }
}
