use teloxide::types::ChatId;

use crate::delivery::Directive;
use crate::utils::markdown::escape_markdown;

/// Feedback types for different command outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
    Processing,
}

impl FeedbackType {
    pub fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
            FeedbackType::Processing => "⏳",
        }
    }
}

/// Formats a literal message as escaped MarkdownV2 with the feedback emoji.
pub fn format_feedback(feedback_type: FeedbackType, message: &str) -> String {
    format!("{} {}", feedback_type.emoji(), escape_markdown(message))
}

/// Builds feedback directives addressed to one chat
pub struct CommandFeedback {
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(chat_id: ChatId) -> Self {
        Self { chat_id }
    }

    /// Feedback message of the given type
    pub fn send(&self, feedback_type: FeedbackType, message: &str) -> Directive {
        Directive::message(self.chat_id, format_feedback(feedback_type, message))
    }

    pub fn error(&self, message: &str) -> Directive {
        self.send(FeedbackType::Error, message)
    }

    pub fn info(&self, message: &str) -> Directive {
        self.send(FeedbackType::Info, message)
    }

    /// Validation error with a helpful suggestion
    pub fn validation_error(&self, error: &str, suggestion: &str) -> Directive {
        let text = format!(
            "{}\n\n💡 *Подсказка:* {}",
            format_feedback(FeedbackType::Error, error),
            escape_markdown(suggestion)
        );
        Directive::message(self.chat_id, text)
    }
}
