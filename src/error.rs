//! Domain error types.
//!
//! Every failure is handled at the boundary of a single inbound action: the
//! handler turns it into a short notice for the user and carries on.

use thiserror::Error;

/// Errors produced by the quiz engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// Malformed inbound payload (callback data, names, command arguments).
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced match does not exist (anymore).
    #[error("session not found")]
    SessionNotFound,

    /// The user is not enrolled in any match.
    #[error("user is not in a match")]
    NotInMatch,

    /// The user already takes part in another match.
    #[error("user is already in a match")]
    AlreadyInMatch,

    /// The action came from a player whose turn it is not.
    #[error("not this player's turn")]
    WrongTurn,

    /// The player already answered the current question.
    #[error("question already answered")]
    AlreadyAnswered,

    /// The button belongs to a turn or stage that has passed.
    #[error("stale action")]
    StaleAction,

    /// Match settings are reserved for the player who created the match.
    #[error("only the organizer can do this")]
    NotOrganizer,

    /// No candidate countries for the requested filter.
    #[error("candidate pool is empty")]
    EmptyPool,

    /// Reference tables are inconsistent or too small for the request.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// The external fact generator failed.
    #[error("fact generation failed: {0}")]
    Generation(String),
}

impl QuizError {
    /// Short user-facing notice, plain text (not escaped).
    pub fn notice(&self) -> &'static str {
        match self {
            QuizError::Validation(_) => "Не удалось разобрать запрос.",
            QuizError::SessionNotFound => "Матч не найден.",
            QuizError::NotInMatch => "Вы сейчас не участвуете в матче.",
            QuizError::AlreadyInMatch => "Вы уже участвуете в матче. Завершите его командой /quit.",
            QuizError::WrongTurn => "Сейчас не ваш ход.",
            QuizError::AlreadyAnswered => "Вы уже ответили на этот вопрос.",
            QuizError::StaleAction => "Эта кнопка уже неактуальна.",
            QuizError::NotOrganizer => "Это может сделать только организатор матча.",
            QuizError::EmptyPool => "Для этого региона нет стран. Матч отменён.",
            QuizError::DataIntegrity(_) => "Не хватает данных для вопросов.",
            QuizError::Generation(_) => "Не удалось получить новый факт, попробуйте позже.",
        }
    }

    /// Whether the notice should be shown as a modal alert.
    pub fn is_alert(&self) -> bool {
        matches!(self, QuizError::EmptyPool | QuizError::DataIntegrity(_))
    }
}
