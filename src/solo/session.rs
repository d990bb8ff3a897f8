use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, UserId};

use crate::quiz::{DirectionChoice, Question};
use crate::session_id::SessionId;

/// Single-player practice modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoloMode {
    Cards,
    Sprint,
    Test,
}

impl SoloMode {
    pub fn code(self) -> &'static str {
        match self {
            SoloMode::Cards => "c",
            SoloMode::Sprint => "s",
            SoloMode::Test => "t",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "c" => Some(SoloMode::Cards),
            "s" => Some(SoloMode::Sprint),
            "t" => Some(SoloMode::Test),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SoloMode::Cards => "Карточки",
            SoloMode::Sprint => "Спринт",
            SoloMode::Test => "Тест",
        }
    }
}

/// One user's practice run.
#[derive(Debug, Clone)]
pub struct SoloSession {
    pub id: SessionId,
    pub user: UserId,
    pub chat: ChatId,
    pub mode: SoloMode,
    pub direction: DirectionChoice,
    pub pool: Vec<String>,
    pub queue: VecDeque<String>,
    pub current: Option<Question>,
    /// Whether the current card went out as a photo.
    pub current_is_photo: bool,
    pub correct: u32,
    pub total: u32,
    /// Subjects the user should practise again, in the order they came up.
    pub to_repeat: Vec<String>,
    /// Cards already sent back into the queue once.
    pub requeued: HashSet<String>,
    pub deadline: Option<DateTime<Utc>>,
}

impl SoloSession {
    pub fn new(
        user: UserId,
        chat: ChatId,
        mode: SoloMode,
        direction: DirectionChoice,
        pool: Vec<String>,
        queue: VecDeque<String>,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            user,
            chat,
            mode,
            direction,
            pool,
            queue,
            current: None,
            current_is_photo: false,
            correct: 0,
            total: 0,
            to_repeat: Vec::new(),
            requeued: HashSet::new(),
            deadline: None,
        }
    }

    pub fn mark_for_repeat(&mut self, subject: &str) {
        if !self.to_repeat.iter().any(|s| s == subject) {
            self.to_repeat.push(subject.to_string());
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// Active practice runs, one per user.
#[derive(Clone, Default)]
pub struct SoloRegistry {
    inner: Arc<Mutex<HashMap<UserId, SoloSession>>>,
}

impl SoloRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, SoloSession>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `session`, replacing any earlier run of the same user.
    pub fn insert(&self, session: SoloSession) -> Option<SoloSession> {
        self.lock().insert(session.user, session)
    }

    pub fn get(&self, user: UserId) -> Option<SoloSession> {
        self.lock().get(&user).cloned()
    }

    /// Runs `f` against the user's run if its token is `id`.
    pub fn with_session<R>(
        &self,
        user: UserId,
        id: &SessionId,
        f: impl FnOnce(&mut SoloSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.lock();
        let session = sessions.get_mut(&user).filter(|s| s.id == *id)?;
        Some(f(session))
    }

    pub fn remove(&self, user: UserId) -> Option<SoloSession> {
        self.lock().remove(&user)
    }

    /// Removes the user's run only if its token is still `id`.
    pub fn remove_if(&self, user: UserId, id: &SessionId) -> Option<SoloSession> {
        let mut sessions = self.lock();
        if sessions.get(&user).is_some_and(|s| s.id == *id) {
            sessions.remove(&user)
        } else {
            None
        }
    }

    pub fn active_count(&self) -> usize {
        self.lock().len()
    }
}
