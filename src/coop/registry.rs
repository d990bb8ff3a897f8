use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use teloxide::types::{ChatId, UserId};

use crate::coop::session::{CoopSession, Player};
use crate::session_id::SessionId;

type Sessions = HashMap<ChatId, HashMap<SessionId, CoopSession>>;

/// Live cooperative matches, keyed by originating chat and session id.
///
/// The lock is only ever taken for synchronous work and never held across
/// an `.await`.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<Sessions>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a match in `chat` with `organizer` as the first player.
    pub fn create(&self, chat: ChatId, organizer: Player) -> SessionId {
        let mut sessions = self.lock();
        let id = loop {
            let candidate = SessionId::generate();
            let taken = sessions
                .values()
                .any(|per_chat| per_chat.contains_key(&candidate));
            if !taken {
                break candidate;
            }
        };
        sessions
            .entry(chat)
            .or_default()
            .insert(id.clone(), CoopSession::new(id.clone(), chat, organizer));
        id
    }

    /// Snapshot of a match.
    pub fn find(&self, chat: ChatId, id: &SessionId) -> Option<CoopSession> {
        self.lock().get(&chat).and_then(|s| s.get(id)).cloned()
    }

    /// Runs `f` against the live match. A match left in a terminal stage is
    /// dropped from the registry afterwards.
    pub fn with_session<R>(
        &self,
        chat: ChatId,
        id: &SessionId,
        f: impl FnOnce(&mut CoopSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.lock();
        let per_chat = sessions.get_mut(&chat)?;
        let session = per_chat.get_mut(id)?;
        let result = f(session);
        if session.stage.is_terminal() {
            per_chat.remove(id);
            if per_chat.is_empty() {
                sessions.remove(&chat);
            }
        }
        Some(result)
    }

    pub fn remove(&self, chat: ChatId, id: &SessionId) -> Option<CoopSession> {
        let mut sessions = self.lock();
        let per_chat = sessions.get_mut(&chat)?;
        let removed = per_chat.remove(id);
        if per_chat.is_empty() {
            sessions.remove(&chat);
        }
        removed
    }

    /// Match in which `user` is enrolled as a human player, across all chats.
    pub fn find_by_player(&self, user: UserId) -> Option<(ChatId, CoopSession)> {
        self.lock().iter().find_map(|(chat, per_chat)| {
            per_chat
                .values()
                .find(|s| s.is_enrolled(user))
                .map(|s| (*chat, s.clone()))
        })
    }

    pub fn active_count(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coop::session::Stage;
    use crate::delivery::Actor;

    fn player(id: u64) -> Player {
        Player::human(&Actor::new(UserId(id), "Игрок", ChatId(id as i64)))
    }

    #[test]
    fn test_create_and_find() {
        let registry = SessionRegistry::new();
        let id = registry.create(ChatId(10), player(1));
        let session = registry.find(ChatId(10), &id).unwrap();
        assert_eq!(session.stage, Stage::AwaitingJoin);
        assert_eq!(session.organizer, UserId(1));
        assert!(registry.find(ChatId(11), &id).is_none());
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_find_by_player_scans_all_chats() {
        let registry = SessionRegistry::new();
        registry.create(ChatId(10), player(1));
        let id = registry.create(ChatId(20), player(2));
        let (chat, session) = registry.find_by_player(UserId(2)).unwrap();
        assert_eq!(chat, ChatId(20));
        assert_eq!(session.id, id);
        assert!(registry.find_by_player(UserId(3)).is_none());
    }

    #[test]
    fn test_terminal_sessions_are_dropped() {
        let registry = SessionRegistry::new();
        let id = registry.create(ChatId(10), player(1));
        registry
            .with_session(ChatId(10), &id, |s| s.advance_stage(Stage::Cancelled))
            .unwrap()
            .unwrap();
        assert!(registry.find(ChatId(10), &id).is_none());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new();
        let id = registry.create(ChatId(10), player(1));
        assert!(registry.remove(ChatId(10), &id).is_some());
        assert!(registry.remove(ChatId(10), &id).is_none());
        assert!(registry.with_session(ChatId(10), &id, |_| ()).is_none());
    }
}
