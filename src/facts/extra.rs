//! "Another fact" tracking.
//!
//! Every message sent with a fact attachment is registered here under its
//! `(chat, message id)`. Copies of one broadcast share a group, so a press on
//! any copy swaps the fact in all of them, once. Only the newest
//! `MAX_TRACKED_FACT_GROUPS` groups stay pressable.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use teloxide::types::{ChatId, MessageId};

use crate::constants::MAX_TRACKED_FACT_GROUPS;
use crate::delivery::{Directive, FactAttachment, FactGroupId};
use crate::error::QuizError;
use crate::facts::generator::FactGenerator;
use crate::utils::markdown::escape_markdown;

/// Appends a fact section to an already escaped message body.
pub fn compose_with_fact(body: &str, fact: &str) -> String {
    format!("{body}\n\n💡 {}", escape_markdown(fact))
}

#[derive(Debug, Clone)]
struct FactGroup {
    subject: String,
    body: String,
    fact: String,
    copies: Vec<(ChatId, MessageId)>,
}

#[derive(Default)]
struct Tracker {
    by_message: HashMap<(ChatId, MessageId), FactGroupId>,
    groups: HashMap<FactGroupId, FactGroup>,
    /// Group ids, oldest first.
    order: VecDeque<FactGroupId>,
}

impl Tracker {
    fn evict_oldest(&mut self, limit: usize) {
        while self.groups.len() > limit {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(group) = self.groups.remove(&oldest) {
                for copy in &group.copies {
                    self.by_message.remove(copy);
                }
            }
        }
    }
}

/// Outcome of an "another fact" press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnotherFact {
    /// Edits for every copy of the broadcast.
    Edited(Vec<Directive>),
    /// The fact of this message was already swapped (or is being swapped).
    AlreadyUsed,
    /// Generation failed; the messages keep their text and stay tracked.
    Failed(QuizError),
}

pub struct ExtraFacts {
    tracker: Mutex<Tracker>,
    limit: usize,
}

impl Default for ExtraFacts {
    fn default() -> Self {
        Self::with_limit(MAX_TRACKED_FACT_GROUPS)
    }
}

impl ExtraFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker keeping at most `limit` groups (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            tracker: Mutex::new(Tracker::default()),
            limit: limit.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a delivered copy of a fact-carrying message.
    pub fn register(&self, attachment: &FactAttachment, chat: ChatId, message_id: MessageId) {
        let mut tracker = self.lock();
        if !tracker.groups.contains_key(&attachment.group) {
            tracker.order.push_back(attachment.group);
        }
        tracker
            .groups
            .entry(attachment.group)
            .or_insert_with(|| FactGroup {
                subject: attachment.subject.clone(),
                body: attachment.body.clone(),
                fact: attachment.fact.clone(),
                copies: Vec::new(),
            })
            .copies
            .push((chat, message_id));
        tracker.by_message.insert((chat, message_id), attachment.group);
        tracker.evict_oldest(self.limit);
    }

    pub fn tracked_messages(&self) -> usize {
        self.lock().by_message.len()
    }

    fn take(&self, chat: ChatId, message_id: MessageId) -> Option<(FactGroupId, FactGroup)> {
        let mut tracker = self.lock();
        let group_id = tracker.by_message.remove(&(chat, message_id))?;
        let group = tracker.groups.remove(&group_id)?;
        tracker.order.retain(|id| *id != group_id);
        for copy in &group.copies {
            tracker.by_message.remove(copy);
        }
        Some((group_id, group))
    }

    fn restore(&self, group_id: FactGroupId, group: FactGroup) {
        let mut tracker = self.lock();
        for copy in &group.copies {
            tracker.by_message.insert(*copy, group_id);
        }
        tracker.groups.insert(group_id, group);
        tracker.order.push_back(group_id);
        tracker.evict_oldest(self.limit);
    }

    /// Swaps the fact on the pressed message and all its copies.
    ///
    /// The group leaves the tracker before the generator is awaited, so a
    /// concurrent or repeated press finds nothing and gets `AlreadyUsed`.
    pub async fn another_fact(
        &self,
        chat: ChatId,
        message_id: MessageId,
        generator: &dyn FactGenerator,
    ) -> AnotherFact {
        let Some((group_id, group)) = self.take(chat, message_id) else {
            return AnotherFact::AlreadyUsed;
        };

        match generator
            .generate(&group.subject, std::slice::from_ref(&group.fact))
            .await
        {
            Ok(fact) => {
                let text = compose_with_fact(&group.body, &fact);
                AnotherFact::Edited(
                    group
                        .copies
                        .iter()
                        .map(|(chat, message_id)| Directive::edit_text(*chat, *message_id, text.clone()))
                        .collect(),
                )
            }
            Err(e) => {
                self.restore(group_id, group);
                AnotherFact::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use uuid::Uuid;

    struct FlakyGenerator {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    #[async_trait]
    impl FactGenerator for FlakyGenerator {
        async fn generate(&self, _subject: &str, avoid: &[String]) -> Result<String, QuizError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(QuizError::Generation("offline".into()));
            }
            assert_eq!(avoid, ["Старый факт".to_string()]);
            Ok("Новый факт".into())
        }
    }

    fn attachment() -> FactAttachment {
        FactAttachment {
            group: Uuid::new_v4(),
            subject: "Франция".into(),
            body: "✅ Верно\\!".into(),
            fact: "Старый факт".into(),
        }
    }

    #[test]
    fn test_compose_escapes_fact() {
        assert_eq!(compose_with_fact("Тело", "Факт."), "Тело\n\n💡 Факт\\.");
    }

    #[tokio::test]
    async fn test_failure_keeps_group_tracked() {
        let facts = ExtraFacts::new();
        facts.register(&attachment(), ChatId(1), MessageId(10));
        let generator = FlakyGenerator {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(true),
        };

        let outcome = facts.another_fact(ChatId(1), MessageId(10), &generator).await;
        assert!(matches!(outcome, AnotherFact::Failed(_)));
        assert_eq!(facts.tracked_messages(), 1);

        generator.fail.store(false, Ordering::SeqCst);
        let outcome = facts.another_fact(ChatId(1), MessageId(10), &generator).await;
        assert!(matches!(outcome, AnotherFact::Edited(ref edits) if edits.len() == 1));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_oldest_groups_are_evicted_past_the_limit() {
        let facts = ExtraFacts::with_limit(3);
        let first = attachment();
        facts.register(&first, ChatId(1), MessageId(1));
        facts.register(&first, ChatId(2), MessageId(1));
        for id in 2..=4 {
            facts.register(&attachment(), ChatId(1), MessageId(id));
        }
        assert_eq!(facts.tracked_messages(), 3);

        let generator = FlakyGenerator {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        };
        let outcome = facts.another_fact(ChatId(2), MessageId(1), &generator).await;
        assert_eq!(outcome, AnotherFact::AlreadyUsed);
        let outcome = facts.another_fact(ChatId(1), MessageId(4), &generator).await;
        assert!(matches!(outcome, AnotherFact::Edited(ref edits) if edits.len() == 1));
        assert_eq!(facts.tracked_messages(), 2);
    }

    #[test]
    fn test_many_unpressed_groups_stay_bounded() {
        let facts = ExtraFacts::with_limit(100);
        for id in 0..10_000 {
            facts.register(&attachment(), ChatId(1), MessageId(id));
        }
        assert_eq!(facts.tracked_messages(), 100);
    }

    #[tokio::test]
    async fn test_unknown_message_is_already_used() {
        let facts = ExtraFacts::new();
        let generator = FlakyGenerator {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        };
        let outcome = facts.another_fact(ChatId(1), MessageId(99), &generator).await;
        assert_eq!(outcome, AnotherFact::AlreadyUsed);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
