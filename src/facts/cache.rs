use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{FACTS_PER_SUBJECT, FACT_PLACEHOLDER};
use crate::facts::generator::FactGenerator;

/// Cached facts for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactEntry {
    pub facts: Vec<String>,
    pub refreshed_at: DateTime<Utc>,
}

impl FactEntry {
    fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.facts.is_empty() || now - self.refreshed_at > max_age
    }
}

/// Static facts per country, persisted as `{subject: {facts, refreshed_at}}`.
pub struct FactCache {
    path: Option<PathBuf>,
    entries: RwLock<HashMap<String, FactEntry>>,
}

impl FactCache {
    /// Loads the cache file; a missing file gives an empty cache.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read fact cache {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse fact cache {}", path.display()))?
        } else {
            warn!("Fact cache {} not found, starting empty", path.display());
            HashMap::new()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries: RwLock::new(entries),
        })
    }

    /// Cache that is never written to disk.
    pub fn in_memory(entries: HashMap<String, FactEntry>) -> Self {
        Self {
            path: None,
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First cached fact for `subject`, or a placeholder.
    pub fn static_fact(&self, subject: &str) -> String {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .and_then(|entry| entry.facts.first().cloned())
            .unwrap_or_else(|| FACT_PLACEHOLDER.to_string())
    }

    pub fn facts_for(&self, subject: &str) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .map(|entry| entry.facts.clone())
            .unwrap_or_default()
    }

    pub fn insert(&self, subject: &str, facts: Vec<String>, refreshed_at: DateTime<Utc>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subject.to_string(), FactEntry { facts, refreshed_at });
    }

    /// Subjects whose entry is missing, empty, or older than `max_age`.
    pub fn stale_subjects(&self, subjects: &[String], max_age: Duration) -> Vec<String> {
        let now = Utc::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        subjects
            .iter()
            .filter(|s| match entries.get(*s) {
                Some(entry) => entry.is_stale(now, max_age),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Regenerates stale or missing entries. Fresh entries are left alone and
    /// a failed subject keeps whatever it had. Returns how many were refreshed.
    pub async fn refresh_stale(
        &self,
        generator: &dyn FactGenerator,
        max_age: Duration,
        subjects: &[String],
    ) -> usize {
        let mut refreshed = 0;
        for subject in self.stale_subjects(subjects, max_age) {
            let known = self.facts_for(&subject);
            let generated = generator.generate(&subject, &known).await;
            match generated {
                Ok(fact) => {
                    let facts = std::iter::once(fact)
                        .chain(known)
                        .take(FACTS_PER_SUBJECT)
                        .collect();
                    self.insert(&subject, facts, Utc::now());
                    refreshed += 1;
                }
                Err(e) => warn!("Fact refresh for {} failed: {}", subject, e),
            }
        }
        if refreshed > 0 {
            info!("Refreshed facts for {} subjects", refreshed);
        }
        refreshed
    }

    /// Writes the cache back to its file, if it has one.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            serde_json::to_string_pretty(&*entries)?
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write fact cache {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FactGenerator for CountingGenerator {
        async fn generate(&self, subject: &str, _avoid: &[String]) -> Result<String, QuizError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Новый факт: {subject}"))
        }
    }

    #[test]
    fn test_placeholder_for_unknown_subject() {
        let cache = FactCache::in_memory(HashMap::new());
        assert_eq!(cache.static_fact("Франция"), FACT_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_refresh_only_touches_stale_entries() {
        let cache = FactCache::in_memory(HashMap::new());
        cache.insert("Франция", vec!["Свежий факт".into()], Utc::now());
        cache.insert(
            "Италия",
            vec!["Старый факт".into()],
            Utc::now() - Duration::days(30),
        );
        let generator = CountingGenerator {
            calls: AtomicUsize::new(0),
        };
        let subjects = vec!["Франция".to_string(), "Италия".to_string(), "Испания".to_string()];

        let refreshed = cache.refresh_stale(&generator, Duration::days(7), &subjects).await;

        assert_eq!(refreshed, 2);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.static_fact("Франция"), "Свежий факт");
        assert_eq!(cache.static_fact("Италия"), "Новый факт: Италия");
        assert_eq!(cache.static_fact("Испания"), "Новый факт: Испания");
    }

    #[tokio::test]
    async fn test_refresh_keeps_newest_facts_first() {
        let cache = FactCache::in_memory(HashMap::new());
        let old = Utc::now() - Duration::days(30);
        cache.insert("Италия", vec!["Факт 2".into(), "Факт 1".into(), "Факт 0".into()], old);
        let generator = CountingGenerator {
            calls: AtomicUsize::new(0),
        };

        cache
            .refresh_stale(&generator, Duration::days(7), &["Италия".to_string()])
            .await;

        assert_eq!(
            cache.facts_for("Италия"),
            vec!["Новый факт: Италия".to_string(), "Факт 2".to_string(), "Факт 1".to_string()]
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        let cache = FactCache::load(&path).unwrap();
        assert!(cache.is_empty());
        cache.insert("Япония", vec!["Факт о Японии".into()], Utc::now());
        cache.save().unwrap();

        let reloaded = FactCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.static_fact("Япония"), "Факт о Японии");
    }
}
