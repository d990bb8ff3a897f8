use std::sync::Arc;

use chrono::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::data::ReferenceData;
use crate::facts::{FactCache, FactGenerator};
use crate::utils::logging::log_system_event;

/// Periodically regenerates stale cached facts and writes the cache back
/// to disk.
pub struct FactRefreshService {
    cache: Arc<FactCache>,
    generator: Arc<dyn FactGenerator>,
    reference: Arc<ReferenceData>,
    max_age: Duration,
    cron: String,
    scheduler: JobScheduler,
}

impl FactRefreshService {
    pub async fn new(
        cache: Arc<FactCache>,
        generator: Arc<dyn FactGenerator>,
        reference: Arc<ReferenceData>,
        max_age: Duration,
        cron: impl Into<String>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            cache,
            generator,
            reference,
            max_age,
            cron: cron.into(),
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let cache = self.cache.clone();
        let generator = self.generator.clone();
        let reference = self.reference.clone();
        let max_age = self.max_age;

        let refresh_job = Job::new_async(self.cron.as_str(), move |_uuid, _l| {
            let cache = cache.clone();
            let generator = generator.clone();
            let reference = reference.clone();
            Box::pin(async move {
                if let Err(e) = refresh_facts(&cache, generator.as_ref(), &reference, max_age).await {
                    tracing::error!("Failed to refresh facts: {}", e);
                }
            })
        })?;

        self.scheduler.add(refresh_job).await?;
        self.scheduler.start().await?;

        tracing::info!("Fact refresh service started with schedule '{}'", self.cron);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Runs one refresh pass outside the schedule.
    pub async fn refresh_now(&self) -> anyhow::Result<usize> {
        refresh_facts(&self.cache, self.generator.as_ref(), &self.reference, self.max_age).await
    }
}

/// Refreshes facts for every country and its capital.
pub async fn refresh_facts(
    cache: &FactCache,
    generator: &dyn FactGenerator,
    reference: &ReferenceData,
    max_age: Duration,
) -> anyhow::Result<usize> {
    let mut subjects = reference.list_countries(None);
    subjects.extend(reference.list_capitals(None));

    let refreshed = cache.refresh_stale(generator, max_age, &subjects).await;
    if refreshed > 0 {
        cache.save()?;
    }
    log_system_event(
        "fact_refresh",
        Some(&format!("{} of {} subjects refreshed", refreshed, subjects.len())),
    );
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct EchoGenerator;

    #[async_trait]
    impl FactGenerator for EchoGenerator {
        async fn generate(&self, subject: &str, _avoid: &[String]) -> Result<String, QuizError> {
            Ok(format!("Факт про {subject}"))
        }
    }

    fn reference() -> Arc<ReferenceData> {
        Arc::new(
            ReferenceData::from_json_str(
                r#"{"continents": ["Европа"],
                    "countries": [{"name": "Франция", "capital": "Париж", "continent": "Европа"}]}"#,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_refresh_now_covers_countries_and_capitals() {
        let cache = Arc::new(FactCache::in_memory(HashMap::new()));
        let service = FactRefreshService::new(
            cache.clone(),
            Arc::new(EchoGenerator),
            reference(),
            Duration::hours(1),
            "0 0 4 * * *",
        )
        .await
        .unwrap();

        assert_eq!(service.refresh_now().await.unwrap(), 2);
        assert_eq!(cache.static_fact("Париж"), "Факт про Париж");

        // Everything is fresh now.
        assert_eq!(service.refresh_now().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_refresh_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("facts.json");
        let cache = FactCache::load(&path).unwrap();

        let refreshed = refresh_facts(&cache, &EchoGenerator, &reference(), Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(refreshed, 2);
        let reloaded = FactCache::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
    }
}
