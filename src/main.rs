//! # Capitals Quiz Bot Main Entry Point
//!
//! Initializes logging, loads configuration and reference data, starts the
//! fact refresh service and the health server, and runs the Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use capitals_quiz_bot::app::{AppParts, QuizApp};
use capitals_quiz_bot::bot::handlers::callback::run_scheduled_actions;
use capitals_quiz_bot::bot::handlers::BotHandler;
use capitals_quiz_bot::config::Config;
use capitals_quiz_bot::data::ReferenceData;
use capitals_quiz_bot::delivery::{Scheduler, TelegramDelivery};
use capitals_quiz_bot::facts::{
    ChatCompletionFactGenerator, DisabledFactGenerator, ExtraFacts, FactCache, FactGenerator,
};
use capitals_quiz_bot::services::fact_refresh::FactRefreshService;
use capitals_quiz_bot::services::health::HealthService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capitals_quiz_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Capitals Quiz Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Countries: {}, Facts: {}, HTTP Port: {}",
        config.countries_path, config.facts_cache_path, config.http_port
    );

    // Reference data and fact cache
    let reference = Arc::new(ReferenceData::load(&config.countries_path)?);
    info!(
        "Loaded {} countries across {} continents",
        reference.len(),
        reference.continents().len()
    );
    let facts = Arc::new(FactCache::load(&config.facts_cache_path)?);
    info!("Fact cache holds {} subjects", facts.len());

    let generator: Arc<dyn FactGenerator> = match &config.facts_api {
        Some(api) => {
            info!("Fact generation enabled with model {}", api.model);
            Arc::new(ChatCompletionFactGenerator::new(
                api.url.clone(),
                api.api_key.clone(),
                api.model.clone(),
            )?)
        }
        None => {
            info!("Fact generation disabled, serving cached facts only");
            Arc::new(DisabledFactGenerator)
        }
    };

    // Game engines
    let extra_facts = Arc::new(ExtraFacts::new());
    let app = Arc::new(QuizApp::new(AppParts {
        reference: reference.clone(),
        facts: facts.clone(),
        extra_facts: extra_facts.clone(),
        generator: generator.clone(),
        coop_settings: config.coop_settings(),
        sprint_duration: config.sprint_duration,
        admins: config.admin_ids.clone(),
        seed: None,
    }));

    // Initialize bot
    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let (scheduler, scheduled_actions) = Scheduler::channel();
    let delivery = TelegramDelivery::new(bot.clone(), extra_facts, scheduler);
    let handler = BotHandler::new(app.clone(), delivery);
    tokio::spawn(run_scheduled_actions(handler.clone(), scheduled_actions));
    info!("Telegram bot initialized successfully");

    // Initialize and start fact refresh service
    info!("Initializing fact refresh service...");
    let mut refresh_service = match FactRefreshService::new(
        facts,
        generator,
        reference,
        config.fact_max_age(),
        config.fact_refresh_cron.clone(),
    )
    .await
    {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create fact refresh service: {}", e);
            return Err(anyhow::anyhow!("Failed to create fact refresh service: {}", e));
        }
    };

    if let Err(e) = refresh_service.start().await {
        tracing::error!("Failed to start fact refresh service: {}", e);
    } else {
        info!("Fact refresh service started successfully");
    }

    // Initialize health service
    let health_service = HealthService::new(app);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Whichever finishes first means shutdown
    tokio::select! {
        result1 = bot_task => {
            if let Err(e) = result1 {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result2 = health_task => {
            if let Err(e) = result2 {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = refresh_service.stop().await {
        tracing::warn!("Error stopping fact refresh service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
