//! # Sadqa Bot Main Entry Point
//!
//! Initializes logging, loads configuration, opens the subscriber store,
//! starts the reminder scheduler and the health server, then runs the
//! Telegram dispatcher until shutdown.

use anyhow::Result;
use std::sync::Arc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sadqa_bot::bot::handlers::{BotContext, BotHandler};
use sadqa_bot::bot::session::ConversationMode;
use sadqa_bot::config::{Config, PrayerModeSetting};
use sadqa_bot::database::connection::DatabaseManager;
use sadqa_bot::services::content::DevotionalContent;
use sadqa_bot::services::health::HealthService;
use sadqa_bot::services::prayer_times::{AladhanClient, FixedTable, PrayerMode};
use sadqa_bot::services::reminder::{Notifier, ReminderService};
use sadqa_bot::services::timezone::CivilClock;
use sadqa_bot::utils::logging::log_system_event;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sadqa_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Sadqa Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Prayer mode: {:?}, UTC offset: {}",
        config.database_url, config.http_port, config.prayer_mode, config.utc_offset_hours
    );

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let clock = CivilClock::from_hours(config.utc_offset_hours)?;

    let content = DevotionalContent::load(&config.verses_path, &config.supplications_path)?;
    info!(
        "Loaded {} verses and {} supplications",
        content.verses.len(),
        content.supplications.len()
    );

    let prayer_mode = match config.prayer_mode {
        PrayerModeSetting::Fixed => PrayerMode::FixedTable(FixedTable::default()),
        PrayerModeSetting::Location => PrayerMode::LocationAware(Arc::new(AladhanClient::new(
            config.prayer_api_url.clone(),
            config.prayer_method,
        ))),
    };

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let handler = BotHandler::new(BotContext {
        db: db_arc.as_ref().clone(),
        owner_id: config.owner_id,
        prayer_mode: prayer_mode.clone(),
        clock,
    });

    info!("Initializing reminder service...");
    let notifier = Arc::new(Notifier::new(
        db_arc.as_ref().clone(),
        Arc::new(bot.clone()),
        prayer_mode.clone(),
        content,
        config.friday_blessing_hour,
    ));
    let mut reminder_service = match ReminderService::new(notifier, clock).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create reminder service: {}", e);
            return Err(anyhow::anyhow!("Failed to create reminder service: {}", e));
        }
    };

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    } else {
        info!("Reminder service started successfully");
    }

    let health_service = HealthService::new(db_arc.clone(), prayer_mode.name());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);
    log_system_event("startup", Some(format!("{} mode", prayer_mode.name()).as_str()));

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .dependencies(dptree::deps![InMemStorage::<ConversationMode>::new()])
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

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }

    log_system_event("shutdown", None);
    Ok(())
}
