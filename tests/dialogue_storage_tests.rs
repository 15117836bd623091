#![allow(clippy::unwrap_used)]

use sadqa_bot::bot::handlers::{BotContext, BotHandler};
use sadqa_bot::bot::session::ConversationMode;
use sadqa_bot::database::connection::DatabaseManager;
use sadqa_bot::services::prayer_times::{FixedTable, PrayerMode};
use sadqa_bot::services::timezone::CivilClock;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_dispatcher_builds_with_mode_storage() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let db = DatabaseManager::new(&db_url).await.unwrap();
    db.run_migrations().await.unwrap();

    let handler = BotHandler::new(BotContext {
        db,
        owner_id: 7045209135,
        prayer_mode: PrayerMode::FixedTable(FixedTable::default()),
        clock: CivilClock::from_hours(3).unwrap(),
    });
    assert_eq!(handler.ctx.owner_id, 7045209135);
    assert_eq!(handler.ctx.prayer_mode.name(), "fixed");

    let storage = InMemStorage::<ConversationMode>::new();
    let bot = Bot::new("123456:TEST-TOKEN");
    let _dispatcher = Dispatcher::builder(bot, handler.schema())
        .dependencies(dptree::deps![storage])
        .build();
}
