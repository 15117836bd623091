pub mod callback;
pub mod message;

use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler},
    prelude::*,
};
use crate::bot::commands::Command;
use crate::bot::session::{is_mode_input, ConversationMode, ModeDialogue};
use crate::database::connection::DatabaseManager;
use crate::services::prayer_times::PrayerMode;
use crate::services::timezone::CivilClock;

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Everything a handler needs besides the update itself.
#[derive(Clone)]
pub struct BotContext {
    pub db: DatabaseManager,
    pub owner_id: i64,
    pub prayer_mode: PrayerMode,
    pub clock: CivilClock,
}

pub struct BotHandler {
    pub ctx: BotContext,
}

impl BotHandler {
    pub fn new(ctx: BotContext) -> Self {
        Self { ctx }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let ctx_command = self.ctx.clone();
        let ctx_location = self.ctx.clone();
        let ctx_text = self.ctx.clone();
        let ctx_callback = self.ctx.clone();

        dialogue::enter::<Update, InMemStorage<ConversationMode>, ConversationMode, _>()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let ctx = ctx_command.clone();
                        async move { message::command_handler(bot, msg, cmd, ctx).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.location().is_some())
                    .endpoint(move |bot: Bot, msg: Message| {
                        let ctx = ctx_location.clone();
                        async move { message::location_handler(bot, msg, ctx).await }
                    }),
            )
            .branch(
                Update::filter_message()
                    .filter(|msg: Message| msg.text().is_some_and(is_mode_input))
                    .endpoint(move |bot: Bot, msg: Message, dialogue: ModeDialogue| {
                        let ctx = ctx_text.clone();
                        async move { message::text_handler(bot, msg, dialogue, ctx).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: ModeDialogue| {
                    let ctx = ctx_callback.clone();
                    async move { callback::callback_handler(bot, q, dialogue, ctx).await }
                },
            ))
    }
}
