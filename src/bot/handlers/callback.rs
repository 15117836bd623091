use teloxide::prelude::*;

use crate::bot::admin::{run_admin_action, AdminAction};
use crate::bot::handlers::{BotContext, HandlerResult};
use crate::bot::keyboards;
use crate::bot::menu::{prayer_times_text, toggle_reminder_text, MenuAction};
use crate::bot::session::ModeDialogue;
use crate::database::models::Subscriber;
use crate::messages;
use crate::utils::logging::{
    log_admin_denied, log_command_error, log_command_start, log_database_operation,
};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: ModeDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.as_deref().unwrap_or("unknown");
    let chat_id = q.message.as_ref().map(|m| m.chat.id.0).unwrap_or(0);

    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    log_command_start(&data, username, user_id, chat_id);

    if let Some(action) = AdminAction::from_callback(&data) {
        return handle_admin_callback(bot, q, action, dialogue, ctx).await;
    }
    if let Some(action) = MenuAction::from_callback(&data) {
        return handle_menu_callback(bot, q, action, ctx).await;
    }

    bot.answer_callback_query(q.id).text("Unknown action").await?;
    Ok(())
}

async fn handle_menu_callback(
    bot: Bot,
    q: CallbackQuery,
    action: MenuAction,
    ctx: BotContext,
) -> HandlerResult {
    let user_id = q.from.id.0 as i64;

    let subscriber = match Subscriber::find_by_id(&ctx.db.pool, user_id).await {
        Ok(Some(subscriber)) => subscriber,
        Ok(None) => {
            bot.answer_callback_query(q.id)
                .text(messages::NOT_SUBSCRIBED)
                .show_alert(true)
                .await?;
            return Ok(());
        }
        Err(e) => {
            log_command_error(action.callback_data(), user_id, &e.to_string());
            bot.answer_callback_query(q.id).text(messages::UNKNOWN_ERROR).await?;
            return Ok(());
        }
    };

    bot.answer_callback_query(q.id.clone()).await?;
    let Some(message) = q.message else {
        return Ok(());
    };

    match action {
        MenuAction::PrayerTimes => {
            let text = prayer_times_text(&ctx.prayer_mode, &ctx.clock, subscriber.location()).await;
            bot.send_message(message.chat.id, text).await?;
        }
        MenuAction::ShareLocation => {
            bot.send_message(message.chat.id, messages::LOCATION_PROMPT)
                .reply_markup(keyboards::location_request())
                .await?;
        }
        MenuAction::ToggleReminder => {
            let text = match toggle_reminder_text(&ctx.db, user_id).await {
                Ok(text) => text,
                Err(e) => {
                    log_command_error(action.callback_data(), user_id, &e.to_string());
                    messages::UNKNOWN_ERROR.to_string()
                }
            };
            bot.send_message(message.chat.id, text).await?;
        }
        MenuAction::Unsubscribe => {
            let text = match Subscriber::remove(&ctx.db.pool, user_id).await {
                Ok(_) => {
                    log_database_operation("delete", "subscribers", Some(user_id.to_string().as_str()));
                    messages::UNSUBSCRIBE_CONFIRM
                }
                Err(e) => {
                    log_command_error(action.callback_data(), user_id, &e.to_string());
                    messages::UNKNOWN_ERROR
                }
            };
            bot.send_message(message.chat.id, text).await?;
        }
    }
    Ok(())
}

async fn handle_admin_callback(
    bot: Bot,
    q: CallbackQuery,
    action: AdminAction,
    dialogue: ModeDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    bot.answer_callback_query(q.id.clone()).await?;

    let outcome = match run_admin_action(ctx.owner_id, user_id, action, &ctx.db, &bot).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log_command_error(action.callback_data(), user_id, &e.to_string());
            if let Some(message) = q.message {
                bot.send_message(message.chat.id, messages::UNKNOWN_ERROR).await?;
            }
            return Ok(());
        }
    };

    if outcome.is_denied() {
        log_admin_denied(action.callback_data(), user_id);
    }
    if let Some(mode) = outcome.next_mode {
        dialogue.update(mode).await?;
    }

    if let Some(message) = q.message {
        bot.edit_message_text(message.chat.id, message.id, outcome.reply).await?;
    }
    Ok(())
}
