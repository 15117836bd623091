use teloxide::prelude::*;
use teloxide::types::KeyboardRemove;
use teloxide::utils::command::BotCommands;

use crate::bot::admin::is_owner;
use crate::bot::commands::Command;
use crate::bot::handlers::{BotContext, HandlerResult};
use crate::bot::keyboards;
use crate::bot::session::{consume_mode_text, ModeDialogue};
use crate::database::models::Subscriber;
use crate::messages;
use crate::utils::logging::{
    log_admin_denied, log_command_error, log_command_start, log_command_success,
    log_database_operation, log_validation_error,
};
use crate::utils::validation::validate_coordinates;

fn sender(msg: &Message) -> (i64, String) {
    msg.from()
        .map(|u| (u.id.0 as i64, u.first_name.clone()))
        .unwrap_or((0, "Unknown".to_string()))
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ctx: BotContext,
) -> HandlerResult {
    let (user_id, name) = sender(&msg);
    log_command_start(&format!("{cmd:?}"), &name, user_id, msg.chat.id.0);

    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            if user_id == 0 {
                return Ok(());
            }
            match Subscriber::add(&ctx.db.pool, user_id, &name).await {
                Ok(_) => {
                    log_database_operation("upsert", "subscribers", Some(user_id.to_string().as_str()));
                    bot.send_message(msg.chat.id, messages::WELCOME_MESSAGE)
                        .reply_markup(keyboards::main_menu())
                        .await?;
                    log_command_success("start", user_id, None);
                }
                Err(e) => {
                    log_command_error("start", user_id, &e.to_string());
                    bot.send_message(msg.chat.id, messages::UNKNOWN_ERROR).await?;
                }
            }
        }
        Command::Dash => {
            if !is_owner(ctx.owner_id, user_id) {
                log_admin_denied("dash", user_id);
                bot.send_message(msg.chat.id, messages::ADMIN_DENIED).await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, messages::ADMIN_WELCOME)
                .reply_markup(keyboards::admin_console())
                .await?;
        }
    }
    Ok(())
}

/// Stores a shared location, subscribing the sender first if needed.
pub async fn location_handler(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let Some(location) = msg.location() else {
        return Ok(());
    };
    let (user_id, name) = sender(&msg);
    if user_id == 0 {
        return Ok(());
    }

    if let Err(e) = validate_coordinates(location.latitude, location.longitude) {
        log_validation_error(
            "location",
            "coordinates",
            &format!("{},{}", location.latitude, location.longitude),
            &e.to_string(),
            user_id,
        );
        bot.send_message(msg.chat.id, messages::LOCATION_INVALID).await?;
        return Ok(());
    }

    let saved = async {
        if Subscriber::find_by_id(&ctx.db.pool, user_id).await?.is_none() {
            Subscriber::add(&ctx.db.pool, user_id, &name).await?;
        }
        Subscriber::set_location(&ctx.db.pool, user_id, location.latitude, location.longitude).await
    }
    .await;

    match saved {
        Ok(()) => {
            log_database_operation("update_location", "subscribers", Some(user_id.to_string().as_str()));
            bot.send_message(msg.chat.id, messages::LOCATION_SAVED)
                .reply_markup(KeyboardRemove::new())
                .await?;
            log_command_success("location", user_id, None);
        }
        Err(e) => {
            log_command_error("location", user_id, &e.to_string());
            bot.send_message(msg.chat.id, messages::UNKNOWN_ERROR).await?;
        }
    }
    Ok(())
}

/// Free text only matters while the owner's console is waiting for input.
pub async fn text_handler(
    bot: Bot,
    msg: Message,
    dialogue: ModeDialogue,
    ctx: BotContext,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let (user_id, _) = sender(&msg);
    if !is_owner(ctx.owner_id, user_id) {
        return Ok(());
    }

    match consume_mode_text(&dialogue, text, &ctx.db, &bot).await {
        Ok(Some(reply)) => {
            bot.send_message(msg.chat.id, reply).await?;
            log_command_success("mode_text", user_id, None);
        }
        Ok(None) => {}
        Err(e) => {
            log_command_error("mode_text", user_id, &e.to_string());
            bot.send_message(msg.chat.id, messages::UNKNOWN_ERROR).await?;
        }
    }
    Ok(())
}
