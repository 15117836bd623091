//! Per-conversation state deciding what the next free-text message means.

use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::database::{connection::DatabaseManager, models::Subscriber};
use crate::messages;
use crate::services::broadcast::broadcast_to_all;
use crate::services::messenger::Messenger;
use crate::utils::validation::{parse_user_id, validate_broadcast_text};

/// What the admin console is waiting for in this chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConversationMode {
    #[default]
    Idle,
    Broadcast,
    Announce,
    SearchUser,
    DeleteUser,
}

pub type ModeDialogue = Dialogue<ConversationMode, InMemStorage<ConversationMode>>;

type SessionResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Whether a text message can answer a pending mode. Slash commands never do,
/// registered or not.
pub fn is_mode_input(text: &str) -> bool {
    !text.trim_start().starts_with('/')
}

/// Takes the chat's pending mode, resets it to idle and acts on `text`.
/// The mode is consumed even when acting on it fails.
/// Returns the reply owed to the sender, `None` when no mode was pending
/// or `text` is a command, which leaves the mode pending.
pub async fn consume_mode_text(
    dialogue: &ModeDialogue,
    text: &str,
    db: &DatabaseManager,
    messenger: &dyn Messenger,
) -> SessionResult<Option<String>> {
    if !is_mode_input(text) {
        return Ok(None);
    }

    let mode = dialogue.get_or_default().await?;
    if mode == ConversationMode::Idle {
        return Ok(None);
    }

    dialogue.exit().await?;
    Ok(apply_mode_text(mode, text, db, messenger).await?)
}

pub async fn apply_mode_text(
    mode: ConversationMode,
    text: &str,
    db: &DatabaseManager,
    messenger: &dyn Messenger,
) -> Result<Option<String>, sqlx::Error> {
    let reply = match mode {
        ConversationMode::Idle => return Ok(None),
        ConversationMode::Broadcast => {
            if let Err(e) = validate_broadcast_text(text) {
                return Ok(Some(format!("⚠️ {}", e)));
            }
            let summary = broadcast_to_all(db, messenger, text).await?;
            messages::broadcast_report(summary.delivered, summary.attempted())
        }
        ConversationMode::Announce => {
            if let Err(e) = validate_broadcast_text(text) {
                return Ok(Some(format!("⚠️ {}", e)));
            }
            let announcement = format!("{}\n{}", messages::ANNOUNCEMENT_HEADER, text.trim());
            let summary = broadcast_to_all(db, messenger, &announcement).await?;
            messages::broadcast_report(summary.delivered, summary.attempted())
        }
        ConversationMode::SearchUser => match parse_user_id(text) {
            Err(_) => messages::invalid_user_id(text.trim()),
            Ok(user_id) => match Subscriber::find_by_id(&db.pool, user_id).await? {
                Some(subscriber) => format!("👤 {} - {}", subscriber.name, subscriber.user_id),
                None => messages::ADMIN_USER_NOT_FOUND.to_string(),
            },
        },
        ConversationMode::DeleteUser => match parse_user_id(text) {
            Err(_) => messages::invalid_user_id(text.trim()),
            Ok(user_id) => {
                if Subscriber::remove(&db.pool, user_id).await? {
                    messages::ADMIN_USER_DELETED.to_string()
                } else {
                    messages::ADMIN_USER_NOT_FOUND.to_string()
                }
            }
        },
    };
    Ok(Some(reply))
}
