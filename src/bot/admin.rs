//! Owner-only control panel.

use crate::bot::session::ConversationMode;
use crate::database::{connection::DatabaseManager, models::Subscriber};
use crate::messages;
use crate::services::broadcast::broadcast_to_all;
use crate::services::messenger::Messenger;
use crate::utils::validation::{truncate_chars, MAX_LIST_CHARS};

const CALLBACK_PREFIX: &str = "admin:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Count,
    ListUsers,
    TestBroadcast,
    Broadcast,
    Announce,
    SearchUser,
    DeleteUser,
    Status,
}

impl AdminAction {
    pub const ALL: [AdminAction; 8] = [
        AdminAction::Count,
        AdminAction::ListUsers,
        AdminAction::TestBroadcast,
        AdminAction::Broadcast,
        AdminAction::Announce,
        AdminAction::SearchUser,
        AdminAction::DeleteUser,
        AdminAction::Status,
    ];

    pub fn callback_data(&self) -> &'static str {
        match self {
            AdminAction::Count => "admin:count",
            AdminAction::ListUsers => "admin:list_users",
            AdminAction::TestBroadcast => "admin:test_broadcast",
            AdminAction::Broadcast => "admin:broadcast",
            AdminAction::Announce => "admin:announce",
            AdminAction::SearchUser => "admin:search_user",
            AdminAction::DeleteUser => "admin:delete_user",
            AdminAction::Status => "admin:status",
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        if !data.starts_with(CALLBACK_PREFIX) {
            return None;
        }
        Self::ALL.into_iter().find(|action| action.callback_data() == data)
    }
}

/// Reply to show the admin, and the mode the chat should switch to.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminOutcome {
    pub reply: String,
    pub next_mode: Option<ConversationMode>,
}

impl AdminOutcome {
    fn reply(text: impl Into<String>) -> Self {
        Self { reply: text.into(), next_mode: None }
    }

    fn prompt(text: &str, mode: ConversationMode) -> Self {
        Self { reply: text.to_string(), next_mode: Some(mode) }
    }

    pub fn is_denied(&self) -> bool {
        self.reply == messages::ADMIN_DENIED_SHORT && self.next_mode.is_none()
    }
}

pub fn is_owner(owner_id: i64, user_id: i64) -> bool {
    owner_id == user_id
}

/// `name - id` per line, cut to the Telegram-safe length.
pub fn render_subscriber_list(subscribers: &[Subscriber]) -> String {
    let mut text = String::from("📋 المشتركين:\n");
    let lines: Vec<String> = subscribers
        .iter()
        .map(|s| format!("{} - {}", s.name, s.user_id))
        .collect();
    text.push_str(&lines.join("\n"));
    truncate_chars(&text, MAX_LIST_CHARS).to_string()
}

/// Runs one console action for `user_id`. Anyone but the owner gets the
/// denial text and nothing is read or written.
pub async fn run_admin_action(
    owner_id: i64,
    user_id: i64,
    action: AdminAction,
    db: &DatabaseManager,
    messenger: &dyn Messenger,
) -> Result<AdminOutcome, sqlx::Error> {
    if !is_owner(owner_id, user_id) {
        return Ok(AdminOutcome::reply(messages::ADMIN_DENIED_SHORT));
    }

    let outcome = match action {
        AdminAction::Count => {
            AdminOutcome::reply(messages::subscriber_count(Subscriber::count(&db.pool).await?))
        }
        AdminAction::ListUsers => {
            let subscribers = Subscriber::list_all(&db.pool).await?;
            AdminOutcome::reply(render_subscriber_list(&subscribers))
        }
        AdminAction::TestBroadcast => {
            let summary = broadcast_to_all(db, messenger, messages::ADMIN_TEST_MESSAGE).await?;
            AdminOutcome::reply(messages::broadcast_report(summary.delivered, summary.attempted()))
        }
        AdminAction::Broadcast => {
            AdminOutcome::prompt(messages::ADMIN_BROADCAST_PROMPT, ConversationMode::Broadcast)
        }
        AdminAction::Announce => {
            AdminOutcome::prompt(messages::ADMIN_ANNOUNCE_PROMPT, ConversationMode::Announce)
        }
        AdminAction::SearchUser => {
            AdminOutcome::prompt(messages::ADMIN_SEARCH_PROMPT, ConversationMode::SearchUser)
        }
        AdminAction::DeleteUser => {
            AdminOutcome::prompt(messages::ADMIN_DELETE_PROMPT, ConversationMode::DeleteUser)
        }
        AdminAction::Status => AdminOutcome::reply(messages::ADMIN_STATUS),
    };
    Ok(outcome)
}
