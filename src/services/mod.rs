pub mod broadcast;
pub mod content;
pub mod health;
pub mod ledger;
pub mod messenger;
pub mod prayer_times;
pub mod reminder;
pub mod timezone;
