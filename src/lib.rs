//! # Sadqa Bot
//!
//! A Telegram bot that reminds subscribers of the five daily prayers and
//! sends them a verse and a supplication every few hours.
//!
//! ## Features
//! - Subscribe, unsubscribe and toggle reminders from an inline menu
//! - Fixed prayer table or per-subscriber times from a shared location
//! - At most one reminder per subscriber, prayer and civil day
//! - Weekly Friday blessing
//! - Owner console for counts, listings, broadcasts and user management
//! - Persistent storage with SQLite

/// Bot command handlers, menus and the owner console
pub mod bot;
/// Configuration loaded from environment variables
pub mod config;
/// Subscriber store, notification ledger table and migrations
pub mod database;
/// User-facing texts
pub mod messages;
/// Scheduled passes, prayer time sources and the health server
pub mod services;
/// Utility functions for time formatting, validation and logging
pub mod utils;
