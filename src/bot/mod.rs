pub mod admin;
pub mod commands;
pub mod handlers;
pub mod keyboards;
pub mod menu;
pub mod session;
