// biudzetas/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod auth_handlers;
pub mod entry_handlers;
pub mod reset_handlers;
