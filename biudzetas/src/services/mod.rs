// biudzetas/src/services/mod.rs

pub mod auth_service;
pub mod email_mock;
pub mod entry_service;
pub mod reset_token;
pub mod session;
pub mod signing;
