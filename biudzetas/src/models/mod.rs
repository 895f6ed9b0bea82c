// biudzetas/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod entry;
pub mod user;

pub use entry::Entry;
pub use user::User;
