pub mod chat;
pub mod overlay;
pub mod prompt;
