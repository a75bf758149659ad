pub mod app;
pub mod chat_stream;
pub mod config;
pub mod keyring;
pub mod layout;
pub mod message;
pub mod providers;
pub mod selection;
