pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
