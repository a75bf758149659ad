pub mod chat_loop;
pub mod renderer;
pub mod selector;
pub mod theme;
