// src/chat/mod.rs
pub mod parser;
pub mod window;

pub use parser::{parse_chat_log, parse_timestamp, ChatMessage, MessageKind};
pub use window::{MessageWindow, ScrollTarget};
