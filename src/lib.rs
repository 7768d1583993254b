// src/lib.rs
//! Parses LLM-authored community digest reports (pseudo-XML tagged sections)
//! into structured knowledge-card documents, plus the chat-log, streaming and
//! export pieces that sit around the parser.

pub mod chat;
pub mod extractors;
pub mod render;
pub mod storage;
pub mod stream;
pub mod utils;

pub use extractors::{derive_chart, parse, parse_with, ParsedDocument};
pub use utils::AppError;
