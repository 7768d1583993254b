// src/render/mod.rs
pub mod markdown;
pub mod mermaid;

pub use markdown::to_markdown;
pub use mermaid::pie_chart;
