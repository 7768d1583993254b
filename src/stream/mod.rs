// src/stream/mod.rs
pub mod session;
pub mod sse;

pub use session::{Generation, PreviewSession, StreamAccumulator, StreamState, Ticket, Update};
pub use sse::{decode_frame, StreamEvent};
