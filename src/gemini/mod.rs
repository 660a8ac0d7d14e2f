//! Gemini text generation: request/response types, error classification,
//! and the `GenerationClient` seam used by the record processor.

pub mod client;
mod extract;
pub mod types;

pub use client::{GeminiClient, GeminiError, GenerationClient};
