//! Docflow LLM - model services used by the pipeline.
//!
//! `GeminiClient` classifies documents and extracts their fields,
//! `OllamaClient` embeds summaries and answers questions locally. Callers
//! depend on the [`TextGenerator`] and [`Embedder`] traits so tests can
//! substitute fakes.

mod client;
mod error;
mod gemini;
pub mod rag;
mod traits;
mod types;

pub use client::OllamaClient;
pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use rag::{build_answer_prompt, build_context, ContextItem};
pub use traits::{Embedder, OllamaEmbedder, OllamaGenerator, TextGenerator};
pub use types::*;
