//! snapcode core engine.
//!
//! Turns a screenshot (or a text brief) into code by fanning each
//! request out to several LLM backends in parallel and streaming
//! every variant's output back as it is generated. This crate holds
//! the two leaf pieces of that pipeline:
//!
//! - [`selection`]: decide which backend serves each variant slot.
//! - [`llm`]: stream one completion from a backend under a timeout.
//!
//! HTTP routing, prompt assembly, and post-processing of the
//! generated code are the caller's concern.

pub mod config;
pub mod llm;
pub mod selection;
pub mod types;

pub use config::{Config, Timeouts};
pub use llm::gemini::{extract_image_from_messages, GeminiClient, ImagePart};
pub use llm::mock::stream_mock_completion;
pub use llm::{Llm, Provider, StreamError, TimeoutClass};
pub use selection::{
    select_models, GenerationType, InputMode, ModeKey, SelectionError, SelectionTable,
};
pub use types::{ChatMessage, Completion, ContentPart, ImageUrl, MessageContent, Role};
