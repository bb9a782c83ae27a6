//! LLM backend definitions and streaming adapters.
//!
//! This module defines the closed set of models the engine can
//! dispatch to (`Llm`), the capability classes used to pick a
//! per-call timeout, and the typed errors a streaming adapter
//! reports. Concrete adapters live in submodules.

pub mod gemini;
pub mod mock;

use std::fmt;

use thiserror::Error;

// --- Models ---

/// The closed set of LLM backends available for code generation.
///
/// Each variant corresponds to one provider model version. The
/// selection table and the adapters reference these by value, so
/// adding a model means adding a variant here and wiring it into
/// `provider()` and `timeout_class()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Llm {
    Gpt4_1,
    Gpt4_1Mini,
    Gpt4_1Nano,
    Gpt4o,
    Claude4Sonnet,
    Claude37Sonnet,
    Claude35Sonnet,
    Claude3Haiku,
    Gemini25Pro,
    Gemini25Flash,
    Gemini25FlashLite,
    Gemini25FlashPreview,
    Gemini20Flash,
}

/// The vendor behind a model, used to route a variant to its adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
}

/// Capability bucket that decides how long a streaming call may run.
///
/// Extended-reasoning models emit thought segments before output and
/// need a longer bound; preview builds are slower still and get the
/// longest bound of all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutClass {
    GeminiDefault,
    GeminiThinking,
    GeminiPreview,
    OpenAi,
    Anthropic,
}

impl Llm {
    /// The model identifier string this backend expects on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Llm::Gpt4_1 => "gpt-4.1-2025-04-14",
            Llm::Gpt4_1Mini => "gpt-4.1-mini-2025-04-14",
            Llm::Gpt4_1Nano => "gpt-4.1-nano-2025-04-14",
            Llm::Gpt4o => "gpt-4o-2024-11-20",
            Llm::Claude4Sonnet => "claude-sonnet-4-20250514",
            Llm::Claude37Sonnet => "claude-3-7-sonnet-20250219",
            Llm::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            Llm::Claude3Haiku => "claude-3-haiku-20240307",
            Llm::Gemini25Pro => "gemini-2.5-pro",
            Llm::Gemini25Flash => "gemini-2.5-flash",
            Llm::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Llm::Gemini25FlashPreview => "gemini-2.5-flash-preview-05-20",
            Llm::Gemini20Flash => "gemini-2.0-flash",
        }
    }

    /// Which vendor serves this model.
    pub fn provider(&self) -> Provider {
        match self {
            Llm::Gpt4_1 | Llm::Gpt4_1Mini | Llm::Gpt4_1Nano | Llm::Gpt4o => Provider::OpenAi,
            Llm::Claude4Sonnet | Llm::Claude37Sonnet | Llm::Claude35Sonnet | Llm::Claude3Haiku => {
                Provider::Anthropic
            }
            Llm::Gemini25Pro
            | Llm::Gemini25Flash
            | Llm::Gemini25FlashLite
            | Llm::Gemini25FlashPreview
            | Llm::Gemini20Flash => Provider::Google,
        }
    }

    /// The timeout bucket for this model.
    pub fn timeout_class(&self) -> TimeoutClass {
        match self {
            Llm::Gemini25FlashPreview => TimeoutClass::GeminiPreview,
            Llm::Gemini25Pro | Llm::Gemini25Flash => TimeoutClass::GeminiThinking,
            Llm::Gemini25FlashLite | Llm::Gemini20Flash => TimeoutClass::GeminiDefault,
            _ => match self.provider() {
                Provider::OpenAi => TimeoutClass::OpenAi,
                Provider::Anthropic => TimeoutClass::Anthropic,
                Provider::Google => TimeoutClass::GeminiDefault,
            },
        }
    }
}

impl fmt::Display for Llm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Errors ---

/// Failures a streaming adapter call can end in.
///
/// The adapter never retries internally; each variant is surfaced
/// to the caller, which owns the retry/fallback policy.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The last message carried no image part.
    #[error("no image found in messages")]
    MissingImage,
    /// The image part was present but its payload is unusable.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
    /// The call exceeded its allotted bound and was cancelled.
    #[error("{model} timed out after {timeout_secs}s")]
    Timeout { model: Llm, timeout_secs: u64 },
    /// The backend rejected the request.
    #[error("API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Transport-level failure talking to the backend.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The backend sent a chunk we could not parse.
    #[error("malformed stream chunk: {0}")]
    Decode(#[from] serde_json::Error),
}
