//! Configuration management for snapcode.
//!
//! All settings come from environment variables with documented
//! defaults, so the engine runs unconfigured in development. A bad
//! override is logged and replaced by the default rather than
//! aborting startup.

use std::time::Duration;

use crate::llm::{Llm, TimeoutClass};

// --- Timeouts ---

/// Streaming call bounds per backend capability class.
///
/// One bound covers the whole call, from request start to stream
/// end. Looked up once per call and never consulted again.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeouts {
    pub gemini_default: Duration,
    pub gemini_thinking: Duration,
    pub gemini_preview: Duration,
    pub openai: Duration,
    pub anthropic: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            gemini_default: Duration::from_secs(300),  // 5 minutes
            gemini_thinking: Duration::from_secs(900), // 15 minutes
            gemini_preview: Duration::from_secs(1200), // 20 minutes
            openai: Duration::from_secs(600),          // 10 minutes
            anthropic: Duration::from_secs(600),       // 10 minutes
        }
    }
}

impl Timeouts {
    /// Read timeout overrides from the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            gemini_default: env_secs("GEMINI_DEFAULT_TIMEOUT", defaults.gemini_default),
            gemini_thinking: env_secs("GEMINI_THINKING_TIMEOUT", defaults.gemini_thinking),
            gemini_preview: env_secs("GEMINI_PREVIEW_TIMEOUT", defaults.gemini_preview),
            openai: env_secs("OPENAI_TIMEOUT", defaults.openai),
            anthropic: env_secs("ANTHROPIC_TIMEOUT", defaults.anthropic),
        }
    }

    /// The bound to apply to one streaming call for `model`.
    pub fn for_model(&self, model: Llm) -> Duration {
        match model.timeout_class() {
            TimeoutClass::GeminiDefault => self.gemini_default,
            TimeoutClass::GeminiThinking => self.gemini_thinking,
            TimeoutClass::GeminiPreview => self.gemini_preview,
            TimeoutClass::OpenAi => self.openai,
            TimeoutClass::Anthropic => self.anthropic,
        }
    }
}

// --- App Config ---

/// Process-level settings for the generation engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many parallel variants each request fans out to.
    pub num_variants: usize,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Override for OpenAI-compatible proxies.
    pub openai_base_url: Option<String>,
    /// When true, the call site substitutes the local mock stream
    /// for real adapters. The adapters themselves never check this.
    pub should_mock_ai_response: bool,
    pub is_debug_enabled: bool,
    /// Where debug artifacts are written when debugging is enabled.
    pub debug_dir: String,
    /// Feature flag for the hosted version.
    pub is_prod: bool,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_variants: 4,
            openai_api_key: None,
            anthropic_api_key: None,
            gemini_api_key: None,
            openai_base_url: None,
            should_mock_ai_response: false,
            is_debug_enabled: false,
            debug_dir: String::new(),
            is_prod: false,
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            num_variants: env_u64("NUM_VARIANTS", 4) as usize,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            should_mock_ai_response: std::env::var("MOCK")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            is_debug_enabled: env_truthy("IS_DEBUG_ENABLED"),
            debug_dir: std::env::var("DEBUG_DIR").unwrap_or_default(),
            is_prod: env_truthy("IS_PROD"),
            timeouts: Timeouts::from_env(),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(%name, %raw, "unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

fn env_secs(name: &str, default: Duration) -> Duration {
    Duration::from_secs(env_u64(name, default.as_secs()))
}

/// Set and non-empty counts as enabled, whatever the value.
fn env_truthy(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}
