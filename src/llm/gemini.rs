//! Gemini streaming adapter.
//!
//! Streams one code-generation completion over the Gemini REST API.
//! The prompt text comes from the first message and the screenshot
//! from the last; output chunks are forwarded to the caller's sink
//! as they arrive, while thought segments are only logged. A single
//! timeout, chosen by the model's capability class, bounds the whole
//! call.

use std::time::Instant;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::{Llm, StreamError};
use crate::config::Timeouts;
use crate::types::{ChatMessage, Completion, ContentPart};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    api_key: String,
    api_base: String,
    timeouts: Timeouts,
    client: reqwest::Client,
}

// --- Image Extraction ---

/// An image payload lifted out of the conversation, ready to attach
/// to a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePart {
    /// Inline base64 payload with its MIME type.
    Inline { mime_type: String, data: String },
    /// External URL the backend fetches itself.
    Uri(String),
}

/// Pull the image out of the last message's content parts.
///
/// A `data:` URI yields an inline payload (the base64 is validated
/// here, before any network call); any other URL is carried forward
/// unchanged. Earlier messages are never scanned: an image that only
/// appears further back is an error, same as no image at all.
pub fn extract_image_from_messages(messages: &[ChatMessage]) -> Result<ImagePart, StreamError> {
    let last = messages.last().ok_or(StreamError::MissingImage)?;

    for part in last.content.parts() {
        let url = match part {
            ContentPart::ImageUrl { image_url } => image_url.url.as_str(),
            ContentPart::Text { .. } => continue,
        };

        return match url.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest.split_once(',').ok_or_else(|| {
                    StreamError::InvalidImage("data URI has no payload".to_string())
                })?;
                let mime_type = header
                    .split_once(';')
                    .map_or(header, |(mime, _)| mime)
                    .to_string();
                STANDARD.decode(data).map_err(|e| {
                    StreamError::InvalidImage(format!("bad base64 payload: {}", e))
                })?;
                Ok(ImagePart::Inline {
                    mime_type,
                    data: data.to_string(),
                })
            }
            None => Ok(ImagePart::Uri(url.to_string())),
        };
    }

    Err(StreamError::MissingImage)
}

// --- API Request Types (Gemini format) ---

#[derive(Serialize)]
struct ApiRequest {
    contents: Vec<ApiContent>,
}

#[derive(Serialize)]
struct ApiContent {
    parts: Vec<ApiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<ApiFileData>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiBlob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFileData {
    file_uri: String,
}

impl ApiRequest {
    fn new(prompt: String, image: ImagePart) -> Self {
        let text_part = ApiPart {
            text: Some(prompt),
            inline_data: None,
            file_data: None,
        };
        let image_part = match image {
            ImagePart::Inline { mime_type, data } => ApiPart {
                text: None,
                inline_data: Some(ApiBlob { mime_type, data }),
                file_data: None,
            },
            ImagePart::Uri(uri) => ApiPart {
                text: None,
                inline_data: None,
                file_data: Some(ApiFileData { file_uri: uri }),
            },
        };
        Self {
            contents: vec![ApiContent {
                parts: vec![text_part, image_part],
            }],
        }
    }
}

// --- Streaming Response Types ---

#[derive(Deserialize, Debug)]
struct StreamResponseChunk {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Deserialize, Debug)]
struct ApiCandidate {
    content: Option<ApiCandidateContent>,
}

#[derive(Deserialize, Debug)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
    /// Reasoning commentary, not part of the generated output.
    #[serde(default)]
    thought: bool,
}

// --- Implementation ---

impl GeminiClient {
    pub fn new(api_key: String, api_base: Option<String>) -> Self {
        Self {
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeouts: Timeouts::default(),
            client: reqwest::Client::new(),
        }
    }

    /// Replace the default call bounds, e.g. with `Timeouts::from_env()`.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Stream one completion from `model`, forwarding each output
    /// chunk to `chunk_tx` in arrival order.
    ///
    /// Fails before any network call if the last message carries no
    /// usable image. If the bound elapses before the stream finishes
    /// the in-flight request is dropped and `Timeout` is returned;
    /// nothing more reaches the sink after that. Vendor-side and
    /// transport failures come back as typed errors, never retried
    /// here.
    pub async fn stream_completion(
        &self,
        messages: &[ChatMessage],
        model: Llm,
        chunk_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Completion, StreamError> {
        let start = Instant::now();

        let image = extract_image_from_messages(messages)?;
        let bound = self.timeouts.for_model(model);

        tracing::debug!(
            model = %model,
            timeout_secs = bound.as_secs(),
            "starting streaming call"
        );

        let result = tokio::time::timeout(
            bound,
            self.stream_inner(messages, model, image, &chunk_tx),
        )
        .await;

        match result {
            Ok(Ok(code)) => {
                let duration = start.elapsed().as_secs_f64();
                tracing::info!(model = %model, duration, "streaming call completed");
                Ok(Completion { duration, code })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(
                    model = %model,
                    timeout_secs = bound.as_secs(),
                    "streaming call timed out"
                );
                Err(StreamError::Timeout {
                    model,
                    timeout_secs: bound.as_secs(),
                })
            }
        }
    }

    async fn stream_inner(
        &self,
        messages: &[ChatMessage],
        model: Llm,
        image: ImagePart,
        chunk_tx: &mpsc::UnboundedSender<String>,
    ) -> Result<String, StreamError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.api_base.trim_end_matches('/'),
            model.as_str(),
            self.api_key
        );
        let prompt = messages
            .first()
            .map(|msg| msg.content.text())
            .unwrap_or_default();
        let request = ApiRequest::new(prompt, image);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StreamError::Api { status, body });
        }

        let mut byte_stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut code = String::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk_bytes = chunk_result?;
            buffer.extend_from_slice(&chunk_bytes);

            // A UTF-8 sequence can straddle two network chunks, so lines
            // are split at the byte level and decoded only once complete.
            while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                let decoded = String::from_utf8_lossy(&line_bytes);
                let line = decoded.trim_end_matches('\n').trim_end_matches('\r');

                if line.is_empty() {
                    continue;
                }

                let data = match line.strip_prefix("data: ") {
                    Some(d) => d,
                    None => continue,
                };

                let chunk: StreamResponseChunk = serde_json::from_str(data)?;
                forward_parts(&chunk, &mut code, chunk_tx);
            }
        }

        Ok(code)
    }
}

/// Route one decoded chunk: thought segments go to the log, output
/// text goes to the accumulator and the sink.
fn forward_parts(
    chunk: &StreamResponseChunk,
    code: &mut String,
    chunk_tx: &mpsc::UnboundedSender<String>,
) {
    let parts = chunk
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    for part in parts {
        let text = match part.text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => continue,
        };
        if part.thought {
            tracing::debug!(thought = %text, "thought summary");
        } else {
            code.push_str(text);
            let _ = chunk_tx.send(text.to_string());
        }
    }
}
