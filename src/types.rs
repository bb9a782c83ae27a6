//! Core data types used throughout snapcode.
//!
//! This module defines the chat message types shared by all LLM
//! adapters, and the completion result returned when a stream ends.

use serde::{Deserialize, Serialize};

// --- Message Roles ---

/// The role of a message in the conversation.
///
/// LLM APIs use roles to distinguish who said what:
/// - `System`: instructions to the AI (invisible to the user)
/// - `User`: the human's input
/// - `Assistant`: the AI's response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// --- Message Content ---

/// An image reference inside a multimodal message part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    /// Either a `data:` URI with base64 payload or an external URL
    pub url: String,
}

/// One part of a multimodal message.
///
/// Follows the OpenAI-style content-part shape: a part is either
/// plain text or an image reference, discriminated by a `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// The content of a chat message.
///
/// Plain text messages carry a bare string; multimodal messages carry
/// a list of parts. Serialized untagged so both wire shapes round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of this content (all text parts, in order).
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect(),
        }
    }

    /// The structured parts of this content (empty for plain text).
    pub fn parts(&self) -> &[ContentPart] {
        match self {
            MessageContent::Text(_) => &[],
            MessageContent::Parts(parts) => parts,
        }
    }
}

// --- Messages ---

/// A single message in the conversation history.
///
/// The conversation sent to an adapter is modeled as a
/// `Vec<ChatMessage>`; adapters convert it into their provider's
/// API format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a system message (sets the AI's behavior/instructions).
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create an assistant message (text reply from the AI).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message carrying both text and an image.
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

// --- Completion ---

/// The result of a completed streaming call.
///
/// `code` is the full generated output (the concatenation of every
/// chunk that was streamed out); `duration` is wall-clock seconds
/// from request start to stream end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Completion {
    pub duration: f64,
    pub code: String,
}
