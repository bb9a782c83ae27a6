//! Variant model selection.
//!
//! Given a generation type, an input modality, and a variant count,
//! decide which backend serves each parallel variant. Selection is a
//! table lookup plus cyclic assignment: variant `i` gets candidate
//! `i % len`. No I/O, no state, safe to call from any task.
//!
//! Capability restrictions live in the table, not the algorithm. A
//! backend that cannot handle a mode is substituted out of that
//! mode's entry at table-construction time, so the assignment loop
//! stays oblivious to vendor quirks.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use thiserror::Error;

use crate::llm::Llm;

// --- Selection Inputs ---

/// Whether the request creates fresh code or updates existing code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationType {
    Create,
    Update,
}

/// The modality of the user's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Text,
    Image,
}

impl FromStr for GenerationType {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(GenerationType::Create),
            "update" => Ok(GenerationType::Update),
            other => Err(SelectionError::UnknownGenerationType(other.to_string())),
        }
    }
}

impl FromStr for InputMode {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InputMode::Text),
            "image" => Ok(InputMode::Image),
            other => Err(SelectionError::UnknownInputMode(other.to_string())),
        }
    }
}

// --- Mode Key ---

/// The four selection modes, one per (generation type, modality) pair.
///
/// Every modality other than plain text buckets into the `NonText`
/// keys, so new image-like modalities reuse the existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKey {
    CreateText,
    CreateNonText,
    UpdateText,
    UpdateNonText,
}

impl ModeKey {
    pub fn new(generation_type: GenerationType, input_mode: InputMode) -> Self {
        match (generation_type, input_mode) {
            (GenerationType::Create, InputMode::Text) => ModeKey::CreateText,
            (GenerationType::Create, _) => ModeKey::CreateNonText,
            (GenerationType::Update, InputMode::Text) => ModeKey::UpdateText,
            (GenerationType::Update, _) => ModeKey::UpdateNonText,
        }
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKey::CreateText => "create_text",
            ModeKey::CreateNonText => "create_non_text",
            ModeKey::UpdateText => "update_text",
            ModeKey::UpdateNonText => "update_non_text",
        };
        f.write_str(name)
    }
}

// --- Errors ---

/// A selection request that cannot be satisfied.
///
/// All variants indicate a caller or deployment bug, never a
/// transient condition, so there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("unknown generation type: {0}")]
    UnknownGenerationType(String),
    #[error("unknown input mode: {0}")]
    UnknownInputMode(String),
    #[error("no models configured for mode {0}")]
    NoModelsForMode(ModeKey),
}

// --- Selection Table ---

/// Ordered candidate models per mode, best first.
///
/// Entries may repeat a model to cover more than one variant slot.
#[derive(Debug, Clone)]
pub struct SelectionTable {
    entries: HashMap<ModeKey, Vec<Llm>>,
}

impl SelectionTable {
    /// A table with no entries; populate with `with_entry`.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, key: ModeKey, models: Vec<Llm>) -> Self {
        self.entries.insert(key, models);
        self
    }

    /// The configured candidate list for `key`, if any.
    pub fn candidates(&self, key: ModeKey) -> Option<&[Llm]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Assign a model to each of `variant_count` variant slots.
    ///
    /// Slots index the mode's candidate list cyclically, so a count
    /// past the list length wraps back to the top. A count of zero
    /// yields an empty list. A missing or empty entry is an error.
    pub fn select(
        &self,
        generation_type: GenerationType,
        input_mode: InputMode,
        variant_count: usize,
    ) -> Result<Vec<Llm>, SelectionError> {
        let key = ModeKey::new(generation_type, input_mode);
        let candidates = self
            .entries
            .get(&key)
            .filter(|models| !models.is_empty())
            .ok_or(SelectionError::NoModelsForMode(key))?;
        Ok((0..variant_count)
            .map(|i| candidates[i % candidates.len()])
            .collect())
    }

    /// The process-wide table used by [`select_models`].
    pub fn builtin() -> &'static SelectionTable {
        static BUILTIN: OnceLock<SelectionTable> = OnceLock::new();
        BUILTIN.get_or_init(SelectionTable::default)
    }
}

impl Default for SelectionTable {
    fn default() -> Self {
        Self::empty()
            .with_entry(
                ModeKey::CreateText,
                vec![
                    Llm::Gpt4_1,
                    Llm::Claude37Sonnet,
                    Llm::Claude4Sonnet,
                    Llm::Gpt4o,
                ],
            )
            .with_entry(
                ModeKey::CreateNonText,
                vec![
                    Llm::Gpt4_1Nano,
                    Llm::Gpt4_1Mini,
                    Llm::Gemini20Flash,
                    Llm::Claude3Haiku,
                ],
            )
            .with_entry(
                ModeKey::UpdateText,
                vec![
                    Llm::Gpt4_1,
                    Llm::Claude37Sonnet,
                    Llm::Claude4Sonnet,
                    Llm::Gpt4o,
                ],
            )
            // Gemini cannot update existing code; Claude 3.7 covers its slot.
            .with_entry(
                ModeKey::UpdateNonText,
                vec![
                    Llm::Gpt4_1,
                    Llm::Claude37Sonnet,
                    Llm::Claude37Sonnet,
                    Llm::Gpt4o,
                ],
            )
    }
}

/// Pick the backend for each of `variant_count` parallel variants
/// using the built-in table.
pub fn select_models(
    generation_type: GenerationType,
    input_mode: InputMode,
    variant_count: usize,
) -> Result<Vec<Llm>, SelectionError> {
    SelectionTable::builtin().select(generation_type, input_mode, variant_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_text_selection() {
        let models = select_models(GenerationType::Create, InputMode::Text, 4).unwrap();
        assert_eq!(
            models,
            vec![
                Llm::Gpt4_1,
                Llm::Claude37Sonnet,
                Llm::Claude4Sonnet,
                Llm::Gpt4o,
            ]
        );
    }

    #[test]
    fn test_update_text_selection() {
        let models = select_models(GenerationType::Update, InputMode::Text, 4).unwrap();
        assert_eq!(
            models,
            vec![
                Llm::Gpt4_1,
                Llm::Claude37Sonnet,
                Llm::Claude4Sonnet,
                Llm::Gpt4o,
            ]
        );
    }

    #[test]
    fn test_create_image_selection() {
        let models = select_models(GenerationType::Create, InputMode::Image, 4).unwrap();
        assert_eq!(
            models,
            vec![
                Llm::Gpt4_1Nano,
                Llm::Gpt4_1Mini,
                Llm::Gemini20Flash,
                Llm::Claude3Haiku,
            ]
        );
    }

    #[test]
    fn test_update_image_substitutes_for_gemini() {
        let models = select_models(GenerationType::Update, InputMode::Image, 4).unwrap();
        assert_eq!(
            models,
            vec![
                Llm::Gpt4_1,
                Llm::Claude37Sonnet,
                Llm::Claude37Sonnet,
                Llm::Gpt4o,
            ]
        );
    }

    #[test]
    fn test_selection_wraps_past_candidate_count() {
        let models = select_models(GenerationType::Create, InputMode::Text, 6).unwrap();
        assert_eq!(models.len(), 6);
        assert_eq!(models[4], Llm::Gpt4_1);
        assert_eq!(models[5], Llm::Claude37Sonnet);
    }

    #[test]
    fn test_zero_variants_is_empty() {
        let models = select_models(GenerationType::Create, InputMode::Text, 0).unwrap();
        assert!(models.is_empty());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let first = select_models(GenerationType::Update, InputMode::Image, 8).unwrap();
        let second = select_models(GenerationType::Update, InputMode::Image, 8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_table_cycles_with_duplicates() {
        let table = SelectionTable::empty().with_entry(
            ModeKey::UpdateNonText,
            vec![Llm::Gpt4o, Llm::Claude35Sonnet, Llm::Gpt4o],
        );
        let models = table
            .select(GenerationType::Update, InputMode::Image, 4)
            .unwrap();
        assert_eq!(
            models,
            vec![Llm::Gpt4o, Llm::Claude35Sonnet, Llm::Gpt4o, Llm::Gpt4o]
        );
    }

    #[test]
    fn test_missing_mode_entry_errors() {
        let table = SelectionTable::empty();
        let err = table
            .select(GenerationType::Create, InputMode::Text, 4)
            .unwrap_err();
        assert_eq!(err, SelectionError::NoModelsForMode(ModeKey::CreateText));
    }

    #[test]
    fn test_empty_mode_entry_errors() {
        let table = SelectionTable::empty().with_entry(ModeKey::CreateText, vec![]);
        let err = table
            .select(GenerationType::Create, InputMode::Text, 4)
            .unwrap_err();
        assert_eq!(err, SelectionError::NoModelsForMode(ModeKey::CreateText));
    }

    #[test]
    fn test_parse_generation_type() {
        assert_eq!("create".parse(), Ok(GenerationType::Create));
        assert_eq!("update".parse(), Ok(GenerationType::Update));
        assert_eq!(
            "delete".parse::<GenerationType>(),
            Err(SelectionError::UnknownGenerationType("delete".to_string()))
        );
    }

    #[test]
    fn test_parse_input_mode() {
        assert_eq!("text".parse(), Ok(InputMode::Text));
        assert_eq!("image".parse(), Ok(InputMode::Image));
        assert_eq!(
            "video".parse::<InputMode>(),
            Err(SelectionError::UnknownInputMode("video".to_string()))
        );
    }

    #[test]
    fn test_mode_key_display() {
        assert_eq!(ModeKey::CreateNonText.to_string(), "create_non_text");
        assert_eq!(
            ModeKey::new(GenerationType::Update, InputMode::Image).to_string(),
            "update_non_text"
        );
    }
}
