//! Response types for Lara operations.

use super::{InputShape, TextBlock};
use crate::error::ResponseError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Translated text in the shape of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Translation {
    /// Translation of a single string.
    Text(String),
    /// Translations of a list of strings.
    Texts(Vec<String>),
    /// Translations of a list of blocks.
    Blocks(Vec<TextBlock>),
}

impl Translation {
    /// Decode `value` according to the input shape.
    pub fn from_value(value: Value, shape: InputShape) -> Result<Self, ResponseError> {
        Ok(match shape {
            InputShape::Text => Translation::Text(serde_json::from_value(value)?),
            InputShape::Texts => Translation::Texts(serde_json::from_value(value)?),
            InputShape::Blocks => Translation::Blocks(serde_json::from_value(value)?),
        })
    }

    /// The scalar translation, if the input was a single string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Translation::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A memory segment that influenced a translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMatch {
    /// Memory id.
    pub memory: String,
    /// Translation unit id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuid: Option<String>,
    /// Source and target language.
    pub language: Vec<String>,
    /// Source sentence.
    pub sentence: String,
    /// Stored translation.
    pub translation: String,
    /// Match score.
    pub score: f64,
}

/// A glossary term that influenced a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryMatch {
    /// Glossary id.
    pub glossary: String,
    /// Source and target language.
    pub language: Vec<String>,
    /// Source term.
    pub term: String,
    /// Target term.
    pub translation: String,
}

/// Matches in the shape of the input: one list for a scalar input, one list
/// per item otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Matches<M> {
    /// Matches for a single string.
    Single(Vec<M>),
    /// Matches per input item.
    PerItem(Vec<Vec<M>>),
}

impl<M: DeserializeOwned> Matches<M> {
    /// Decode `value` according to the input shape.
    pub fn from_value(value: Value, shape: InputShape) -> Result<Self, ResponseError> {
        Ok(match shape {
            InputShape::Text => Matches::Single(serde_json::from_value(value)?),
            InputShape::Texts | InputShape::Blocks => {
                Matches::PerItem(serde_json::from_value(value)?)
            }
        })
    }
}

/// Result of a text translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextResult {
    /// Media type of the text.
    pub content_type: String,
    /// Source language, detected or given.
    pub source_language: String,
    /// Translated text.
    pub translation: Translation,
    /// Memories the translation adapted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapted_to: Option<Vec<String>>,
    /// Glossaries applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossaries: Option<Vec<String>>,
    /// Memory matches, when verbose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapted_to_matches: Option<Matches<MemoryMatch>>,
    /// Glossary matches, when verbose.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossaries_matches: Option<Matches<GlossaryMatch>>,
}

impl TextResult {
    /// Decode a `/translate` payload for an input of the given shape.
    pub fn from_content(content: Value, shape: InputShape) -> Result<Self, ResponseError> {
        let mut fields = match content {
            Value::Object(map) => map,
            other => {
                return Err(ResponseError::InvalidJson {
                    message: format!("expected translation object, got {}", other),
                })
            }
        };

        let translation = take_required(&mut fields, "translation")?;

        Ok(Self {
            content_type: take_string(&mut fields, "content_type")?,
            source_language: take_string(&mut fields, "source_language")?,
            translation: Translation::from_value(translation, shape)?,
            adapted_to: take_optional(&mut fields, "adapted_to")?,
            glossaries: take_optional(&mut fields, "glossaries")?,
            adapted_to_matches: take_present(&mut fields, "adapted_to_matches")
                .map(|v| Matches::from_value(v, shape))
                .transpose()?,
            glossaries_matches: take_present(&mut fields, "glossaries_matches")
                .map(|v| Matches::from_value(v, shape))
                .transpose()?,
        })
    }
}

fn take_present(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    fields.remove(name).filter(|v| !v.is_null())
}

fn take_required(fields: &mut Map<String, Value>, name: &str) -> Result<Value, ResponseError> {
    take_present(fields, name).ok_or_else(|| ResponseError::MissingField {
        field: name.to_string(),
    })
}

fn take_string(fields: &mut Map<String, Value>, name: &str) -> Result<String, ResponseError> {
    Ok(serde_json::from_value(take_required(fields, name)?)?)
}

fn take_optional<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    name: &str,
) -> Result<Option<T>, ResponseError> {
    take_present(fields, name)
        .map(serde_json::from_value::<T>)
        .transpose()
        .map_err(ResponseError::from)
}

/// Result of language detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectResult {
    /// Detected language.
    pub language: String,
    /// Media type of the text.
    pub content_type: String,
}

/// Pre-signed object-storage upload target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadUrl {
    /// Upload URL.
    pub url: String,
    /// Form fields to send with the file.
    pub fields: Map<String, Value>,
}

impl UploadUrl {
    /// Storage key of the upload.
    pub fn key(&self) -> Option<&str> {
        self.fields.get("key").and_then(Value::as_str)
    }

    /// Form fields as text, sorted by name.
    pub fn text_fields(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }
}

/// Pre-signed object-storage download target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadUrl {
    /// Download URL.
    pub url: String,
}
