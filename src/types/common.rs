//! Resource types returned by the Lara service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// A translation memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Memory identifier, e.g. `mem_xyz123`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owner account.
    #[serde(default)]
    pub owner_id: String,
    /// Caller-defined identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Number of collaborators when shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborators_count: Option<u32>,
    /// Time the memory was shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<DateTime<Utc>>,
}

/// A glossary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glossary {
    /// Glossary identifier, e.g. `gls_xyz123`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owner account.
    #[serde(default)]
    pub owner_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Number of collaborators when shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaborators_count: Option<u32>,
    /// Time the glossary was shared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_at: Option<DateTime<Utc>>,
}

/// Term counts of a glossary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryCounts {
    /// Per-language counts of unidirectional entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidirectional: Option<HashMap<String, u64>>,
    /// Count of multidirectional entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multidirectional: Option<u64>,
}

/// An asynchronous import or content change.
///
/// Shared by memory and glossary imports. There is no failure state: a job
/// is done when `progress` is exactly `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    /// Job identifier.
    pub id: String,
    /// First position of the job in its channel.
    #[serde(default, deserialize_with = "null_as_default")]
    pub begin: u64,
    /// Last position of the job in its channel.
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: u64,
    /// Processing channel.
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel: u32,
    /// Payload size.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    /// Completion in `[0, 1]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: f64,
}

/// Decodes an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ImportJob {
    /// Whether the job has finished.
    #[allow(clippy::float_cmp)]
    pub fn is_complete(&self) -> bool {
        self.progress == 1.0
    }
}

/// Document translation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Upload registered.
    Initialized,
    /// Content is being analysed.
    Analyzing,
    /// Waiting for external confirmation.
    Paused,
    /// Ready to be translated.
    Ready,
    /// Translation in progress.
    Translating,
    /// Translation finished.
    Translated,
    /// Translation failed.
    Error,
}

impl DocumentStatus {
    /// Returns the API string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Initialized => "initialized",
            DocumentStatus::Analyzing => "analyzing",
            DocumentStatus::Paused => "paused",
            DocumentStatus::Ready => "ready",
            DocumentStatus::Translating => "translating",
            DocumentStatus::Translated => "translated",
            DocumentStatus::Error => "error",
        }
    }

    /// `translated` and `error` are terminal; `paused` is not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Translated | DocumentStatus::Error)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translation options recorded on a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentOptions {
    /// Memories the translation adapts to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapt_to: Option<Vec<String>>,
    /// Glossaries applied to the translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossaries: Option<Vec<String>>,
}

/// A document submitted for translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: String,
    /// Current status.
    pub status: DocumentStatus,
    /// Source language, absent when auto-detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Target language.
    pub target: String,
    /// Original file name.
    pub filename: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Options the document was submitted with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<DocumentOptions>,
    /// Characters translated so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_chars: Option<u64>,
    /// Total characters to translate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chars: Option<u64>,
    /// Failure reason for the `error` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

/// A unit of text with a translatability flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content.
    pub text: String,
    /// Whether the block should be translated.
    #[serde(default = "default_translatable")]
    pub translatable: bool,
}

fn default_translatable() -> bool {
    true
}

impl TextBlock {
    /// A translatable block.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: true,
        }
    }

    /// A block passed through untranslated.
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translatable: false,
        }
    }
}
