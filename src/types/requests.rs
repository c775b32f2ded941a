//! Request parameter types.

use super::TextBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One resource id or a list of ids.
///
/// Operations that accept either dispatch once on the variant, and the
/// result shape follows it: a list of one id is still a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSelector {
    /// A single id.
    One(String),
    /// Several ids.
    Many(Vec<String>),
}

impl IdSelector {
    /// All ids as a list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            IdSelector::One(id) => vec![id.clone()],
            IdSelector::Many(ids) => ids.clone(),
        }
    }
}

impl From<&str> for IdSelector {
    fn from(id: &str) -> Self {
        IdSelector::One(id.to_string())
    }
}

impl From<String> for IdSelector {
    fn from(id: String) -> Self {
        IdSelector::One(id)
    }
}

impl From<&String> for IdSelector {
    fn from(id: &String) -> Self {
        IdSelector::One(id.clone())
    }
}

impl From<Vec<String>> for IdSelector {
    fn from(ids: Vec<String>) -> Self {
        IdSelector::Many(ids)
    }
}

impl From<Vec<&str>> for IdSelector {
    fn from(ids: Vec<&str>) -> Self {
        IdSelector::Many(ids.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for IdSelector {
    fn from(ids: &[&str]) -> Self {
        IdSelector::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for IdSelector {
    fn from(ids: [&str; N]) -> Self {
        IdSelector::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// A translation unit to add to or remove from memories.
///
/// Unset optional fields are not sent. Without a `tuid`, adding always
/// creates a new unit and deleting removes every unit matching the other
/// fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// Source language.
    pub source: String,
    /// Target language.
    pub target: String,
    /// Source sentence.
    pub sentence: String,
    /// Target sentence.
    pub translation: String,
    /// Translation unit id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuid: Option<String>,
    /// Context before the sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_before: Option<String>,
    /// Context after the sentence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_after: Option<String>,
}

impl TranslationUnit {
    /// Create a unit without id or context.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        sentence: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            sentence: sentence.into(),
            translation: translation.into(),
            tuid: None,
            sentence_before: None,
            sentence_after: None,
        }
    }

    /// Set the translation unit id.
    pub fn with_tuid(mut self, tuid: impl Into<String>) -> Self {
        self.tuid = Some(tuid.into());
        self
    }

    /// Set the surrounding context.
    pub fn with_context(
        mut self,
        sentence_before: impl Into<String>,
        sentence_after: impl Into<String>,
    ) -> Self {
        self.sentence_before = Some(sentence_before.into());
        self.sentence_after = Some(sentence_after.into());
        self
    }
}

/// Text to translate or detect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateInput {
    /// A single string.
    Text(String),
    /// A list of strings.
    Texts(Vec<String>),
    /// A list of blocks with translatability flags.
    Blocks(Vec<TextBlock>),
}

impl TranslateInput {
    /// The `q` field in the matching JSON shape.
    pub fn to_query(&self) -> Value {
        match self {
            TranslateInput::Text(text) => Value::from(text.as_str()),
            TranslateInput::Texts(texts) => Value::from(texts.clone()),
            TranslateInput::Blocks(blocks) => {
                serde_json::to_value(blocks).unwrap_or(Value::Array(Vec::new()))
            }
        }
    }

    /// Shape of this input.
    pub fn shape(&self) -> InputShape {
        match self {
            TranslateInput::Text(_) => InputShape::Text,
            TranslateInput::Texts(_) => InputShape::Texts,
            TranslateInput::Blocks(_) => InputShape::Blocks,
        }
    }
}

impl From<&str> for TranslateInput {
    fn from(text: &str) -> Self {
        TranslateInput::Text(text.to_string())
    }
}

impl From<String> for TranslateInput {
    fn from(text: String) -> Self {
        TranslateInput::Text(text)
    }
}

impl From<Vec<String>> for TranslateInput {
    fn from(texts: Vec<String>) -> Self {
        TranslateInput::Texts(texts)
    }
}

impl From<Vec<&str>> for TranslateInput {
    fn from(texts: Vec<&str>) -> Self {
        TranslateInput::Texts(texts.into_iter().map(String::from).collect())
    }
}

impl From<Vec<TextBlock>> for TranslateInput {
    fn from(blocks: Vec<TextBlock>) -> Self {
        TranslateInput::Blocks(blocks)
    }
}

/// Shape of a [`TranslateInput`], mirrored by the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// Scalar string.
    Text,
    /// List of strings.
    Texts,
    /// List of blocks.
    Blocks,
}

/// Scheduling priority of a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Interactive traffic.
    Normal,
    /// Bulk traffic.
    Background,
}

/// Translation cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UseCache {
    /// Read and write the cache.
    Yes,
    /// Bypass the cache.
    No,
    /// Translate again and replace the cached entry.
    Overwrite,
}

impl From<bool> for UseCache {
    fn from(value: bool) -> Self {
        if value {
            UseCache::Yes
        } else {
            UseCache::No
        }
    }
}

/// Options for text translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslateOptions {
    /// Source language, detected when absent.
    pub source: Option<String>,
    /// Target language.
    pub target: String,
    /// Hint for source detection.
    pub source_hint: Option<String>,
    /// Media type of the text, e.g. `text/html`.
    pub content_type: Option<String>,
    /// Whether newlines separate independent segments.
    pub multiline: bool,
    /// Memories to adapt to.
    pub adapt_to: Option<Vec<String>>,
    /// Glossaries to apply.
    pub glossaries: Option<Vec<String>>,
    /// Free-form instructions.
    pub instructions: Option<Vec<String>>,
    /// Server-side timeout in milliseconds.
    #[serde(rename = "timeout")]
    pub timeout_ms: Option<u64>,
    /// Scheduling priority.
    pub priority: Option<Priority>,
    /// Cache policy.
    pub use_cache: Option<UseCache>,
    /// Cache entry lifetime in seconds.
    #[serde(rename = "cache_ttl")]
    pub cache_ttl_s: Option<u64>,
    /// Return memory and glossary matches.
    pub verbose: Option<bool>,
}

impl TranslateOptions {
    /// Options translating into `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            source: None,
            target: target.into(),
            source_hint: None,
            content_type: None,
            multiline: true,
            adapt_to: None,
            glossaries: None,
            instructions: None,
            timeout_ms: None,
            priority: None,
            use_cache: None,
            cache_ttl_s: None,
            verbose: None,
        }
    }

    /// Set the source language.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the source detection hint.
    pub fn with_source_hint(mut self, hint: impl Into<String>) -> Self {
        self.source_hint = Some(hint.into());
        self
    }

    /// Set the text media type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set multiline handling.
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Adapt to the given memories.
    pub fn with_adapt_to<I, S>(mut self, memories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adapt_to = Some(memories.into_iter().map(Into::into).collect());
        self
    }

    /// Apply the given glossaries.
    pub fn with_glossaries<I, S>(mut self, glossaries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glossaries = Some(glossaries.into_iter().map(Into::into).collect());
        self
    }

    /// Add an instruction.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instructions
            .get_or_insert_with(Vec::new)
            .push(instruction.into());
        self
    }

    /// Set the server-side timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the cache policy.
    pub fn with_use_cache(mut self, use_cache: impl Into<UseCache>) -> Self {
        self.use_cache = Some(use_cache.into());
        self
    }

    /// Set the cache lifetime.
    pub fn with_cache_ttl_s(mut self, cache_ttl_s: u64) -> Self {
        self.cache_ttl_s = Some(cache_ttl_s);
        self
    }

    /// Request match details.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }
}

/// Options for document upload and translation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUploadOptions {
    /// Source language, detected when absent.
    pub source: Option<String>,
    /// Target language.
    pub target: String,
    /// Memories to adapt to.
    pub adapt_to: Option<Vec<String>>,
    /// Glossaries to apply.
    pub glossaries: Option<Vec<String>>,
    /// Output format requested at download.
    pub output_format: Option<String>,
}

impl DocumentUploadOptions {
    /// Options translating into `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Set the source language.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adapt to the given memories.
    pub fn with_adapt_to<I, S>(mut self, memories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adapt_to = Some(memories.into_iter().map(Into::into).collect());
        self
    }

    /// Apply the given glossaries.
    pub fn with_glossaries<I, S>(mut self, glossaries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.glossaries = Some(glossaries.into_iter().map(Into::into).collect());
        self
    }

    /// Set the download output format.
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }
}

/// Layout of an exported glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlossaryExportFormat {
    /// One column per language pair direction.
    #[serde(rename = "csv/table-uni")]
    CsvTableUni,
    /// One column per language.
    #[serde(rename = "csv/table-multi")]
    CsvTableMulti,
}

impl GlossaryExportFormat {
    /// Returns the API string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GlossaryExportFormat::CsvTableUni => "csv/table-uni",
            GlossaryExportFormat::CsvTableMulti => "csv/table-multi",
        }
    }
}
