use crate::models::Block;
use serde::Deserialize;
use serde_json::Value;

/// Errors from encoding a block sequence into its persisted form.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Failed to encode block sequence: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A lesson payload after format detection.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedContent {
    /// The payload parsed as a JSON array of block entries.
    Structured(Vec<ContentEntry>),
    /// Anything that is not a JSON array, held verbatim for the legacy
    /// markdown fallback parser.
    Legacy(String),
}

impl DecodedContent {
    /// True when the payload predates the block model.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// One entry of a structured payload.
///
/// Decoding is per-entry: a single foreign entry does not reroute the whole
/// payload to the legacy parser, it becomes [`ContentEntry::Unsupported`]
/// while its neighbours decode normally.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentEntry {
    Block(Block),
    Unsupported(UnsupportedEntry),
}

impl ContentEntry {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(block) => Some(block),
            Self::Unsupported(_) => None,
        }
    }
}

/// A structured entry whose `type` tag or shape is outside the closed block
/// set. The raw JSON is kept so nothing is dropped on a later re-encode.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedEntry {
    pub type_tag: String,
    pub raw: Value,
}

/// Encode a block sequence as the canonical JSON array. Field order is fixed
/// by the block definitions, so equal sequences always produce identical
/// bytes.
pub fn serialize(blocks: &[Block]) -> Result<String, ContentError> {
    Ok(serde_json::to_string(blocks)?)
}

/// Decode a persisted payload, branching on format.
///
/// A payload is structured exactly when it parses as a JSON array; a JSON
/// document of any other shape is still legacy content. Decoding never
/// fails: the worst input is just legacy markdown.
pub fn deserialize(content: &str) -> DecodedContent {
    let Ok(values) = serde_json::from_str::<Vec<Value>>(content) else {
        tracing::debug!("payload is not a JSON array, treating as legacy markdown");
        return DecodedContent::Legacy(content.to_string());
    };
    let entries = values.into_iter().map(decode_entry).collect();
    DecodedContent::Structured(entries)
}

fn decode_entry(value: Value) -> ContentEntry {
    match Block::deserialize(&value) {
        Ok(block) => ContentEntry::Block(block),
        Err(_) => {
            let type_tag = value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            ContentEntry::Unsupported(UnsupportedEntry { type_tag, raw: value })
        }
    }
}
