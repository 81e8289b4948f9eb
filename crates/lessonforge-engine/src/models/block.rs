use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// XP a practice block is worth when the author hasn't set a value.
pub const DEFAULT_PRACTICE_XP: u32 = 25;

/// Unique identifier for a content block within a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Rendering style of a text block: a heading level or plain paragraph prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    #[default]
    Paragraph,
}

/// Programming language of a code block.
///
/// Deserialization never fails: tags outside the known set collapse to
/// [`Language::Text`] so old payloads keep loading after a language is
/// retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    TypeScript,
    Java,
    C,
    Cpp,
    Sql,
    Html,
    Css,
    Bash,
    Text,
}

impl Language {
    /// Parse a language tag as written after a code fence, tolerating the
    /// short aliases that show up in hand-written markdown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Self::Python,
            "javascript" | "js" => Self::JavaScript,
            "typescript" | "ts" => Self::TypeScript,
            "java" => Self::Java,
            "c" => Self::C,
            "cpp" | "c++" => Self::Cpp,
            "sql" => Self::Sql,
            "html" => Self::Html,
            "css" => Self::Css,
            "bash" | "sh" | "shell" => Self::Bash,
            "text" | "plain" | "plaintext" => Self::Text,
            _ => return None,
        };
        Some(language)
    }

    /// Canonical wire tag for this language.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Sql => "sql",
            Self::Html => "html",
            Self::Css => "css",
            Self::Bash => "bash",
            Self::Text => "text",
        }
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag).unwrap_or(Self::Text)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

fn default_true() -> bool {
    true
}

fn default_practice_xp() -> u32 {
    DEFAULT_PRACTICE_XP
}

/// One block in a lesson's structured content sequence.
///
/// The variant set is closed. Wire entries with a `type` tag outside this set
/// are not representable here and surface as
/// [`UnsupportedEntry`](crate::content::UnsupportedEntry) during decoding
/// rather than being silently dropped.
///
/// Every variant carries most of its fields as defaults so that older
/// payloads missing newer fields keep loading; only `id` is required, since a
/// block without identity cannot be edited or linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Markdown prose, optionally promoted to a heading.
    #[serde(rename_all = "camelCase")]
    Text {
        id: BlockId,
        #[serde(default)]
        content: String,
        #[serde(default)]
        heading: HeadingLevel,
    },
    /// A code listing shown verbatim, never run through the markdown engine.
    #[serde(rename_all = "camelCase")]
    Code {
        id: BlockId,
        #[serde(default)]
        language: Language,
        #[serde(default)]
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default = "default_true")]
        show_line_numbers: bool,
    },
    /// Program output, optionally linked back to the code block that
    /// produced it.
    #[serde(rename_all = "camelCase")]
    Output {
        id: BlockId,
        #[serde(default)]
        output: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        linked_code_block_id: Option<BlockId>,
    },
    /// Supplementary markdown prose, rendered in a visually distinct style.
    #[serde(rename_all = "camelCase")]
    Explanation {
        id: BlockId,
        #[serde(default)]
        content: String,
    },
    /// An interactive exercise worth XP.
    #[serde(rename_all = "camelCase")]
    Practice {
        id: BlockId,
        #[serde(default)]
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_output: Option<String>,
        #[serde(default)]
        validation_rule: String,
        #[serde(default = "default_practice_xp")]
        xp_value: u32,
        #[serde(default)]
        hints: Vec<String>,
    },
}

impl Block {
    /// Stable identity of this block.
    pub fn id(&self) -> &BlockId {
        match self {
            Self::Text { id, .. }
            | Self::Code { id, .. }
            | Self::Output { id, .. }
            | Self::Explanation { id, .. }
            | Self::Practice { id, .. } => id,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text { .. } => BlockType::Text,
            Self::Code { .. } => BlockType::Code,
            Self::Output { .. } => BlockType::Output,
            Self::Explanation { .. } => BlockType::Explanation,
            Self::Practice { .. } => BlockType::Practice,
        }
    }
}

/// Discriminant-only view of [`Block`], used when choosing what to add in the
/// editor or summarising a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Text,
    Code,
    Output,
    Explanation,
    Practice,
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Output => "output",
            Self::Explanation => "explanation",
            Self::Practice => "practice",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ============ BlockId tests ============

    #[test]
    fn generated_ids_are_unique() {
        let a = BlockId::new();
        let b = BlockId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn block_id_serializes_as_bare_string() {
        let id = BlockId::from("b-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"b-1\"");
    }

    // ============ Language tests ============

    #[test]
    fn fence_tags_map_through_aliases() {
        assert_eq!(Language::from_tag("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_tag("PY"), Some(Language::Python));
        assert_eq!(Language::from_tag("c++"), Some(Language::Cpp));
        assert_eq!(Language::from_tag("ruby"), None);
    }

    #[test]
    fn unknown_wire_language_collapses_to_text() {
        let language: Language = serde_json::from_str("\"ruby\"").unwrap();
        assert_eq!(language, Language::Text);
    }

    #[test]
    fn known_wire_language_round_trips() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
        let back: Language = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Language::Cpp);
    }

    // ============ Block serde tests ============

    #[test]
    fn text_block_uses_tagged_camel_case_wire_form() {
        let block = Block::Text {
            id: BlockId::from("t-1"),
            content: "# Hello".to_string(),
            heading: HeadingLevel::Paragraph,
        };
        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(
            json,
            r##"{"type":"text","id":"t-1","content":"# Hello","heading":"paragraph"}"##
        );
    }

    #[test]
    fn code_block_skips_absent_title() {
        let block = Block::Code {
            id: BlockId::from("c-1"),
            language: Language::Python,
            code: "print(1)".to_string(),
            title: None,
            show_line_numbers: true,
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(!json.contains("title"));
        assert!(json.contains(r#""showLineNumbers":true"#));
    }

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let block: Block =
            serde_json::from_str(r#"{"type":"practice","id":"p-1","question":"Sum?"}"#).unwrap();
        assert_eq!(
            block,
            Block::Practice {
                id: BlockId::from("p-1"),
                question: "Sum?".to_string(),
                expected_output: None,
                validation_rule: String::new(),
                xp_value: DEFAULT_PRACTICE_XP,
                hints: vec![],
            }
        );
    }

    #[test]
    fn missing_heading_defaults_to_paragraph() {
        let block: Block =
            serde_json::from_str(r#"{"type":"text","id":"t-1","content":"hi"}"#).unwrap();
        let Block::Text { heading, .. } = block else {
            panic!("expected a text block");
        };
        assert_eq!(heading, HeadingLevel::Paragraph);
    }

    #[test]
    fn missing_id_is_rejected() {
        let result = serde_json::from_str::<Block>(r#"{"type":"text","content":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let result = serde_json::from_str::<Block>(r#"{"type":"video","id":"v-1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn block_type_reports_variant() {
        let block = Block::Explanation {
            id: BlockId::new(),
            content: String::new(),
        };
        assert_eq!(block.block_type(), BlockType::Explanation);
        assert_eq!(block.block_type().to_string(), "explanation");
    }
}
