pub mod languages;
mod legacy;

use crate::content::{self, ContentEntry, DecodedContent};
use crate::markdown;
use crate::models::{Block, BlockId, HeadingLevel, Language};
use languages::LanguageRegistry;
use legacy::LegacySegment;
use std::collections::HashSet;

/// One display-ready unit of a rendered lesson, in document order.
///
/// Instructions are effect-free descriptions; turning them into widgets or
/// HTML elements is the embedding UI's job.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderInstruction {
    /// Sanitized HTML from the inline markdown engine.
    StyledText { html: String },
    /// A code listing with presentation metadata resolved through the
    /// language registry. `code` is verbatim, never markdown-processed.
    CodeBlockView {
        language: Language,
        label: String,
        grammar: Option<String>,
        code: String,
        title: Option<String>,
        show_line_numbers: bool,
    },
    /// Program output. `linked_code_block_id` survives only when the target
    /// code block exists in the same lesson.
    OutputView {
        output: String,
        linked_code_block_id: Option<BlockId>,
    },
    /// Supplementary prose, displayed visually distinct from regular text.
    ExplanationView { html: String },
    /// An exercise, with this learner's completion state already resolved.
    PracticeView {
        id: BlockId,
        question_html: String,
        expected_output: Option<String>,
        xp_value: u32,
        hints: Vec<String>,
        completed: bool,
    },
    /// Placeholder for a structured entry outside the known block set.
    UnsupportedContent { type_tag: String },
}

/// Turns persisted lesson content into [`RenderInstruction`]s.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    languages: LanguageRegistry,
}

impl Renderer {
    pub fn new(languages: LanguageRegistry) -> Self {
        Self { languages }
    }

    /// Decode `content` and return the instruction sequence for it.
    ///
    /// The returned stream is lazy: blocks are converted one at a time as the
    /// consumer advances, so rendering stops costing anything once a UI stops
    /// pulling. `completed` holds the practice block ids this learner has
    /// already solved.
    pub fn render<'a>(
        &'a self,
        content: &str,
        completed: &'a HashSet<BlockId>,
    ) -> RenderStream<'a> {
        let (code_ids, inner) = match content::deserialize(content) {
            DecodedContent::Structured(entries) => {
                let code_ids = entries
                    .iter()
                    .filter_map(|entry| match entry.as_block() {
                        Some(Block::Code { id, .. }) => Some(id.clone()),
                        _ => None,
                    })
                    .collect();
                (code_ids, Inner::Structured(entries.into_iter()))
            }
            DecodedContent::Legacy(text) => (
                HashSet::new(),
                Inner::Legacy(legacy::parse_legacy(&text).into_iter()),
            ),
        };
        RenderStream {
            languages: &self.languages,
            completed,
            code_ids,
            inner,
        }
    }
}

/// Lazy iterator over a lesson's render instructions.
pub struct RenderStream<'a> {
    languages: &'a LanguageRegistry,
    completed: &'a HashSet<BlockId>,
    /// Ids of every code block in the lesson, for link validation.
    code_ids: HashSet<BlockId>,
    inner: Inner,
}

enum Inner {
    Structured(std::vec::IntoIter<ContentEntry>),
    Legacy(std::vec::IntoIter<LegacySegment>),
}

impl Iterator for RenderStream<'_> {
    type Item = RenderInstruction;

    fn next(&mut self) -> Option<Self::Item> {
        enum Step {
            Entry(ContentEntry),
            Segment(LegacySegment),
        }
        let step = match &mut self.inner {
            Inner::Structured(entries) => entries.next().map(Step::Entry),
            Inner::Legacy(segments) => segments.next().map(Step::Segment),
        }?;
        Some(match step {
            Step::Entry(entry) => self.entry_instruction(entry),
            Step::Segment(segment) => self.segment_instruction(segment),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Structured(entries) => entries.size_hint(),
            Inner::Legacy(segments) => segments.size_hint(),
        }
    }
}

impl RenderStream<'_> {
    fn entry_instruction(&self, entry: ContentEntry) -> RenderInstruction {
        match entry {
            ContentEntry::Block(block) => self.block_instruction(block),
            ContentEntry::Unsupported(entry) => {
                tracing::warn!(type_tag = %entry.type_tag, "rendering placeholder for unsupported entry");
                RenderInstruction::UnsupportedContent {
                    type_tag: entry.type_tag,
                }
            }
        }
    }

    fn block_instruction(&self, block: Block) -> RenderInstruction {
        match block {
            Block::Text {
                content, heading, ..
            } => RenderInstruction::StyledText {
                html: markdown::to_safe_html(&heading_source(heading, &content)),
            },
            Block::Code {
                language,
                code,
                title,
                show_line_numbers,
                ..
            } => self.code_view(language, code, title, show_line_numbers),
            Block::Output {
                output,
                linked_code_block_id,
                ..
            } => {
                let link = linked_code_block_id.filter(|id| {
                    let exists = self.code_ids.contains(id);
                    if !exists {
                        tracing::debug!(target_id = %id, "dropping dangling code block link");
                    }
                    exists
                });
                RenderInstruction::OutputView {
                    output,
                    linked_code_block_id: link,
                }
            }
            Block::Explanation { content, .. } => RenderInstruction::ExplanationView {
                html: markdown::to_safe_html(&content),
            },
            Block::Practice {
                id,
                question,
                expected_output,
                validation_rule: _,
                xp_value,
                hints,
            } => RenderInstruction::PracticeView {
                completed: self.completed.contains(&id),
                question_html: markdown::to_safe_html(&question),
                id,
                expected_output,
                xp_value,
                hints,
            },
        }
    }

    fn segment_instruction(&self, segment: LegacySegment) -> RenderInstruction {
        match segment {
            LegacySegment::Markdown(text) => RenderInstruction::StyledText {
                html: markdown::to_safe_html(&text),
            },
            LegacySegment::Code { language, code } => {
                let language = language
                    .as_deref()
                    .and_then(Language::from_tag)
                    .unwrap_or(Language::Text);
                self.code_view(language, code, None, true)
            }
            LegacySegment::Output(output) => RenderInstruction::OutputView {
                output,
                linked_code_block_id: None,
            },
        }
    }

    fn code_view(
        &self,
        language: Language,
        code: String,
        title: Option<String>,
        show_line_numbers: bool,
    ) -> RenderInstruction {
        let info = self.languages.info(language);
        RenderInstruction::CodeBlockView {
            language,
            label: info.label,
            grammar: info.grammar,
            code,
            title,
            show_line_numbers,
        }
    }
}

/// Reconstruct the markdown source for a text block so the heading level
/// chosen in the editor drives the rendered tag.
fn heading_source(heading: HeadingLevel, content: &str) -> String {
    let marks = match heading {
        HeadingLevel::H1 => "#",
        HeadingLevel::H2 => "##",
        HeadingLevel::H3 => "###",
        HeadingLevel::Paragraph => return content.to_string(),
    };
    format!("{marks} {content}")
}
