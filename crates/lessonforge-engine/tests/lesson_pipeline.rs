//! End-to-end checks over the content pipeline: serialize, decode, render.

use lessonforge_engine::content::{self, ContentEntry, DecodedContent};
use lessonforge_engine::models::{Block, BlockId, HeadingLevel, Language};
use lessonforge_engine::render::{RenderInstruction, Renderer};
use lessonforge_engine::xp;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn sample_lesson() -> Vec<Block> {
    vec![
        Block::Text {
            id: BlockId::from("t-1"),
            content: "Printing".to_string(),
            heading: HeadingLevel::H1,
        },
        Block::Code {
            id: BlockId::from("c-1"),
            language: Language::Python,
            code: "print(40 + 2)".to_string(),
            title: Some("answer.py".to_string()),
            show_line_numbers: true,
        },
        Block::Output {
            id: BlockId::from("o-1"),
            output: "42".to_string(),
            linked_code_block_id: Some(BlockId::from("c-1")),
        },
        Block::Explanation {
            id: BlockId::from("e-1"),
            content: "Python evaluates the *expression* first.".to_string(),
        },
        Block::Practice {
            id: BlockId::from("p-1"),
            question: "Print `43`".to_string(),
            expected_output: Some("43".to_string()),
            validation_rule: "output-match".to_string(),
            xp_value: 10,
            hints: vec!["same shape as above".to_string()],
        },
    ]
}

fn render(content: &str) -> Vec<RenderInstruction> {
    let renderer = Renderer::default();
    let completed = HashSet::new();
    renderer.render(content, &completed).collect()
}

#[test]
fn sequence_survives_a_full_round_trip() {
    let blocks = sample_lesson();
    let encoded = content::serialize(&blocks).unwrap();

    let DecodedContent::Structured(entries) = content::deserialize(&encoded) else {
        panic!("expected structured content");
    };
    let decoded: Vec<Block> = entries
        .into_iter()
        .map(|entry| match entry {
            ContentEntry::Block(block) => block,
            ContentEntry::Unsupported(entry) => panic!("lost entry: {entry:?}"),
        })
        .collect();

    assert_eq!(decoded, blocks);
    // Same sequence, same bytes.
    assert_eq!(content::serialize(&decoded).unwrap(), encoded);
}

#[test]
fn decoding_preserves_document_order() {
    let encoded = content::serialize(&sample_lesson()).unwrap();
    let DecodedContent::Structured(entries) = content::deserialize(&encoded) else {
        panic!("expected structured content");
    };
    let ids: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.as_block().map(|block| block.id().to_string()))
        .collect();
    assert_eq!(ids, vec!["t-1", "c-1", "o-1", "e-1", "p-1"]);
}

#[test]
fn lesson_xp_is_base_plus_practice_values() {
    let blocks = sample_lesson();
    assert_eq!(xp::lesson_xp(&blocks), xp::LESSON_BASE_XP + 10);

    // Only practice blocks move the number.
    let without_practice: Vec<Block> = blocks
        .iter()
        .filter(|block| !matches!(block, Block::Practice { .. }))
        .cloned()
        .collect();
    assert_eq!(xp::lesson_xp(&without_practice), xp::LESSON_BASE_XP);
}

#[test]
fn structured_lesson_renders_in_order_with_resolved_link() {
    let encoded = content::serialize(&sample_lesson()).unwrap();
    let instructions = render(&encoded);

    assert_eq!(instructions.len(), 5);
    assert!(matches!(
        &instructions[0],
        RenderInstruction::StyledText { html } if html == "<h1>Printing</h1>"
    ));
    assert!(matches!(
        &instructions[1],
        RenderInstruction::CodeBlockView { label, .. } if label == "Python"
    ));
    assert!(matches!(
        &instructions[2],
        RenderInstruction::OutputView { linked_code_block_id: Some(id), .. }
            if id == &BlockId::from("c-1")
    ));
    assert!(matches!(
        &instructions[3],
        RenderInstruction::ExplanationView { html }
            if html == "<p>Python evaluates the <em>expression</em> first.</p>"
    ));
    assert!(matches!(
        &instructions[4],
        RenderInstruction::PracticeView { completed: false, .. }
    ));
}

#[test]
fn markdown_payload_falls_back_to_the_legacy_parser() {
    let payload = "# Variables and Types\nVariables are...";
    assert!(content::deserialize(payload).is_legacy());

    let instructions = render(payload);
    assert_eq!(
        instructions,
        vec![RenderInstruction::StyledText {
            html: "<h1>Variables and Types</h1>\n<p>Variables are...</p>".to_string()
        }]
    );
}

#[test]
fn legacy_output_sections_beat_the_generic_fence_scan() {
    let payload = "```js\nconsole.log(42)\n```\n**Output:**\n```\n42\n```";
    let instructions = render(payload);

    assert_eq!(instructions.len(), 2);
    assert!(matches!(
        &instructions[0],
        RenderInstruction::CodeBlockView { language: Language::JavaScript, code, .. }
            if code == "console.log(42)"
    ));
    assert!(matches!(
        &instructions[1],
        RenderInstruction::OutputView { output, linked_code_block_id: None }
            if output == "42"
    ));
}

#[test]
fn dangling_output_link_renders_unlinked_without_error() {
    // The code block was deleted after the output was linked to it.
    let payload = r#"[{"type":"output","id":"o-1","output":"42","linkedCodeBlockId":"c-9"}]"#;
    assert_eq!(
        render(payload),
        vec![RenderInstruction::OutputView {
            output: "42".to_string(),
            linked_code_block_id: None,
        }]
    );
}

#[test]
fn unknown_entry_renders_a_placeholder_without_touching_neighbours() {
    let payload = r#"[{"type":"text","id":"t-1","content":"before"},{"type":"quiz","id":"q-1","questions":[]},{"type":"text","id":"t-2","content":"after"}]"#;
    let instructions = render(payload);

    assert_eq!(instructions.len(), 3);
    assert!(matches!(
        &instructions[0],
        RenderInstruction::StyledText { html } if html == "<p>before</p>"
    ));
    assert_eq!(
        instructions[1],
        RenderInstruction::UnsupportedContent {
            type_tag: "quiz".to_string()
        }
    );
    assert!(matches!(
        &instructions[2],
        RenderInstruction::StyledText { html } if html == "<p>after</p>"
    ));
}

#[test]
fn empty_and_blank_payloads_render_nothing() {
    assert!(render("").is_empty());
    assert!(render("[]").is_empty());
    assert!(render("   \n  ").is_empty());
}

#[test]
fn rendering_is_lazy_until_pulled() {
    let encoded = content::serialize(&sample_lesson()).unwrap();
    let renderer = Renderer::default();
    let completed = HashSet::new();

    let mut stream = renderer.render(&encoded, &completed);
    assert_eq!(stream.size_hint().0, 5);
    // Taking only the first instruction must not require the rest.
    assert!(stream.next().is_some());
    drop(stream);
}
