use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lessonforge_engine::content::{self, ContentEntry, DecodedContent};
use lessonforge_engine::models::{Block, BlockId, CourseId, Lesson, LessonId};
use lessonforge_engine::render::{RenderInstruction, Renderer};
use lessonforge_engine::xp;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "lessonforge", version, about = "Inspect lessonforge lesson content payloads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a lesson payload as its display instructions
    Render(RenderArgs),

    /// List the blocks in a lesson payload
    Blocks(BlocksArgs),

    /// Compute lesson XP rewards and the course totals
    Xp(XpArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Lesson content file (JSON block array or legacy markdown)
    file: PathBuf,

    /// Practice block id to treat as completed. Repeatable.
    #[arg(long = "completed", value_name = "BLOCK_ID")]
    completed: Vec<String>,
}

#[derive(clap::Args)]
struct BlocksArgs {
    /// Lesson content file
    file: PathBuf,
}

#[derive(clap::Args)]
struct XpArgs {
    /// Lesson content files, one per lesson in the course
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lessonforge_engine=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    print!("{}", run(cli.command)?);
    Ok(())
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::Render(args) => {
            let payload = read_payload(&args.file)?;
            let completed = args.completed.into_iter().map(BlockId::from).collect();
            Ok(render_report(&payload, &completed))
        }
        Command::Blocks(args) => {
            let payload = read_payload(&args.file)?;
            Ok(blocks_report(&payload))
        }
        Command::Xp(args) => xp_report(&args.files),
    }
}

fn read_payload(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Flatten the instruction stream into terminal text.
fn render_report(payload: &str, completed: &HashSet<BlockId>) -> String {
    let renderer = Renderer::default();
    let mut out = String::new();
    for instruction in renderer.render(payload, completed) {
        match instruction {
            RenderInstruction::StyledText { html } => {
                out.push_str(&html);
                out.push('\n');
            }
            RenderInstruction::CodeBlockView {
                label,
                code,
                title,
                show_line_numbers,
                ..
            } => {
                match title {
                    Some(title) => out.push_str(&format!("--- code: {label} ({title}) ---\n")),
                    None => out.push_str(&format!("--- code: {label} ---\n")),
                }
                for (number, line) in code.lines().enumerate() {
                    if show_line_numbers {
                        out.push_str(&format!("{:>4} | {line}\n", number + 1));
                    } else {
                        out.push_str(&format!("{line}\n"));
                    }
                }
            }
            RenderInstruction::OutputView {
                output,
                linked_code_block_id,
            } => {
                match linked_code_block_id {
                    Some(id) => out.push_str(&format!("--- output (from code {id}) ---\n")),
                    None => out.push_str("--- output ---\n"),
                }
                out.push_str(&output);
                out.push('\n');
            }
            RenderInstruction::ExplanationView { html } => {
                out.push_str("--- explanation ---\n");
                out.push_str(&html);
                out.push('\n');
            }
            RenderInstruction::PracticeView {
                question_html,
                expected_output,
                xp_value,
                hints,
                completed,
                ..
            } => {
                let state = if completed { ", completed" } else { "" };
                out.push_str(&format!("--- practice ({xp_value} XP{state}) ---\n"));
                out.push_str(&question_html);
                out.push('\n');
                if let Some(expected) = expected_output {
                    out.push_str(&format!("expected output: {expected}\n"));
                }
                for hint in hints {
                    out.push_str(&format!("hint: {hint}\n"));
                }
            }
            RenderInstruction::UnsupportedContent { type_tag } => {
                out.push_str(&format!("[unsupported content: {type_tag}]\n"));
            }
        }
    }
    out
}

/// One line per entry, in document order.
fn blocks_report(payload: &str) -> String {
    match content::deserialize(payload) {
        DecodedContent::Legacy(_) => {
            let renderer = Renderer::default();
            let segments = renderer.render(payload, &HashSet::new()).count();
            format!("legacy markdown document ({segments} rendered segments)\n")
        }
        DecodedContent::Structured(entries) => {
            let mut out = String::new();
            for (index, entry) in entries.iter().enumerate() {
                let line = match entry {
                    ContentEntry::Block(block) => describe_block(block),
                    ContentEntry::Unsupported(entry) => {
                        format!("unsupported entry (type {:?})", entry.type_tag)
                    }
                };
                out.push_str(&format!("{:>3}. {line}\n", index + 1));
            }
            out
        }
    }
}

fn describe_block(block: &Block) -> String {
    match block {
        Block::Text {
            id,
            content,
            heading,
        } => format!("text [{id}] {heading:?} {}", preview(content)),
        Block::Code {
            id,
            language,
            code,
            title,
            ..
        } => {
            let title = title.as_deref().unwrap_or("untitled");
            format!(
                "code [{id}] {language} ({title}, {} lines)",
                code.lines().count()
            )
        }
        Block::Output {
            id,
            linked_code_block_id,
            ..
        } => match linked_code_block_id {
            Some(target) => format!("output [{id}] linked to {target}"),
            None => format!("output [{id}] unlinked"),
        },
        Block::Explanation { id, content } => {
            format!("explanation [{id}] {}", preview(content))
        }
        Block::Practice {
            id,
            xp_value,
            hints,
            ..
        } => format!("practice [{id}] {xp_value} XP, {} hints", hints.len()),
    }
}

fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(40).collect();
    if preview.len() < first_line.len() {
        preview.push_str("...");
    }
    format!("{preview:?}")
}

/// Treat each file as one lesson of a course and total them up.
fn xp_report(files: &[PathBuf]) -> Result<String> {
    let course_id = CourseId::from("cli");
    let mut out = String::new();
    let mut lessons = Vec::with_capacity(files.len());
    for path in files {
        let payload = read_payload(path)?;
        let blocks = decoded_blocks(&payload);
        let xp_reward = xp::lesson_xp(&blocks);
        out.push_str(&format!("{}: {xp_reward} XP\n", path.display()));
        lessons.push(Lesson {
            id: LessonId::from(path.display().to_string().as_str()),
            course_id: course_id.clone(),
            title: path.display().to_string(),
            content: payload,
            xp_reward,
        });
    }
    let aggregates = xp::course_aggregates(&lessons);
    out.push_str(&format!(
        "course total: {} lessons, {} XP\n",
        aggregates.total_lessons, aggregates.xp_reward
    ));
    Ok(out)
}

/// The block sequence behind a payload; legacy documents have none, so they
/// contribute only the base lesson reward.
fn decoded_blocks(payload: &str) -> Vec<Block> {
    match content::deserialize(payload) {
        DecodedContent::Structured(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                ContentEntry::Block(block) => Some(block),
                ContentEntry::Unsupported(_) => None,
            })
            .collect(),
        DecodedContent::Legacy(_) => Vec::new(),
    }
}
