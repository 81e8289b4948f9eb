//! Fallback parser for lesson content that predates the block model: a flat
//! markdown document with embedded code fences and `**Output:**` sections.
//!
//! Parsing runs in two passes over the same text. Pass one claims every
//! `**Output:**` marker followed (across whitespace only) by a bare fence;
//! pass two scans the unclaimed spans for generic fences. A span consumed by
//! pass one is never reconsidered, which is what gives output sections
//! precedence over plain code blocks.

const OUTPUT_MARKER: &str = "**Output:**";

/// One span of a legacy document after fence extraction, in document order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LegacySegment {
    /// Prose for the inline markdown engine, trimmed.
    Markdown(String),
    /// A fenced code block with its raw language tag, if any.
    Code {
        language: Option<String>,
        code: String,
    },
    /// The contents of an output fence, trimmed of blank lines.
    Output(String),
}

/// Split a legacy document into segments.
pub(crate) fn parse_legacy(text: &str) -> Vec<LegacySegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for claim in find_output_claims(text) {
        push_gap_segments(&text[cursor..claim.start], &mut segments);
        segments.push(LegacySegment::Output(claim.output));
        cursor = claim.end;
    }
    push_gap_segments(&text[cursor..], &mut segments);
    segments
}

/// A resolved `**Output:**` section: the byte span it consumes (marker
/// through closing fence) and the trimmed fence contents.
struct OutputClaim {
    start: usize,
    end: usize,
    output: String,
}

fn find_output_claims(text: &str) -> Vec<OutputClaim> {
    let mut claims = Vec::new();
    let mut from = 0;
    while let Some(found) = text[from..].find(OUTPUT_MARKER) {
        let start = from + found;
        let after_marker = start + OUTPUT_MARKER.len();
        match output_fence_after(text, after_marker) {
            Some((output, end)) => {
                claims.push(OutputClaim { start, end, output });
                from = end;
            }
            // Marker without a conforming fence: leave it for the markdown
            // engine, which renders it as bold text.
            None => from = after_marker,
        }
    }
    claims
}

/// Check for a bare fence directly after an output marker. Only whitespace
/// may separate the two, the fence must open at a line start without a
/// language tag, and it must close. Returns the trimmed contents and the
/// position one past the closing fence line.
fn output_fence_after(text: &str, after_marker: usize) -> Option<(String, usize)> {
    let rest = &text[after_marker..];
    let gap_len = rest.len() - rest.trim_start().len();
    let fence_start = after_marker + gap_len;
    if fence_start == 0 || text.as_bytes().get(fence_start - 1) != Some(&b'\n') {
        return None;
    }
    if !text[fence_start..].starts_with("```") {
        return None;
    }
    let open_line_end = text[fence_start..].find('\n').map(|i| fence_start + i)?;
    if !text[fence_start + 3..open_line_end].trim().is_empty() {
        return None;
    }
    let (interior, end) = closed_fence_interior(text, open_line_end + 1)?;
    Some((trim_blank_lines(interior), end))
}

/// A generic fence found by the pass-two scan.
struct Fence {
    open_start: usize,
    language: Option<String>,
    code: String,
    end: usize,
}

/// Convert one unclaimed span into markdown and code segments.
fn push_gap_segments(gap: &str, segments: &mut Vec<LegacySegment>) {
    let mut pos = 0;
    while pos < gap.len() {
        match next_fence(gap, pos) {
            Some(fence) => {
                push_markdown(&gap[pos..fence.open_start], segments);
                segments.push(LegacySegment::Code {
                    language: fence.language,
                    code: fence.code,
                });
                pos = fence.end;
            }
            None => {
                // No further closed fence: the rest, dangling openers
                // included, is plain text.
                push_markdown(&gap[pos..], segments);
                break;
            }
        }
    }
}

fn push_markdown(text: &str, segments: &mut Vec<LegacySegment>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        segments.push(LegacySegment::Markdown(trimmed.to_string()));
    }
}

/// Find the next closed fence opening at a line start at or after `from`.
/// `from` is always a line boundary: gaps start at one, and the scan resumes
/// just past a closing fence line.
fn next_fence(gap: &str, from: usize) -> Option<Fence> {
    let mut line_start = from;
    loop {
        if gap[line_start..].starts_with("```") {
            let open_line_end = gap[line_start..].find('\n').map(|i| line_start + i)?;
            let tag = gap[line_start + 3..open_line_end].trim();
            let (code, end) = closed_fence_interior(gap, open_line_end + 1)?;
            return Some(Fence {
                open_start: line_start,
                language: tag.split_whitespace().next().map(str::to_string),
                code: code.strip_suffix('\n').unwrap_or(code).to_string(),
                end,
            });
        }
        match gap[line_start..].find('\n') {
            Some(offset) => line_start += offset + 1,
            None => return None,
        }
    }
}

/// Walk lines from `interior_start` looking for the bare closing fence.
/// Returns the interior slice and the position one past the closing line
/// (trailing newline included when present), or `None` for an unterminated
/// fence.
fn closed_fence_interior(text: &str, interior_start: usize) -> Option<(&str, usize)> {
    let mut pos = interior_start;
    loop {
        let line_end = text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(text.len());
        if text[pos..line_end].trim() == "```" {
            let end = if line_end < text.len() {
                line_end + 1
            } else {
                line_end
            };
            return Some((&text[interior_start..pos], end));
        }
        if line_end >= text.len() {
            return None;
        }
        pos = line_end + 1;
    }
}

/// Drop leading and trailing blank lines, keeping interior ones and all
/// indentation.
fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let Some(start) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return String::new();
    };
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(start);
    lines[start..=end].join("\n")
}
