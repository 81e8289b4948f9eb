use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Private-use delimiters around a shielded inline code span.
pub(super) const SHIELD_OPEN: char = '\u{E000}';
pub(super) const SHIELD_CLOSE: char = '\u{E001}';

/// ATX headings `#`, `##`, `###` at line start. Deeper headings are not part
/// of the dialect and fall through to the paragraph rule.
pub(super) fn headings(text: &str) -> String {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    let heading = HEADING
        .get_or_init(|| Regex::new(r"(?m)^(#{1,3}) (.+)$").expect("Invalid heading regex"));
    heading
        .replace_all(text, |caps: &Captures| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>", &caps[2])
        })
        .into_owned()
}

/// Emphasis, widest marker first so `***x***` is not eaten as `**` + `*`.
/// Underscore markers behave exactly like their star equivalents.
///
/// Runs line by line. A leading `* ` is an unordered list marker for the
/// later list rule, not an emphasis delimiter, so it is held out of pairing;
/// without that a star elsewhere on the line would pair with the marker and
/// eat it. Within a line, pairing only runs on text between markup tokens.
/// Tags reaching this rule (from the heading rule, the sanitizer's
/// allow-list, or a previous run over already-rendered text) carry
/// underscores in their attribute values, and pairing those up would corrupt
/// the tag.
pub(super) fn emphasis(text: &str) -> String {
    text.split('\n')
        .map(emphasis_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn emphasis_line(line: &str) -> String {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    let rules = RULES.get_or_init(|| {
        [
            (r"\*\*\*([^*\n]+)\*\*\*", "<strong><em>$1</em></strong>"),
            (r"___([^_\n]+)___", "<strong><em>$1</em></strong>"),
            (r"\*\*([^*\n]+)\*\*", "<strong>$1</strong>"),
            (r"__([^_\n]+)__", "<strong>$1</strong>"),
            (r"\*([^*\n]+)\*", "<em>$1</em>"),
            (r"_([^_\n]+)_", "<em>$1</em>"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("Invalid emphasis regex"),
                replacement,
            )
        })
        .collect()
    });
    let tag =
        TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("Invalid markup token regex"));

    let (marker, body) = match line.strip_prefix("* ") {
        Some(body) => ("* ", body),
        None => ("", line),
    };

    let apply = |segment: &str| {
        let mut result = segment.to_string();
        for (pattern, replacement) in rules {
            result = pattern.replace_all(&result, *replacement).into_owned();
        }
        result
    };

    let mut out = String::with_capacity(line.len());
    out.push_str(marker);
    let mut cursor = 0;
    for token in tag.find_iter(body) {
        out.push_str(&apply(&body[cursor..token.start()]));
        out.push_str(token.as_str());
        cursor = token.end();
    }
    out.push_str(&apply(&body[cursor..]));
    out
}

/// Inline code spans. The rendered `<code>` element is swapped for a shield
/// placeholder so later rules cannot rewrite the span's interior; the
/// paragraph pass still sees the placeholder as inline text. Spans already in
/// rendered form are shielded the same way, which keeps link syntax inside
/// them literal when the engine runs over its own output.
pub(super) fn inline_code(text: &str) -> (String, Vec<String>) {
    static CODE: OnceLock<Regex> = OnceLock::new();
    static RENDERED: OnceLock<Regex> = OnceLock::new();
    let code =
        CODE.get_or_init(|| Regex::new(r"`([^`\n]+)`").expect("Invalid inline code regex"));
    let rendered = RENDERED
        .get_or_init(|| Regex::new(r"<code>(.*?)</code>").expect("Invalid rendered span regex"));
    let mut spans = Vec::new();
    let shielded = code
        .replace_all(text, |caps: &Captures| {
            let index = spans.len();
            spans.push(format!("<code>{}</code>", &caps[1]));
            format!("{SHIELD_OPEN}{index}{SHIELD_CLOSE}")
        })
        .into_owned();
    let shielded = rendered
        .replace_all(&shielded, |caps: &Captures| {
            let index = spans.len();
            spans.push(caps[0].to_string());
            format!("{SHIELD_OPEN}{index}{SHIELD_CLOSE}")
        })
        .into_owned();
    (shielded, spans)
}

/// Put shielded code spans back once every other rule has run.
pub(super) fn restore_code_spans(text: &str, spans: &[String]) -> String {
    static SHIELDED: OnceLock<Regex> = OnceLock::new();
    let shielded = SHIELDED.get_or_init(|| {
        Regex::new(r"\x{E000}([0-9]+)\x{E001}").expect("Invalid shield placeholder regex")
    });
    shielded
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| spans.get(index))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// `[label](url)` links. The href scheme allow-list matches the sanitizer's,
/// so every anchor written here survives the final pass; unsafe schemes leave
/// the markdown as visible text instead.
pub(super) fn links(text: &str) -> String {
    static LINK: OnceLock<Regex> = OnceLock::new();
    let link = LINK
        .get_or_init(|| Regex::new(r#"\[([^\]\n]+)\]\(([^()\s"]+)\)"#).expect("Invalid link regex"));
    link.replace_all(text, |caps: &Captures| {
        let label = &caps[1];
        let url = &caps[2];
        if is_safe_href(url) {
            format!(r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{label}</a>"#)
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

fn is_safe_href(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || url.starts_with('/')
        || url.starts_with('#')
}

/// A line holding exactly `---`, `***`, or `___` becomes a horizontal rule.
/// Runs after emphasis, whose patterns require non-marker interior text and
/// so never touch these lines.
pub(super) fn horizontal_rules(text: &str) -> String {
    static RULE: OnceLock<Regex> = OnceLock::new();
    let rule = RULE.get_or_init(|| {
        Regex::new(r"(?m)^(?:---|\*\*\*|___)$").expect("Invalid horizontal rule regex")
    });
    rule.replace_all(text, "<hr />").into_owned()
}

#[derive(PartialEq, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered,
}

/// `- `/`* ` and `N. ` list items, with consecutive items of the same kind
/// merged into a single `<ul>`/`<ol>` container. A blank line or any other
/// line ends the run; the two unordered markers share one run.
pub(super) fn lists(text: &str) -> String {
    static UL_ITEM: OnceLock<Regex> = OnceLock::new();
    static OL_ITEM: OnceLock<Regex> = OnceLock::new();
    let ul_item =
        UL_ITEM.get_or_init(|| Regex::new(r"^[-*] (.+)$").expect("Invalid unordered item regex"));
    let ol_item = OL_ITEM
        .get_or_init(|| Regex::new(r"^[0-9]+\. (.+)$").expect("Invalid ordered item regex"));

    fn flush(out: &mut Vec<String>, items: &mut Vec<String>, kind: &mut Option<ListKind>) {
        if let Some(list_kind) = kind.take() {
            let tag = match list_kind {
                ListKind::Unordered => "ul",
                ListKind::Ordered => "ol",
            };
            let body: String = items
                .drain(..)
                .map(|item| format!("<li>{item}</li>"))
                .collect();
            out.push(format!("<{tag}>{body}</{tag}>"));
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut items: Vec<String> = Vec::new();
    let mut kind: Option<ListKind> = None;

    for line in text.lines() {
        let classified = if let Some(caps) = ul_item.captures(line) {
            Some((ListKind::Unordered, caps[1].to_string()))
        } else {
            ol_item
                .captures(line)
                .map(|caps| (ListKind::Ordered, caps[1].to_string()))
        };
        match classified {
            Some((line_kind, item)) => {
                if kind != Some(line_kind) {
                    flush(&mut out, &mut items, &mut kind);
                    kind = Some(line_kind);
                }
                items.push(item);
            }
            None => {
                flush(&mut out, &mut items, &mut kind);
                out.push(line.to_string());
            }
        }
    }
    flush(&mut out, &mut items, &mut kind);
    out.join("\n")
}

/// Wrap what's left in paragraphs: blank lines are dropped as spent
/// separators, lines already holding a block element pass through.
pub(super) fn paragraphs(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if is_block_level(line) {
            out.push(line.to_string());
        } else {
            out.push(format!("<p>{line}</p>"));
        }
    }
    out.join("\n")
}

fn is_block_level(line: &str) -> bool {
    ["<h1", "<h2", "<h3", "<ul", "<ol", "<li", "<hr", "<p"]
        .iter()
        .any(|tag| line.starts_with(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ============ Heading rule tests ============

    #[test]
    fn heading_levels_map_to_tags() {
        assert_eq!(headings("# One"), "<h1>One</h1>");
        assert_eq!(headings("## Two"), "<h2>Two</h2>");
        assert_eq!(headings("### Three"), "<h3>Three</h3>");
    }

    #[test]
    fn four_hashes_are_not_a_heading() {
        assert_eq!(headings("#### Four"), "#### Four");
    }

    #[test]
    fn heading_requires_line_start() {
        assert_eq!(headings("say # this"), "say # this");
    }

    // ============ Emphasis rule tests ============

    #[test]
    fn triple_marker_nests_strong_and_em() {
        assert_eq!(emphasis("***x***"), "<strong><em>x</em></strong>");
        assert_eq!(emphasis("___x___"), "<strong><em>x</em></strong>");
    }

    #[test]
    fn double_and_single_markers() {
        assert_eq!(emphasis("**b** and *i*"), "<strong>b</strong> and <em>i</em>");
        assert_eq!(emphasis("__b__ and _i_"), "<strong>b</strong> and <em>i</em>");
    }

    #[test]
    fn underscores_inside_words_still_emphasise() {
        // Same behaviour as stars; the dialect makes no intra-word exception.
        assert_eq!(emphasis("a_b_c"), "a<em>b</em>c");
    }

    #[test]
    fn bare_marker_lines_are_untouched() {
        assert_eq!(emphasis("***"), "***");
        assert_eq!(emphasis("___"), "___");
    }

    #[test]
    fn attribute_text_inside_markup_is_not_emphasised() {
        let rendered = r#"<a href="https://x.com/a_b" target="_blank" rel="noopener noreferrer">x</a> plus <a href="https://y.com/c_d" target="_blank" rel="noopener noreferrer">y</a>"#;
        assert_eq!(emphasis(rendered), rendered);
    }

    #[test]
    fn emphasis_never_spans_markup() {
        assert_eq!(emphasis("*a <em>b</em> c*"), "*a <em>b</em> c*");
    }

    #[test]
    fn leading_list_marker_is_not_an_emphasis_delimiter() {
        assert_eq!(emphasis("* item *x*"), "* item <em>x</em>");
        assert_eq!(emphasis("* first\n* second"), "* first\n* second");
    }

    // ============ Inline code tests ============

    #[test]
    fn code_spans_are_shielded_and_restored() {
        let (shielded, spans) = inline_code("use `let x` here");
        assert!(!shielded.contains("<code>"));
        assert_eq!(spans, vec!["<code>let x</code>".to_string()]);
        assert_eq!(
            restore_code_spans(&shielded, &spans),
            "use <code>let x</code> here"
        );
    }

    #[test]
    fn code_spans_do_not_cross_lines() {
        let (shielded, spans) = inline_code("a `b\nc` d");
        assert_eq!(shielded, "a `b\nc` d");
        assert!(spans.is_empty());
    }

    #[test]
    fn rendered_spans_are_shielded_like_source_spans() {
        let (shielded, spans) = inline_code("keep <code>[x](https://y.com)</code> literal");
        assert!(!shielded.contains("<code>"));
        assert_eq!(spans, vec!["<code>[x](https://y.com)</code>".to_string()]);
        assert_eq!(
            restore_code_spans(&shielded, &spans),
            "keep <code>[x](https://y.com)</code> literal"
        );
    }

    // ============ Link rule tests ============

    #[test]
    fn links_get_hardened_attributes() {
        assert_eq!(
            links("[docs](https://example.com/docs)"),
            r#"<a href="https://example.com/docs" target="_blank" rel="noopener noreferrer">docs</a>"#
        );
    }

    #[test]
    fn relative_and_fragment_hrefs_are_allowed() {
        assert!(links("[a](/lessons/1)").contains("<a href=\"/lessons/1\""));
        assert!(links("[a](#setup)").contains("<a href=\"#setup\""));
    }

    #[test]
    fn javascript_scheme_is_left_as_text() {
        let input = "[x](javascript:alert(1))";
        assert_eq!(links(input), input);
    }

    // ============ Horizontal rule tests ============

    #[test]
    fn marker_lines_become_rules() {
        assert_eq!(horizontal_rules("a\n---\nb"), "a\n<hr />\nb");
        assert_eq!(horizontal_rules("***"), "<hr />");
        assert_eq!(horizontal_rules("___"), "<hr />");
    }

    #[test]
    fn longer_dash_runs_are_not_rules() {
        assert_eq!(horizontal_rules("----"), "----");
    }

    // ============ List rule tests ============

    #[test]
    fn consecutive_dashes_merge_into_one_list() {
        assert_eq!(
            lists("- a\n- b\n- c"),
            "<ul><li>a</li><li>b</li><li>c</li></ul>"
        );
    }

    #[test]
    fn star_items_merge_like_dashes() {
        assert_eq!(
            lists("* first\n* second"),
            "<ul><li>first</li><li>second</li></ul>"
        );
    }

    #[test]
    fn dash_and_star_items_share_one_run() {
        assert_eq!(lists("- a\n* b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn numbered_items_merge_into_an_ordered_list() {
        assert_eq!(lists("1. a\n2. b"), "<ol><li>a</li><li>b</li></ol>");
    }

    #[test]
    fn blank_line_splits_runs() {
        assert_eq!(
            lists("- a\n\n- b"),
            "<ul><li>a</li></ul>\n\n<ul><li>b</li></ul>"
        );
    }

    #[test]
    fn kind_change_splits_runs() {
        assert_eq!(
            lists("- a\n1. b"),
            "<ul><li>a</li></ul>\n<ol><li>b</li></ol>"
        );
    }

    // ============ Paragraph rule tests ============

    #[test]
    fn plain_lines_are_wrapped() {
        assert_eq!(paragraphs("hello\nworld"), "<p>hello</p>\n<p>world</p>");
    }

    #[test]
    fn block_elements_and_blanks_pass_through() {
        assert_eq!(
            paragraphs("<h1>t</h1>\n\n<ul><li>a</li></ul>\nplain"),
            "<h1>t</h1>\n<ul><li>a</li></ul>\n<p>plain</p>"
        );
    }

    #[test]
    fn inline_elements_still_get_a_paragraph() {
        assert_eq!(paragraphs("<em>x</em>"), "<p><em>x</em></p>");
    }
}
