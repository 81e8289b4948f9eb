/*!
 * # Inline Markdown Engine
 *
 * Converts the restricted markdown dialect used in lesson prose into
 * sanitized HTML. The engine is a fixed pipeline of regex-driven rules, each
 * consuming the previous rule's output:
 *
 * 1. Escape pass: raw `&`, `<`, `>` become entities (allow-listed markup and
 *    existing entities are recognised and kept, which is what makes the whole
 *    engine idempotent on its own output)
 * 2. Headings: `#`, `##`, `###` at line start
 * 3. Emphasis: `***x***`, `**x**`, `*x*` and the underscore equivalents
 * 4. Inline code: `` `x` ``, shielded from the later rules
 * 5. Links: `[label](url)`, emitted with `target="_blank"` and
 *    `rel="noopener noreferrer"`
 * 6. Horizontal rules: a line of only `---`, `***`, or `___`
 * 7. Unordered lists: consecutive `- ` or `* ` lines merged into one `<ul>`
 * 8. Ordered lists: consecutive `N. ` lines merged into one `<ol>`
 * 9. Paragraphs: remaining non-empty, non-block lines wrapped in `<p>`
 * 10. Sanitizer: final allow-list pass over everything, independent of the
 *     rules above
 *
 * The rule order is load-bearing: emphasis must see triple markers before
 * double, lists must run before the paragraph wrap, and the sanitizer runs
 * last so nothing an earlier rule produced escapes the allow-list.
 *
 * Code blocks never pass through here. Fenced code belongs to the block
 * model (or the legacy fallback parser) and is rendered verbatim.
 */

mod rules;
mod sanitize;

pub use sanitize::sanitize;

/// Render one piece of lesson prose to sanitized HTML.
pub fn to_safe_html(markdown: &str) -> String {
    let source = normalize(markdown);
    let escaped = sanitize(&source);
    let with_headings = rules::headings(&escaped);
    let with_emphasis = rules::emphasis(&with_headings);
    let (shielded, code_spans) = rules::inline_code(&with_emphasis);
    let with_links = rules::links(&shielded);
    let with_rules = rules::horizontal_rules(&with_links);
    let with_lists = rules::lists(&with_rules);
    let wrapped = rules::paragraphs(&with_lists);
    let restored = rules::restore_code_spans(&wrapped, &code_spans);
    sanitize(&restored)
}

/// Normalise line endings and drop stray shield delimiters, which are
/// reserved for the code span rule.
fn normalize(markdown: &str) -> String {
    markdown
        .replace("\r\n", "\n")
        .replace([rules::SHIELD_OPEN, rules::SHIELD_CLOSE], "")
}
