use regex::Regex;
use std::sync::OnceLock;

/// Escape or keep every markup-significant token in `html`, letting only the
/// fixed allow-list of tags through.
///
/// The allow-list covers exactly what the inline rules can emit: `p`,
/// `h1`-`h3`, `strong`, `em`, `code`, `ul`, `ol`, `li`, `hr`, `br`, and
/// anchors in the exact `href`/`target`/`rel` shape the link rule writes with
/// a safe `href` scheme. Already-escaped entities are recognised and left
/// alone, so running the sanitizer over its own output changes nothing.
pub fn sanitize(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for token in token_pattern().find_iter(html) {
        out.push_str(&html[last..token.start()]);
        let text = token.as_str();
        if text.starts_with('<') && text.len() > 1 {
            if allowed_markup().is_match(text) {
                out.push_str(text);
            } else {
                out.push_str(&html_escape::encode_text(text));
            }
        } else if text.len() > 1 {
            // Recognised entity.
            out.push_str(text);
        } else {
            out.push_str(&html_escape::encode_text(text));
        }
        last = token.end();
    }
    out.push_str(&html[last..]);
    out
}

/// Matches everything the sanitizer has an opinion on: entities, tag-shaped
/// runs, and bare `&`, `<`, `>`. Text between matches is passed through.
fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(r"&[a-zA-Z][a-zA-Z0-9]*;|&#[0-9]+;|&#[xX][0-9a-fA-F]+;|</?[a-zA-Z][^<>]*>|[&<>]")
            .expect("Invalid sanitizer token regex")
    })
}

/// The full allow-list as one anchored pattern. Anchor tags must carry the
/// exact attribute set the link rule emits, with an `https`/`http`/`mailto`/
/// relative/fragment href.
fn allowed_markup() -> &'static Regex {
    static ALLOWED: OnceLock<Regex> = OnceLock::new();
    ALLOWED.get_or_init(|| {
        Regex::new(
            r##"(?i)^(?:</?(?:h[1-3]|p|strong|em|code|ul|ol|li)>|<(?:hr|br) ?/?>|</a>|<a href="(?:https?://|mailto:|/|#)[^"]*" target="_blank" rel="noopener noreferrer">)$"##,
        )
        .expect("Invalid allowed markup regex")
    })
}
