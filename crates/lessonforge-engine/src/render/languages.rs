use crate::models::Language;
use std::collections::HashMap;

/// Presentation metadata for one language.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageInfo {
    /// Human-facing name shown in a code block header.
    pub label: String,
    /// Grammar identifier for the syntax highlighter, if one exists.
    pub grammar: Option<String>,
}

impl LanguageInfo {
    pub fn new(label: &str, grammar: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            grammar: grammar.map(str::to_string),
        }
    }
}

/// Injected lookup from [`Language`] to presentation metadata.
///
/// The renderer resolves labels and grammars through this table instead of
/// hardcoding them, so a deployment can rename a language or swap highlighter
/// grammars without touching render code.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    entries: HashMap<Language, LanguageInfo>,
}

impl LanguageRegistry {
    /// Registry with no entries; every lookup falls back to the wire tag.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The stock table covering every [`Language`] variant.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (language, label, grammar) in [
            (Language::Python, "Python", Some("python")),
            (Language::JavaScript, "JavaScript", Some("javascript")),
            (Language::TypeScript, "TypeScript", Some("typescript")),
            (Language::Java, "Java", Some("java")),
            (Language::C, "C", Some("c")),
            (Language::Cpp, "C++", Some("cpp")),
            (Language::Sql, "SQL", Some("sql")),
            (Language::Html, "HTML", Some("html")),
            (Language::Css, "CSS", Some("css")),
            (Language::Bash, "Bash", Some("bash")),
            (Language::Text, "Plain text", None),
        ] {
            registry.register(language, LanguageInfo::new(label, grammar));
        }
        registry
    }

    /// Add or replace the entry for `language`.
    pub fn register(&mut self, language: Language, info: LanguageInfo) {
        self.entries.insert(language, info);
    }

    /// Resolve presentation metadata, falling back to the bare wire tag for
    /// unregistered languages.
    pub fn info(&self, language: Language) -> LanguageInfo {
        self.entries
            .get(&language)
            .cloned()
            .unwrap_or_else(|| LanguageInfo::new(language.tag(), None))
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_covers_cpp_label() {
        let registry = LanguageRegistry::builtin();
        let info = registry.info(Language::Cpp);
        assert_eq!(info.label, "C++");
        assert_eq!(info.grammar.as_deref(), Some("cpp"));
    }

    #[test]
    fn plain_text_has_no_grammar() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.info(Language::Text).grammar, None);
    }

    #[test]
    fn unregistered_language_falls_back_to_tag() {
        let registry = LanguageRegistry::empty();
        let info = registry.info(Language::Sql);
        assert_eq!(info.label, "sql");
        assert_eq!(info.grammar, None);
    }

    #[test]
    fn register_overrides_builtin_entry() {
        let mut registry = LanguageRegistry::builtin();
        registry.register(Language::Bash, LanguageInfo::new("Shell", Some("shellscript")));
        assert_eq!(registry.info(Language::Bash).label, "Shell");
    }
}
