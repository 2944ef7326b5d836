//! Reserved words of the generated language.

/// Strict, reserved and edition-dependent keywords, lower-cased.
const KEYWORDS: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const NOT_RAW: &[&str] = &["_", "crate", "self", "super", "Self"];

/// Returns `true` if `word` matches a keyword, ignoring case.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    let lower = word.to_lowercase();
    KEYWORDS.contains(&lower.as_str())
}

/// Escapes a keyword so it can be used as an identifier.
///
/// Most keywords become raw identifiers; the few that raw syntax rejects get
/// a trailing underscore.
#[must_use]
pub fn escape_keyword(word: &str) -> String {
    if NOT_RAW.contains(&word) {
        format!("{word}_")
    } else {
        format!("r#{word}")
    }
}
