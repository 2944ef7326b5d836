//! Conversion of arbitrary strings into valid, unique identifiers.
//!
//! Sanitization is deterministic: the same input against the same set of
//! previously claimed identifiers always yields the same output. The only
//! exception is the random suffix used once numeric suffixes run out.

pub mod keywords;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use unicode_ident::{is_xid_continue, is_xid_start};

pub use keywords::{escape_keyword, is_keyword};

use crate::ports::IdGenerator;

/// Longest identifier emitted, in characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 511;

/// Base name used for blank input.
pub const FALLBACK_NAME: &str = "GeneratedItem";

/// Base name used for blank paths.
pub const FALLBACK_PATH_NAME: &str = "Item";

/// Highest numeric suffix tried before switching to a random one.
pub const MAX_NUMERIC_SUFFIX: u32 = 10_000;

/// Identifiers already claimed within one namespace.
pub struct UsedIdentifiers {
    used: HashSet<String>,
    ids: Arc<dyn IdGenerator>,
}

impl UsedIdentifiers {
    /// Creates an empty set; `ids` supplies suffixes once numbering runs out.
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { used: HashSet::new(), ids }
    }

    /// Whether `identifier` has been claimed.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.used.contains(identifier)
    }

    /// Number of claimed identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Whether nothing has been claimed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Claims `candidate`, or the first free `candidate_N` for N from 2.
    pub fn claim(&mut self, candidate: String) -> String {
        if self.used.insert(candidate.clone()) {
            return candidate;
        }
        for suffix in 2..=MAX_NUMERIC_SUFFIX {
            let numbered = format!("{candidate}_{suffix}");
            if self.used.insert(numbered.clone()) {
                return numbered;
            }
        }
        loop {
            let random = format!("{candidate}_{}", self.ids.generate_id());
            debug!(identifier = %random, "numeric suffixes exhausted");
            if self.used.insert(random.clone()) {
                return random;
            }
        }
    }
}

impl std::fmt::Debug for UsedIdentifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsedIdentifiers").field("used", &self.used).finish_non_exhaustive()
    }
}

/// Converts `input` into a valid identifier, claiming it in `used` if given.
pub fn to_valid_identifier(input: &str, used: Option<&mut UsedIdentifiers>) -> String {
    let candidate =
        if input.trim().is_empty() { FALLBACK_NAME.to_string() } else { sanitize(input) };
    match used {
        Some(used) => used.claim(candidate),
        None => candidate,
    }
}

/// Converts a root-relative path into an identifier, without claiming it.
///
/// The extension, if given, is removed from the end; separators become a
/// double underscore and dots a single one.
#[must_use]
pub fn sanitize_path_to_identifier(relative_path: &str, extension: Option<&str>) -> String {
    if relative_path.trim().is_empty() {
        return FALLBACK_PATH_NAME.to_string();
    }
    let stem = match extension.filter(|e| !e.is_empty()) {
        Some(ext) => relative_path.strip_suffix(ext).unwrap_or(relative_path),
        None => relative_path,
    };
    let flattened = stem.replace(['\\', '/'], "__").replace('.', "_");
    to_valid_identifier(&flattened, None)
}

/// 32-bit FNV-1a over the UTF-16 code units of `input`.
#[must_use]
pub fn stable_hash(input: &str) -> u32 {
    const OFFSET_BASIS: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    input
        .encode_utf16()
        .fold(OFFSET_BASIS, |hash, unit| (hash ^ u32::from(unit)).wrapping_mul(PRIME))
}

/// `XID_Continue`, minus digits outside ASCII.
fn is_identifier_char(c: char) -> bool {
    c.is_ascii_digit() || (is_xid_continue(c) && !c.is_numeric())
}

fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_underscore = false;
    for c in input.chars() {
        if is_identifier_char(c) {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    let trimmed_len = out.trim_end_matches('_').len();
    out.truncate(trimmed_len);
    if out.is_empty() {
        out.push('_');
    }

    // Digits and connectors may continue an identifier but not start one.
    if out.chars().next().is_some_and(|c| !(c == '_' || is_xid_start(c))) {
        out.insert(0, '_');
    }

    if is_keyword(&out) {
        out = escape_keyword(&out);
    }

    if out.chars().count() > MAX_IDENTIFIER_LENGTH {
        out = truncate_with_hash(&out);
    }
    out
}

fn truncate_with_hash(input: &str) -> String {
    // Room for the underscore and eight hex digits.
    let keep = MAX_IDENTIFIER_LENGTH - 9;
    let head: String = input.chars().take(keep).collect();
    format!("{head}_{:08X}", stable_hash(input))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct Counter(AtomicUsize);

    impl IdGenerator for Counter {
        fn generate_id(&self) -> String {
            format!("r{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn used() -> UsedIdentifiers {
        UsedIdentifiers::new(Arc::new(Counter(AtomicUsize::new(0))))
    }

    #[test]
    fn invalid_runs_collapse_and_trailing_underscores_trim() {
        assert_eq!(to_valid_identifier("my-cool  project!!", None), "my_cool_project");
        assert_eq!(to_valid_identifier("a__b", None), "a__b");
        assert_eq!(to_valid_identifier("---", None), "__");
    }

    #[test]
    fn leading_digit_gets_prefix() {
        assert_eq!(to_valid_identifier("1st", None), "_1st");
        assert_eq!(to_valid_identifier("\u{203F}x", None), "_\u{203F}x");
    }

    #[test]
    fn unicode_letters_and_connectors_survive() {
        assert_eq!(to_valid_identifier("café\u{FF3F}bar", None), "café\u{FF3F}bar");
        assert_eq!(to_valid_identifier("x²", None), "x");
    }

    #[test]
    fn combining_marks_cannot_start_an_identifier() {
        // U+0345 is alphabetic but not XID_Start.
        assert!('\u{0345}'.is_alphabetic());
        assert_eq!(to_valid_identifier("\u{0345}x", None), "_\u{0345}x");
        assert_eq!(to_valid_identifier("e\u{0301}t\u{00E9}", None), "e\u{0301}t\u{00E9}");
        // Letter-like symbols that are not XID_Continue are replaced.
        assert_eq!(to_valid_identifier("a\u{2E2F}b", None), "a_b");
    }

    #[test]
    fn keywords_are_escaped_not_renamed() {
        assert_eq!(to_valid_identifier("type", None), "r#type");
        assert_eq!(to_valid_identifier("Async", None), "r#Async");
        assert_eq!(to_valid_identifier("self", None), "self_");
        assert_eq!(to_valid_identifier("-", None), "__");
    }

    #[test]
    fn blank_input_uses_fallback_name() {
        assert_eq!(to_valid_identifier("   ", None), FALLBACK_NAME);
        let mut used = used();
        assert_eq!(to_valid_identifier("", Some(&mut used)), "GeneratedItem");
        assert_eq!(to_valid_identifier("", Some(&mut used)), "GeneratedItem_2");
    }

    #[test]
    fn long_names_are_truncated_with_stable_hash() {
        let long = "a".repeat(600);
        let result = to_valid_identifier(&long, None);
        assert_eq!(result.chars().count(), MAX_IDENTIFIER_LENGTH);
        assert_eq!(&result[..502], &long[..502]);
        assert_eq!(result, format!("{}_{:08X}", &long[..502], stable_hash(&long)));
        assert_eq!(result, to_valid_identifier(&long, None));
    }

    #[test]
    fn hash_is_fnv1a_over_utf16() {
        assert_eq!(stable_hash(""), 0x811C_9DC5);
        assert_eq!(stable_hash("a"), 0xE40C_292C);
    }

    #[test]
    fn same_state_same_answer_then_uniquified() {
        let mut used = used();
        let first = to_valid_identifier("App", None);
        assert_eq!(first, to_valid_identifier("App", None));
        assert_eq!(to_valid_identifier("App", Some(&mut used)), "App");
        assert_eq!(to_valid_identifier("App", Some(&mut used)), "App_2");
        assert_eq!(to_valid_identifier("App", Some(&mut used)), "App_3");
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn exhausted_numbering_uses_generator() {
        let mut used = used();
        used.claim("x".into());
        for n in 2..=MAX_NUMERIC_SUFFIX {
            used.claim(format!("x_{n}"));
        }
        assert_eq!(used.claim("x".into()), "x_r0");
    }

    #[test]
    fn path_sanitization_flattens_separators_and_dots() {
        assert_eq!(sanitize_path_to_identifier("a.b/c-d.csproj", Some(".csproj")), "a_b__c_d");
        assert_eq!(sanitize_path_to_identifier(r"src\Lib\App.csproj", Some(".csproj")), "src__Lib__App");
        assert_eq!(sanitize_path_to_identifier("src/App", Some(".csproj")), "src__App");
        assert_eq!(sanitize_path_to_identifier("2024/notes.md", None), "_2024__notes_md");
        assert_eq!(sanitize_path_to_identifier("  ", None), "Item");
    }
}
