//! Root-relative path computation that never fails.

use std::path::{Path, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

use percent_encoding::percent_decode_str;
use url::Url;

/// Computes the path of `target` relative to `root`.
///
/// Returns the relative path and, when the URL-based computation could not
/// be used, the reason the string-based fallback was taken.
#[must_use]
pub fn try_make_relative(
    root: &Path,
    target: &Path,
    case_sensitive: bool,
) -> (String, Option<String>) {
    if target.as_os_str().is_empty() {
        return (String::new(), Some("Empty path".to_string()));
    }
    match url_relative(root, target) {
        Ok(relative) => (relative, None),
        Err(reason) => (fallback_relative(root, target, case_sensitive), Some(reason)),
    }
}

fn url_relative(root: &Path, target: &Path) -> Result<String, String> {
    let base = Url::from_directory_path(root)
        .map_err(|()| format!("root is not an absolute path: {}", root.display()))?;
    let file = Url::from_file_path(target)
        .map_err(|()| format!("path is not absolute: {}", target.display()))?;
    let relative = base
        .make_relative(&file)
        .ok_or_else(|| format!("no relative form between {base} and {file}"))?;
    let decoded = percent_decode_str(&relative)
        .decode_utf8()
        .map_err(|e| format!("relative path is not UTF-8: {e}"))?;
    Ok(decoded.replace('/', MAIN_SEPARATOR_STR))
}

fn fallback_relative(root: &Path, target: &Path, case_sensitive: bool) -> String {
    let mut prefix = root.to_string_lossy().into_owned();
    if !prefix.ends_with(MAIN_SEPARATOR) {
        prefix.push(MAIN_SEPARATOR);
    }
    let text = target.to_string_lossy();
    let matches = if case_sensitive {
        text.starts_with(&prefix)
    } else {
        text.get(..prefix.len()).is_some_and(|head| head.to_lowercase() == prefix.to_lowercase())
    };
    if matches {
        if let Some(rest) = text.get(prefix.len()..) {
            return rest.to_string();
        }
    }
    target.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn nested_file_is_relative_to_root() {
        let (rel, reason) =
            try_make_relative(Path::new("/repo"), Path::new("/repo/src/App/App.csproj"), true);
        assert_eq!(rel, "src/App/App.csproj");
        assert_eq!(reason, None);
    }

    #[test]
    fn trailing_separator_on_root_is_accepted() {
        let (rel, _) = try_make_relative(Path::new("/repo/"), Path::new("/repo/a.txt"), true);
        assert_eq!(rel, "a.txt");
    }

    #[test]
    fn escaped_characters_are_decoded() {
        let (rel, reason) =
            try_make_relative(Path::new("/repo"), Path::new("/repo/my dir/100%.txt"), true);
        assert_eq!(rel, "my dir/100%.txt");
        assert_eq!(reason, None);
    }

    #[test]
    fn empty_target_reports_reason() {
        let (rel, reason) = try_make_relative(Path::new("/repo"), Path::new(""), true);
        assert_eq!(rel, "");
        assert_eq!(reason.as_deref(), Some("Empty path"));
    }

    #[test]
    fn relative_root_falls_back_to_prefix_strip() {
        let (rel, reason) = try_make_relative(Path::new("repo"), Path::new("repo/src/a.txt"), true);
        assert_eq!(rel, "src/a.txt");
        assert!(reason.is_some());
    }

    #[test]
    fn unrelated_relative_target_falls_back_to_file_name() {
        let (rel, reason) = try_make_relative(Path::new("repo"), Path::new("other/a.txt"), true);
        assert_eq!(rel, "a.txt");
        assert!(reason.is_some());
    }

    #[test]
    fn fallback_prefix_respects_case_rules() {
        assert_eq!(fallback_relative(Path::new("Repo"), Path::new("repo/sub/x"), false), "sub/x");
        assert_eq!(fallback_relative(Path::new("Repo"), Path::new("repo/sub/x"), true), "x");
    }
}
