//! Rendering of generated constants as Rust source or JSON.

use std::fmt::Write as _;

use clap::ValueEnum;

use super::artifacts::GeneratedModule;
use super::Generated;
use crate::error::Result;

/// First line of every generated Rust file.
pub const HEADER: &str = "// @generated by sourcy. Do not edit.";

/// Output format of `sourcy generate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rust source for `include!`.
    #[default]
    Rust,
    /// Pretty-printed JSON.
    Json,
}

/// Renders `generated` in `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(generated: &Generated, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Rust => Ok(render_rust(generated)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(generated)? + "\n"),
    }
}

/// Renders `generated` as Rust source.
///
/// Modules are nested by their `::` separated path in the order they appear;
/// every generated module is emitted even when it holds no constants.
#[must_use]
pub fn render_rust(generated: &Generated) -> String {
    let mut out = String::new();
    line(&mut out, 0, HEADER);
    if generated.root.is_none() {
        line(&mut out, 0, "// Repository root not found; nothing was generated.");
        return out;
    }

    let mut parents: Vec<(&str, Vec<&GeneratedModule>)> = Vec::new();
    for module in &generated.modules {
        let parent = module.module.split("::").next().unwrap_or(module.module);
        match parents.iter_mut().find(|(name, _)| *name == parent) {
            Some((_, children)) => children.push(module),
            None => parents.push((parent, vec![module])),
        }
    }

    for (parent, children) in parents {
        out.push('\n');
        line(&mut out, 0, &format!("pub mod {parent} {{"));
        for (i, module) in children.into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let child = module.module.rsplit("::").next().unwrap_or(module.module);
            line(&mut out, 1, "#[allow(dead_code, non_upper_case_globals)]");
            line(&mut out, 1, &format!("pub mod {child} {{"));
            for entry in &module.entries {
                line(&mut out, 2, &constant(&entry.name, &entry.path));
            }
            line(&mut out, 1, "}");
        }
        line(&mut out, 0, "}");
    }

    if let Some(git) = &generated.git {
        out.push('\n');
        line(&mut out, 0, "#[allow(dead_code)]");
        line(&mut out, 0, "pub mod git {");
        line(&mut out, 1, &constant("ROOT_DIRECTORY", &git.root_directory));
        line(&mut out, 1, &constant("BRANCH_NAME", &git.branch_name));
        line(&mut out, 0, "}");
    }
    out
}

fn line(out: &mut String, indent: usize, text: &str) {
    let _ = writeln!(out, "{:width$}{text}", "", width = indent * 4);
}

fn constant(name: &str, value: &str) -> String {
    format!("pub const {name}: &str = \"{}\";", escape(value))
}

/// Escapes `value` for use inside a Rust string literal.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::artifacts::Entry;
    use crate::generate::git::GitMetadata;

    fn module(path: &'static str, entries: &[(&str, &str)]) -> GeneratedModule {
        GeneratedModule {
            module: path,
            entries: entries
                .iter()
                .map(|(name, path)| Entry { name: (*name).into(), path: (*path).into() })
                .collect(),
        }
    }

    fn sample() -> Generated {
        Generated {
            root: Some("/repo".into()),
            modules: vec![
                module("dotnet::projects", &[("App", "/repo/App/App.csproj")]),
                module("dotnet::solutions", &[]),
                module("docker::dockerfiles", &[("r#type", "/repo/type/Dockerfile")]),
            ],
            git: Some(GitMetadata { root_directory: "/repo".into(), branch_name: "main".into() }),
            watched: Vec::new(),
        }
    }

    #[test]
    fn escapes_string_literal_specials() {
        assert_eq!(escape("C:\\a \"b\"\n\t\0"), "C:\\\\a \\\"b\\\"\\n\\t\\0");
        assert_eq!(escape("plain/path"), "plain/path");
    }

    #[test]
    fn renders_nested_modules_and_git() {
        let expected = "\
// @generated by sourcy. Do not edit.

pub mod dotnet {
    #[allow(dead_code, non_upper_case_globals)]
    pub mod projects {
        pub const App: &str = \"/repo/App/App.csproj\";
    }

    #[allow(dead_code, non_upper_case_globals)]
    pub mod solutions {
    }
}

pub mod docker {
    #[allow(dead_code, non_upper_case_globals)]
    pub mod dockerfiles {
        pub const r#type: &str = \"/repo/type/Dockerfile\";
    }
}

#[allow(dead_code)]
pub mod git {
    pub const ROOT_DIRECTORY: &str = \"/repo\";
    pub const BRANCH_NAME: &str = \"main\";
}
";
        assert_eq!(render_rust(&sample()), expected);
    }

    #[test]
    fn missing_root_renders_header_only() {
        let text = render_rust(&Generated::default());
        assert!(text.starts_with(HEADER));
        assert!(!text.contains("pub mod"));
    }

    #[test]
    fn json_lists_modules_and_git() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["modules"][0]["entries"][0]["name"], "App");
        assert_eq!(value["git"]["branch_name"], "main");
    }
}
