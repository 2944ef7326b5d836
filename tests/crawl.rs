//! Crawler, root resolution and generation over real directory trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sourcy::adapters::live::{LiveIdGenerator, LivePlatform};
use sourcy::adapters::replaying::ReplayingGitRepo;
use sourcy::cassette::CassetteReplayer;
use sourcy::config::BuildProperties;
use sourcy::context::ServiceContext;
use sourcy::crawl::{SafeWalker, SkipReason, SkippedPath};
use sourcy::diagnostics::Diagnostics;
use sourcy::generate::{generate, RetryPolicy};
use sourcy::root::{Marker, RootResolver};
use tempfile::TempDir;

fn tree(paths: &[&str]) -> TempDir {
    let dir = tempfile::Builder::new().prefix("sourcy").tempdir().unwrap();
    for path in paths {
        let full = dir.path().join(path);
        if path.ends_with('/') {
            fs::create_dir_all(&full).unwrap();
        } else {
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, "").unwrap();
        }
    }
    dir
}

fn real(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap()
}

fn relative(root: &Path, paths: Vec<PathBuf>) -> Vec<String> {
    paths
        .into_iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

fn walk_dirs(root: &Path) -> (Vec<String>, Vec<SkippedPath>) {
    let mut skipped = Vec::new();
    let dirs: Vec<PathBuf> = SafeWalker::new(&LivePlatform)
        .directories(root)
        .with_skip_handler(|s| skipped.push(s.clone()))
        .collect();
    (relative(root, dirs), skipped)
}

#[test]
fn directories_come_out_sorted_in_pre_order() {
    let dir = tree(&["b/y/", "a/", "b/x/", "c.txt"]);
    let (dirs, skipped) = walk_dirs(dir.path());
    assert_eq!(dirs, ["", "a", "b", "b/x", "b/y"]);
    assert!(skipped.is_empty());
}

#[test]
fn deny_listed_and_ignored_directories_are_not_entered() {
    let dir = tree(&[
        "web/node_modules/dep/package.json",
        "src/bin/Debug/x.dll",
        "src/obj/",
        "vendor/.sourcyignore",
        "vendor/lib/",
        "src/app/",
    ]);
    let (dirs, skipped) = walk_dirs(dir.path());
    assert_eq!(dirs, ["", "src", "src/app", "web"]);
    let excluded: Vec<_> = skipped
        .iter()
        .filter(|s| s.reason == SkipReason::ExcludedDirectory)
        .map(|s| s.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(excluded, ["bin", "obj", "node_modules"]);
}

#[test]
fn depth_ceiling_stops_descent_and_reports_depth() {
    let dir = tree(&["d1/d2/d3/d4/"]);
    let mut skipped = Vec::new();
    let dirs: Vec<PathBuf> = SafeWalker::new(&LivePlatform)
        .with_max_depth(2)
        .directories(dir.path())
        .with_skip_handler(|s| skipped.push(s.clone()))
        .collect();
    assert_eq!(relative(dir.path(), dirs), ["", "d1", "d1/d2"]);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].reason, SkipReason::MaxDepthReached);
    assert_eq!(skipped[0].depth, Some(3));
}

#[test]
fn files_layer_lists_files_of_admitted_directories() {
    let dir = tree(&["README.md", "src/main.rs", "src/lib.rs", "bin/tool"]);
    let files: Vec<PathBuf> = SafeWalker::new(&LivePlatform).files(dir.path()).collect();
    assert_eq!(relative(dir.path(), files), ["README.md", "src/lib.rs", "src/main.rs"]);
}

#[test]
fn repeated_walks_are_identical() {
    let dir = tree(&["z/1/", "a/2/f", "m/", "a/1/g"]);
    let first = walk_dirs(dir.path()).0;
    let second = walk_dirs(dir.path()).0;
    assert_eq!(first, second);
}

#[cfg(unix)]
#[test]
fn symlink_back_to_ancestor_terminates() {
    let dir = tree(&["a/b/"]);
    std::os::unix::fs::symlink(dir.path(), dir.path().join("a/b/loop")).unwrap();

    let (dirs, skipped) = walk_dirs(dir.path());
    assert!(dirs.len() <= 4, "walk ran away: {dirs:?}");
    assert!(dirs.starts_with(&["".to_string(), "a".to_string(), "a/b".to_string()]));
    assert!(skipped.iter().any(|s| s.reason == SkipReason::SymlinkCycle));
}

#[cfg(unix)]
#[test]
fn second_route_to_a_visited_directory_is_skipped() {
    let dir = tree(&["real/inner/", "z/"]);
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("z/alias")).unwrap();

    let (dirs, skipped) = walk_dirs(dir.path());
    assert_eq!(dirs, ["", "real", "real/inner", "z"]);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].reason, SkipReason::SymlinkCycle);
}

#[cfg(unix)]
#[test]
fn link_to_unvisited_directory_is_followed() {
    let dir = tree(&["real/inner/"]);
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("a")).unwrap();

    let (dirs, skipped) = walk_dirs(dir.path());
    assert_eq!(dirs, ["", "a", "a/inner"]);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].path, dir.path().join("real"));
}

#[cfg(target_os = "linux")]
#[test]
fn sibling_names_that_are_not_unicode_are_both_walked() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tree(&[]);
    for (name, file) in [(&b"d\xFF"[..], "A.csproj"), (&b"d\xFE"[..], "B.csproj")] {
        let sub = dir.path().join(OsStr::from_bytes(name));
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join(file), "").unwrap();
    }

    let mut skipped = Vec::new();
    let files: Vec<PathBuf> = SafeWalker::new(&LivePlatform)
        .files(dir.path())
        .with_skip_handler(|s| skipped.push(s.clone()))
        .collect();
    let names: Vec<_> =
        files.iter().map(|f| f.file_name().unwrap().to_string_lossy().into_owned()).collect();
    assert_eq!(names, ["B.csproj", "A.csproj"]);
    assert!(skipped.is_empty(), "unexpected skips: {skipped:?}");
}

#[cfg(unix)]
#[test]
fn start_through_a_symlink_resolves_to_the_real_root() {
    let dir = tree(&["real/.sourcyroot", "real/app/"]);
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
    let root = RootResolver::new(&LivePlatform).find_root(&dir.path().join("alias/app")).unwrap();
    assert_eq!(root.path(), real(&dir.path().join("real")));
    assert!(root.path().is_absolute());
}

#[test]
fn closest_marker_wins_and_markers_have_priority() {
    let dir = tree(&[
        ".git/HEAD",
        "nested/.sourcyroot",
        "nested/deep/src/",
        "props/Directory.Build.props",
        "props/global.json",
    ]);
    let resolver = RootResolver::new(&LivePlatform);

    let root = resolver.find_root(&dir.path().join("nested/deep/src")).unwrap();
    assert_eq!(root.path(), real(&dir.path().join("nested")));

    let outer = resolver.find_root(&dir.path().join("props")).unwrap();
    assert_eq!(outer.path(), real(&dir.path().join("props")));
    assert_eq!(resolver.marker_in(&dir.path().join("props")), Some(Marker::DirectoryBuildProps));
    assert_eq!(resolver.marker_in(dir.path()), Some(Marker::Git));
}

#[test]
fn gitdir_file_marks_a_root() {
    let dir = tree(&["sub/src/"]);
    fs::write(dir.path().join("sub/.git"), "GITDIR: ../.git/modules/sub\n").unwrap();
    let root = RootResolver::new(&LivePlatform).find_root(&dir.path().join("sub/src")).unwrap();
    assert_eq!(root.path(), real(&dir.path().join("sub")));
}

#[test]
fn override_wins_and_invalid_override_falls_back() {
    let dir = tree(&[".sourcyroot", "app/", "elsewhere/"]);
    let resolver = RootResolver::new(&LivePlatform);
    let start = dir.path().join("app");

    let custom = dir.path().join("elsewhere");
    let resolved = resolver.resolve(Some(start.as_path()), custom.to_str());
    assert_eq!(resolved.root.unwrap().path(), real(&custom));

    let resolved = resolver.resolve(Some(start.as_path()), Some("/no/such/sourcy/root"));
    assert_eq!(resolved.root.unwrap().path(), real(dir.path()));
    let mut diagnostics = Diagnostics::new();
    diagnostics.notes(&resolved.notes);
    assert!(diagnostics.contains("SOURCY010"));
}

#[test]
fn duplicate_project_names_are_qualified_by_path() {
    let dir = tree(&[
        ".sourcyroot",
        "src/App/App.csproj",
        "src/Lib/App/App.csproj",
        "deploy/Dockerfile",
        "site/package.json",
    ]);
    let git = ReplayingGitRepo::new(CassetteReplayer::default());
    let ctx = ServiceContext::new(
        Box::new(LivePlatform),
        Box::new(git),
        Arc::new(LiveIdGenerator::new()),
    )
    .with_retry(RetryPolicy::immediate(1));
    let props =
        BuildProperties { project_dir: Some(dir.path().join("src/App")), root_override: None };

    let mut diagnostics = Diagnostics::new();
    let generated = generate(&ctx, &props, &mut diagnostics).unwrap();

    let projects = generated.modules.iter().find(|m| m.module == "dotnet::projects").unwrap();
    let names: Vec<_> = projects.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["src__App", "src__Lib__App"]);

    let git = generated.git.unwrap();
    assert_eq!(git.branch_name, "unknown");
    assert!(diagnostics.contains("SOURCY004"));
    assert!(diagnostics.contains("SOURCY101"));
}
