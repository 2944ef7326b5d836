//! Live adapter for the `Platform` port backed by `std::fs`.

use std::fs::{self, Metadata};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::ports::platform::{DirListing, EntryAttributes, Platform};

/// Live platform that queries the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivePlatform;

#[cfg(windows)]
mod attrs {
    pub const HIDDEN: u32 = 0x2;
    pub const SYSTEM: u32 = 0x4;
    pub const SPARSE_FILE: u32 = 0x200;
    pub const REPARSE_POINT: u32 = 0x400;
    pub const OFFLINE: u32 = 0x1000;
}

#[cfg(windows)]
fn platform_flags(_path: &Path, meta: &Metadata, attributes: &mut EntryAttributes) {
    use std::os::windows::fs::MetadataExt;

    let raw = meta.file_attributes();
    attributes.hidden = raw & attrs::HIDDEN != 0;
    attributes.system = raw & attrs::SYSTEM != 0;
    attributes.sparse = raw & attrs::SPARSE_FILE != 0;
    attributes.offline = raw & attrs::OFFLINE != 0;
    attributes.is_link |= raw & attrs::REPARSE_POINT != 0;
}

#[cfg(target_os = "macos")]
fn platform_flags(path: &Path, meta: &Metadata, attributes: &mut EntryAttributes) {
    use std::os::macos::fs::MetadataExt;

    // UF_HIDDEN from <sys/stat.h>
    const UF_HIDDEN: u32 = 0x8000;
    let dot_name = path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.'));
    attributes.hidden = dot_name || meta.st_flags() & UF_HIDDEN != 0;
}

#[cfg(not(any(windows, target_os = "macos")))]
fn platform_flags(_path: &Path, _meta: &Metadata, _attributes: &mut EntryAttributes) {}

impl Platform for LivePlatform {
    fn attributes(&self, path: &Path) -> io::Result<EntryAttributes> {
        let link_meta = fs::symlink_metadata(path)?;
        let is_link = link_meta.file_type().is_symlink();
        let is_dir = if is_link {
            // Dangling links are treated as files so the walker never descends.
            fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
        } else {
            link_meta.is_dir()
        };
        let mut attributes = EntryAttributes { is_dir, is_link, ..EntryAttributes::default() };
        platform_flags(path, &link_meta, &mut attributes);
        Ok(attributes)
    }

    fn list_dir(&self, path: &Path) -> io::Result<DirListing> {
        let mut listing = DirListing::default();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            let file_type = entry.file_type()?;
            let is_dir = if file_type.is_symlink() {
                fs::metadata(&entry_path).map(|m| m.is_dir()).unwrap_or(false)
            } else {
                file_type.is_dir()
            };
            if is_dir {
                listing.directories.push(entry_path);
            } else {
                listing.files.push(entry_path);
            }
        }
        listing.sort();
        Ok(listing)
    }

    fn resolve_link(&self, path: &Path) -> Option<PathBuf> {
        let resolved = fs::canonicalize(path).ok()?;
        Some(strip_verbatim(resolved))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_first_line(&self, path: &Path) -> io::Result<Option<String>> {
        let mut reader = BufReader::new(fs::File::open(path)?);
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(Some(trimmed.to_string()))
    }

    fn case_sensitive(&self) -> bool {
        !cfg!(any(windows, target_os = "macos"))
    }

    fn honors_hidden(&self) -> bool {
        cfg!(any(windows, target_os = "macos"))
    }
}

/// Removes the `\\?\` prefix `canonicalize` adds on Windows so resolved
/// paths compare equal to the paths produced by directory listings.
fn strip_verbatim(path: PathBuf) -> PathBuf {
    if cfg!(windows) {
        if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix(r"\\?\")) {
            if let Some(unc) = rest.strip_prefix("UNC\\") {
                return PathBuf::from(format!(r"\\{unc}"));
            }
            return PathBuf::from(rest);
        }
    }
    path
}
