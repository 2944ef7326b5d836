//! Safe recursive crawling of repository trees.
//!
//! The walker never fails as a whole: every condition that prevents a
//! directory or file from being visited is reported as a [`SkippedPath`] and
//! the traversal carries on with the remaining nodes.

pub mod classify;
pub mod skip;
pub mod walker;

pub use classify::{
    classify_io_error, is_excluded_name, within_node_modules, AttributePlaceholderPolicy,
    NoPlaceholders, PlaceholderPolicy, EXCLUDED_DIRECTORIES, IGNORE_MARKER,
};
pub use skip::{SkipReason, SkippedPath};
pub use walker::{Directories, Files, SafeWalker, MAX_DEPTH};
