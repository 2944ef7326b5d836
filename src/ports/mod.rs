//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the generator core and an
//! external system (filesystem platform, git, random IDs).
//! Implementations live in `src/adapters/`.

pub mod git;
pub mod id_gen;
pub mod platform;

pub use git::{GitError, GitFuture, GitRepo};
pub use id_gen::IdGenerator;
pub use platform::{DirListing, EntryAttributes, Platform};
