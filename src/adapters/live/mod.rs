//! Live adapters for real external interactions.

pub mod git;
pub mod id_gen;
pub mod platform;

pub use git::LiveGitRepo;
pub use id_gen::LiveIdGenerator;
pub use platform::LivePlatform;
