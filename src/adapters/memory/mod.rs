//! In-memory adapters for tests.

pub mod platform;

pub use platform::{MemFailure, MemPlatform};
