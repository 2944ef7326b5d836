//! Port implementations.
//!
//! `live` talks to the real system, `memory` is an in-memory filesystem for
//! tests, and `recording`/`replaying` wrap the git and id ports with
//! cassettes.

pub mod live;
pub mod memory;
pub mod recording;
pub mod replaying;
