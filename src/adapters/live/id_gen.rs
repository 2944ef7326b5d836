//! Random identifier suffixes backed by v4 UUIDs.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Hex digits kept from each UUID.
const SUFFIX_LEN: usize = 12;

/// Produces lowercase hex suffixes that are valid identifier characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveIdGenerator;

impl LiveIdGenerator {
    /// Creates the generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(SUFFIX_LEN);
        hex
    }
}
