//! ID generator port for producing unique identifier suffixes.

/// Generates unique suffixes.
///
/// Only used when deterministic uniquification is exhausted. Abstracting it
/// allows tests and cassette playback to substitute a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique string made of ASCII letters and digits.
    fn generate_id(&self) -> String;
}
