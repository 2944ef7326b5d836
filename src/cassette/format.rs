//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One call made through a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording, assigned by the recorder.
    pub seq: u64,
    /// Port name (`git` or `id_gen`).
    pub port: String,
    /// Method invoked on the port.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// What the call returned. Fallible calls store `{Ok: ..}` or `{Err: ..}`.
    pub output: serde_json::Value,
}

/// A recorded run of the generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name.
    pub name: String,
    /// When the run was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Version of sourcy that wrote the cassette.
    #[serde(default)]
    pub version: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Starts an empty cassette stamped with the current time and version.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            interactions: Vec::new(),
        }
    }

    /// Serializes to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if a recorded value cannot be represented in YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parses a YAML cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if `yaml` is not a valid cassette.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
