//! Replaying adapter for the `IdGenerator` port.

use std::sync::Mutex;

use tracing::warn;

use crate::adapters::live::LiveIdGenerator;
use crate::cassette::CassetteReplayer;
use crate::ports::IdGenerator;

/// Serves recorded ids from a cassette, generating fresh ones once the
/// recording runs out.
pub struct ReplayingIdGenerator {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIdGenerator {
    /// Creates a replaying generator from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl IdGenerator for ReplayingIdGenerator {
    fn generate_id(&self) -> String {
        let interaction = self
            .replayer
            .lock()
            .expect("replayer lock poisoned")
            .next_interaction("id_gen", "generate_id");
        match interaction.as_ref().and_then(|i| i.output.as_str()) {
            Some(id) => id.to_string(),
            None => {
                warn!("no recorded id left, generating a fresh one");
                LiveIdGenerator::new().generate_id()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::replayer;
    use crate::cassette::Interaction;
    use serde_json::json;

    fn id(seq: u64, value: &str) -> Interaction {
        Interaction {
            seq,
            port: "id_gen".into(),
            method: "generate_id".into(),
            input: json!(null),
            output: json!(value),
        }
    }

    #[test]
    fn replays_recorded_ids_then_falls_back() {
        let ids = ReplayingIdGenerator::new(replayer(vec![id(0, "aaa"), id(1, "bbb")]));
        assert_eq!(ids.generate_id(), "aaa");
        assert_eq!(ids.generate_id(), "bbb");
        assert_eq!(ids.generate_id().len(), 12);
    }
}
