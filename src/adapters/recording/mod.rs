//! Recording adapters that capture port interactions to a cassette.

pub mod git;
pub mod id_gen;

pub use git::RecordingGitRepo;
pub use id_gen::RecordingIdGenerator;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::cassette::CassetteRecorder;

/// Records one call. Results serialize as `{"Ok": v}` or `{"Err": e}`, the
/// shape the replaying adapters deserialize back into a `Result`.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize + ?Sized,
    O: Serialize + ?Sized,
{
    let input = serde_json::to_value(input).unwrap_or_default();
    let output = serde_json::to_value(output).unwrap_or_default();
    recorder.lock().expect("recorder lock poisoned").record(port, method, input, output);
}
