//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Serves a cassette's interactions sequentially per port/method pair.
#[derive(Debug, Clone, Default)]
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Queues every interaction of `cassette` under its port and method.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Takes the next interaction recorded for `port` and `method`.
    ///
    /// Returns `None` once that queue is exhausted or was never recorded.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Option<Interaction> {
        let next = self.queues.get_mut(&(port.to_string(), method.to_string()))?.pop_front();
        if next.is_none() {
            tracing::warn!(port, method, "cassette exhausted");
        }
        next
    }

    /// Interactions not yet served, across all ports.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }
}
