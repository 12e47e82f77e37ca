//! Named circuits, one per remote endpoint.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitSnapshot};

/// Thread-safe registry handing out shared circuits by endpoint name.
#[derive(Debug, Clone)]
pub struct CircuitRegistry {
    circuits: Arc<DashMap<String, Arc<CircuitBreaker>>>,
    cooldown: Duration,
}

impl CircuitRegistry {
    /// Create an empty registry; new circuits use `cooldown`.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            circuits: Arc::new(DashMap::new()),
            cooldown,
        }
    }

    /// Get the circuit for `name`, creating a closed one on first use.
    pub fn circuit(&self, name: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.circuits.get(name) {
            return existing.value().clone();
        }
        self.circuits
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(circuit = %name, "Registering circuit");
                Arc::new(CircuitBreaker::new(name, self.cooldown))
            })
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// Snapshots of every circuit, sorted by name.
    pub fn snapshot(&self) -> Vec<CircuitSnapshot> {
        let mut snapshots: Vec<_> = self.circuits.iter().map(|r| r.value().snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(crate::resilience::circuit_breaker::DEFAULT_COOLDOWN)
    }
}
