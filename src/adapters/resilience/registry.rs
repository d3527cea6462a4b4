//! Owner of every dependency breaker.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::InMemoryCircuitBreaker;
use crate::ports::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics};

/// Name of the classifier's breaker.
pub const CLASSIFIER_BREAKER: &str = "classifier";

/// One breaker per dependency name, created on first use.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: RwLock<BTreeMap<String, Arc<InMemoryCircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the breaker for `name`, creating it with `config` if absent.
    /// An existing breaker keeps its original configuration.
    pub fn get_or_create(&self, name: &str, config: CircuitBreakerConfig) -> Arc<dyn CircuitBreaker> {
        if let Some(existing) = self.get(name) {
            return existing;
        }
        let mut breakers = self.breakers.write().unwrap_or_else(|e| e.into_inner());
        let breaker = breakers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryCircuitBreaker::new(name, config)));
        Arc::clone(breaker) as Arc<dyn CircuitBreaker>
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CircuitBreaker>> {
        self.breakers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map(|b| Arc::clone(b) as Arc<dyn CircuitBreaker>)
    }

    /// Metrics for every breaker, ordered by name.
    pub fn metrics(&self) -> Vec<CircuitBreakerMetrics> {
        self.breakers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|b| b.metrics())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::CircuitState;

    #[test]
    fn breakers_are_scoped_per_dependency() {
        let registry = BreakerRegistry::new();
        let classifier = registry.get_or_create(CLASSIFIER_BREAKER, CircuitBreakerConfig::for_classifier());
        let ops = registry.get_or_create("channel:ops_team", CircuitBreakerConfig::for_channel());

        for _ in 0..3 {
            classifier.record_failure();
        }
        assert_eq!(classifier.state(), CircuitState::Open);
        assert_eq!(ops.state(), CircuitState::Closed);
    }

    #[test]
    fn get_or_create_returns_same_instance() {
        let registry = BreakerRegistry::new();
        let a = registry.get_or_create("x", CircuitBreakerConfig::default());
        let b = registry.get_or_create("x", CircuitBreakerConfig::for_classifier());
        a.record_failure();
        assert_eq!(b.metrics().total_failures, 1);
    }

    #[test]
    fn metrics_are_ordered_by_name() {
        let registry = BreakerRegistry::new();
        registry.get_or_create("b", CircuitBreakerConfig::default());
        registry.get_or_create("a", CircuitBreakerConfig::default());
        let names: Vec<String> = registry.metrics().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
