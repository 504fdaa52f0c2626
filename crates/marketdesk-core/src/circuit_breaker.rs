//! Per-provider circuit breaker.
//!
//! Counts consecutive upstream failures (transport errors, 5xx and 429) and
//! refuses calls for a cool-down once the threshold is reached. After the
//! cool-down a single trial call decides whether the circuit closes again.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cool_down: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cool_down: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Circuit {
    Closed { failures: u32 },
    Open { since: Instant },
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    provider: ProviderId,
    config: CircuitBreakerConfig,
    circuit: Mutex<Circuit>,
}

impl CircuitBreaker {
    pub fn new(provider: ProviderId, config: CircuitBreakerConfig) -> Self {
        Self {
            provider,
            config,
            circuit: Mutex::new(Circuit::Closed { failures: 0 }),
        }
    }

    pub fn for_provider(provider: ProviderId) -> Self {
        Self::new(provider, CircuitBreakerConfig::default())
    }

    fn lock(&self) -> MutexGuard<'_, Circuit> {
        // Every transition is one assignment, so a poisoned value is still valid.
        self.circuit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a call may go out now. Moves an expired open circuit to half-open.
    pub fn allow_request(&self) -> bool {
        let mut circuit = self.lock();
        match *circuit {
            Circuit::Closed { .. } | Circuit::HalfOpen => true,
            Circuit::Open { since } if since.elapsed() >= self.config.cool_down => {
                *circuit = Circuit::HalfOpen;
                true
            }
            Circuit::Open { .. } => false,
        }
    }

    pub fn record_success(&self) {
        let mut circuit = self.lock();
        if matches!(*circuit, Circuit::HalfOpen) {
            info!(provider = %self.provider, "circuit closed");
        }
        *circuit = Circuit::Closed { failures: 0 };
    }

    pub fn record_failure(&self) {
        let mut circuit = self.lock();
        let failures = match *circuit {
            Circuit::Closed { failures } => failures.saturating_add(1),
            Circuit::HalfOpen => self.config.failure_threshold,
            Circuit::Open { .. } => return,
        };

        *circuit = if failures >= self.config.failure_threshold {
            warn!(provider = %self.provider, failures, cool_down = ?self.config.cool_down, "circuit opened");
            Circuit::Open {
                since: Instant::now(),
            }
        } else {
            Circuit::Closed { failures }
        };
    }

    /// Classifies an upstream status: 2xx closes, 5xx and 429 count as
    /// failures, anything else is the caller's fault and leaves the circuit alone.
    pub fn record_status(&self, status: u16) {
        match status {
            200..=299 => self.record_success(),
            429 | 500..=599 => self.record_failure(),
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        match *self.lock() {
            Circuit::Closed { .. } => CircuitState::Closed,
            Circuit::Open { .. } => CircuitState::Open,
            Circuit::HalfOpen => CircuitState::HalfOpen,
        }
    }
}
