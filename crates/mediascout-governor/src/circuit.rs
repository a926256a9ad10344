//! Per-domain circuit breaker keyed on consecutive content-producing
//! failures, tripping open after a run of failures rather than on an
//! error-rate percentage.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub enum CircuitState {
    Closed { consecutive_failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { probe_in_flight: bool },
}

impl Default for CircuitState {
    fn default() -> Self {
        CircuitState::Closed {
            consecutive_failures: 0,
        }
    }
}

impl CircuitState {
    pub fn is_open(&self) -> bool {
        matches!(self, CircuitState::Open { .. })
    }

    /// Returns `true` if a call may proceed right now, transitioning
    /// `Open` -> `HalfOpen` once the cooldown has elapsed. Only one probe
    /// is let through per half-open window.
    pub fn try_acquire(&mut self, cooldown: Duration) -> bool {
        match *self {
            CircuitState::Closed { .. } => true,
            CircuitState::Open { opened_at } => {
                if opened_at.elapsed() >= cooldown {
                    *self = CircuitState::HalfOpen {
                        probe_in_flight: true,
                    };
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen { probe_in_flight } => {
                if probe_in_flight {
                    false
                } else {
                    *self = CircuitState::HalfOpen {
                        probe_in_flight: true,
                    };
                    true
                }
            }
        }
    }

    pub fn record_success(&mut self) {
        *self = CircuitState::Closed {
            consecutive_failures: 0,
        };
    }

    /// Records a failure, opening the circuit once `threshold`
    /// consecutive failures have accumulated. A failed probe in
    /// half-open always reopens the circuit.
    pub fn record_failure(&mut self, threshold: u32) {
        *self = match *self {
            CircuitState::Closed {
                consecutive_failures,
            } => {
                let failures = consecutive_failures + 1;
                if failures >= threshold {
                    CircuitState::Open {
                        opened_at: Instant::now(),
                    }
                } else {
                    CircuitState::Closed {
                        consecutive_failures: failures,
                    }
                }
            }
            CircuitState::Open { opened_at } => CircuitState::Open { opened_at },
            CircuitState::HalfOpen { .. } => CircuitState::Open {
                opened_at: Instant::now(),
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let mut state = CircuitState::default();
        for _ in 0..7 {
            state.record_failure(8);
            assert!(!state.is_open());
        }
        state.record_failure(8);
        assert!(state.is_open());
    }

    #[test]
    fn success_resets_consecutive_count() {
        let mut state = CircuitState::default();
        state.record_failure(8);
        state.record_failure(8);
        state.record_success();
        assert!(matches!(
            state,
            CircuitState::Closed {
                consecutive_failures: 0
            }
        ));
    }

    #[test]
    fn stays_closed_while_under_cooldown() {
        let mut state = CircuitState::Open {
            opened_at: Instant::now(),
        };
        assert!(!state.try_acquire(Duration::from_secs(600)));
    }

    #[test]
    fn half_open_lets_a_single_probe_through() {
        let mut state = CircuitState::Open {
            opened_at: Instant::now() - Duration::from_secs(700),
        };
        assert!(state.try_acquire(Duration::from_secs(600)));
        // Second caller during the same half-open window is rejected.
        assert!(!state.try_acquire(Duration::from_secs(600)));
    }

    #[test]
    fn failed_probe_reopens_circuit() {
        let mut state = CircuitState::HalfOpen {
            probe_in_flight: true,
        };
        state.record_failure(8);
        assert!(state.is_open());
    }
}
