//! Request admission gate.

use atelier_config::AdmissionConfig;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use parking_lot::Mutex;

/// Mutable gate state guarded by one lock.
#[derive(Debug, Default)]
struct GateState {
    /// Timestamp of the last admitted request; `None` means never.
    last_accepted_at: Option<DateTime<Utc>>,
    /// Whether a stroke is currently being drawn.
    stroke_in_progress: bool,
}

/// Decides whether the current drawing state may be sent right now.
///
/// The gate is a pure time/state check: it never inspects image content and
/// never schedules anything. Callers poll it on a fixed cadence; admission is
/// an atomic check-and-set, so at most one caller wins a given eligible
/// window even under concurrent polling.
#[derive(Debug)]
pub struct AdmissionGate {
    /// Minimum interval between admitted requests.
    min_interval: Duration,
    state: Mutex<GateState>,
}

impl AdmissionGate {
    /// Create a gate with the given minimum inter-request interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(GateState::default()),
        }
    }

    /// Create a gate from the admission config section.
    pub fn from_config(config: &AdmissionConfig) -> Self {
        Self::new(Duration::milliseconds(
            (config.min_interval_secs * 1000.0) as i64,
        ))
    }

    /// Mark a stroke as started; requests are suppressed until it ends.
    pub fn stroke_began(&self) {
        self.state.lock().stroke_in_progress = true;
    }

    /// Mark the in-progress stroke as finished.
    pub fn stroke_ended(&self) {
        self.state.lock().stroke_in_progress = false;
    }

    /// Atomic check-and-set: admit a request at `now` if no stroke is in
    /// progress and the minimum interval has elapsed since the last
    /// admission. On admission the gate records `now`; otherwise state is
    /// unchanged.
    pub fn should_allow_request(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        if state.stroke_in_progress {
            return false;
        }
        let eligible = match state.last_accepted_at {
            None => true,
            Some(last) => now - last >= self.min_interval,
        };
        if eligible {
            state.last_accepted_at = Some(now);
            debug!("admitted generation request (at={now})");
        }
        eligible
    }

    /// Admission check against the current wall clock.
    pub fn should_allow_now(&self) -> bool {
        self.should_allow_request(Utc::now())
    }

    /// Clear the gate back to its initial state.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.last_accepted_at = None;
        state.stroke_in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::AdmissionGate;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn gate_5s() -> AdmissionGate {
        AdmissionGate::new(Duration::seconds(5))
    }

    #[test]
    fn first_request_is_admitted() {
        let gate = gate_5s();
        assert!(gate.should_allow_request(at(0)));
    }

    #[test]
    fn interval_and_stroke_scenario() {
        // interval=5s; t=0 stroke ends, allow(0)=true; allow(2)=false;
        // allow(5)=true; stroke begins at t=6, allow(10)=false; stroke ends
        // at t=11, allow(11)=true.
        let gate = gate_5s();
        gate.stroke_ended();
        assert!(gate.should_allow_request(at(0)));
        assert!(!gate.should_allow_request(at(2)));
        assert!(gate.should_allow_request(at(5)));
        gate.stroke_began();
        assert!(!gate.should_allow_request(at(10)));
        gate.stroke_ended();
        assert!(gate.should_allow_request(at(11)));
    }

    #[test]
    fn stroke_suppresses_regardless_of_elapsed_time() {
        let gate = gate_5s();
        gate.stroke_began();
        assert!(!gate.should_allow_request(at(1_000_000)));
        gate.stroke_ended();
        assert!(gate.should_allow_request(at(1_000_000)));
    }

    #[test]
    fn denied_request_does_not_consume_the_window() {
        let gate = gate_5s();
        assert!(gate.should_allow_request(at(0)));
        // Denied polls must not push the window forward.
        assert!(!gate.should_allow_request(at(2)));
        assert!(!gate.should_allow_request(at(4)));
        assert!(gate.should_allow_request(at(5)));
    }

    #[test]
    fn reset_restores_initial_eligibility() {
        let gate = gate_5s();
        assert!(gate.should_allow_request(at(0)));
        gate.stroke_began();
        gate.reset();
        assert!(gate.should_allow_request(at(1)));
    }

    #[test]
    fn at_most_one_concurrent_caller_wins() {
        let gate = Arc::new(gate_5s());
        let now = at(0);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || gate.should_allow_request(now))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(false))
            .filter(|&admitted| admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    #[test]
    fn zero_interval_admits_every_poll() {
        let gate = AdmissionGate::new(Duration::zero());
        assert!(gate.should_allow_request(at(0)));
        assert!(gate.should_allow_request(at(0)));
    }
}
