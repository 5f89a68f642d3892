// src/maneuver/session.rs
//
// Runtime session state owned by the controller. Phase and side fields
// only change through `set_phase` / `clear_maneuver`.

use crate::geometry::EgoFrame;
use crate::types::{ManeuverPhase, Side};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SessionState {
    phase: ManeuverPhase,
    phase_since: f64,
    reason: String,
    last_logged: Option<(ManeuverPhase, String)>,

    /// Side we pass on, re-derived from config every tick.
    pub pass_side: Side,
    /// Side of the lane change currently in flight.
    pub requested_side: Option<Side>,
    /// Lane to return to once the overtaken vehicle is clear.
    pub original_side: Side,

    pub lead_vehicle_id: Option<i64>,
    pub lead_last_seen: Option<f64>,
    /// Lead vehicle captured when the maneuver started.
    pub overtaken_vehicle_id: Option<i64>,

    /// Executor reported "executing" at least once for the current request.
    pub observed_execution: bool,

    /// Ego frame for the current tick.
    pub frame: Option<EgoFrame>,
}

impl SessionState {
    pub fn new(now: f64) -> Self {
        Self {
            phase: ManeuverPhase::Idle,
            phase_since: now,
            reason: "Initialized".to_string(),
            last_logged: None,
            pass_side: Side::Left,
            requested_side: None,
            original_side: Side::Right,
            lead_vehicle_id: None,
            lead_last_seen: None,
            overtaken_vehicle_id: None,
            observed_execution: false,
            frame: None,
        }
    }

    pub fn phase(&self) -> ManeuverPhase {
        self.phase
    }

    pub fn phase_since(&self) -> f64 {
        self.phase_since
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.phase_since
    }

    pub fn target_side(&self) -> Side {
        self.requested_side.unwrap_or(self.pass_side)
    }

    /// Enters `phase` with `reason`. A no-op when both are unchanged;
    /// otherwise the phase timer restarts.
    pub fn set_phase(&mut self, phase: ManeuverPhase, reason: &str, now: f64) -> bool {
        if self.phase == phase && self.reason == reason {
            return false;
        }

        self.phase = phase;
        self.phase_since = now;
        self.reason = reason.to_string();

        let already_logged = self
            .last_logged
            .as_ref()
            .is_some_and(|(p, r)| *p == phase && r == reason);
        if !already_logged {
            info!("{} -> {}", phase.as_str(), reason);
            self.last_logged = Some((phase, reason.to_string()));
        }

        true
    }

    /// Updates the reason without touching the phase timer.
    pub fn set_reason(&mut self, reason: &str) {
        if self.reason != reason {
            self.reason = reason.to_string();
        }
    }

    /// Drops all in-flight maneuver bookkeeping.
    pub fn clear_maneuver(&mut self) {
        self.requested_side = None;
        self.lead_vehicle_id = None;
        self.overtaken_vehicle_id = None;
        self.lead_last_seen = None;
        self.observed_execution = false;
    }
}
