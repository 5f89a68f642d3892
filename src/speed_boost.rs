// src/speed_boost.rs
//
// Converts a desired cruise-speed offset into discrete increase/decrease
// pulses for the ACC. Each pulse must be held for SPEED_PULSE_HOLD_S and
// moves the applied offset by exactly one km/h when it completes.
//
// Invariants:
//   - at most one pulse is active at any time
//   - a pulse whose direction no longer matches the pending delta is
//     cancelled without being counted

use crate::config::SPEED_PULSE_HOLD_S;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedDirection {
    Increase,
    Decrease,
}

impl SpeedDirection {
    fn from_delta(delta: i32) -> Option<Self> {
        match delta.signum() {
            1 => Some(Self::Increase),
            -1 => Some(Self::Decrease),
            _ => None,
        }
    }

    /// Event name understood by the cruise-control subsystem.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Increase => "increment_speed",
            Self::Decrease => "decrement_speed",
        }
    }
}

/// Sink for speed pulse start/stop signals.
pub trait SpeedSignal {
    fn set_pulse(&mut self, direction: SpeedDirection, active: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActivePulse {
    direction: SpeedDirection,
    started_at: f64,
}

#[derive(Debug, Clone)]
pub struct SpeedBoostArbitrator {
    applied: i32,
    target: i32,
    active: Option<ActivePulse>,
    hold_s: f64,
}

impl Default for SpeedBoostArbitrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedBoostArbitrator {
    pub fn new() -> Self {
        Self::with_hold(SPEED_PULSE_HOLD_S)
    }

    pub fn with_hold(hold_s: f64) -> Self {
        Self {
            applied: 0,
            target: 0,
            active: None,
            hold_s,
        }
    }

    pub fn applied(&self) -> i32 {
        self.applied
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn active_direction(&self) -> Option<SpeedDirection> {
        self.active.map(|p| p.direction)
    }

    pub fn is_settled(&self) -> bool {
        self.active.is_none() && self.applied == self.target
    }

    /// Moves the target only; convergence happens in `tick`.
    pub fn request_boost(&mut self, amount: i32) {
        if amount <= 0 || amount == self.target {
            return;
        }

        self.target = amount;
        debug!(
            "Scheduling speed boost: target +{} km/h (applied {:+} km/h)",
            amount, self.applied
        );
    }

    pub fn clear_boost(&mut self) {
        if self.target == 0 && self.applied == 0 {
            return;
        }

        self.target = 0;
        debug!(
            "Scheduling speed boost removal (current {:+} km/h)",
            self.applied
        );
    }

    pub fn tick(&mut self, now: f64, signal: &mut dyn SpeedSignal) {
        loop {
            let desired = SpeedDirection::from_delta(self.target - self.applied);

            if let Some(pulse) = self.active {
                if desired != Some(pulse.direction) {
                    self.finish_pulse(signal, false);
                    continue;
                }

                if now - pulse.started_at < self.hold_s {
                    return;
                }

                self.finish_pulse(signal, true);
                continue;
            }

            let Some(direction) = desired else {
                return;
            };

            if let Err(e) = signal.set_pulse(direction, true) {
                error!("Failed to emit {} event: {}", direction.event_name(), e);
                return;
            }

            self.active = Some(ActivePulse {
                direction,
                started_at: now,
            });
            return;
        }
    }

    fn finish_pulse(&mut self, signal: &mut dyn SpeedSignal, completed: bool) {
        let Some(pulse) = self.active.take() else {
            return;
        };

        if let Err(e) = signal.set_pulse(pulse.direction, false) {
            error!("Failed to release {} event: {}", pulse.direction.event_name(), e);
        }

        if completed {
            self.applied = match pulse.direction {
                SpeedDirection::Increase => self.applied + 1,
                SpeedDirection::Decrease => (self.applied - 1).max(0),
            };
        }
    }
}
