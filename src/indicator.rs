// src/indicator.rs
//
// Turn-indicator pulses. The lane-change executor reads a short indicator
// pulse as the lane-change request, so this is the only way intent leaves
// the controller.

use crate::config::{INDICATOR_COOLDOWN_S, INDICATOR_PULSE_S};
use crate::types::Side;
use anyhow::Result;
use tracing::{debug, error};

/// The two mutually exclusive indicator attributes of the vehicle.
pub trait IndicatorActuator {
    fn set_indicator(&mut self, side: Side, on: bool) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingRelease {
    side: Side,
    release_at: f64,
}

#[derive(Debug, Clone)]
pub struct IndicatorPulseController {
    pending: Option<PendingRelease>,
    last_request: Option<(Side, f64)>,
    pulse_s: f64,
    cooldown_s: f64,
}

impl Default for IndicatorPulseController {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPulseController {
    pub fn new() -> Self {
        Self {
            pending: None,
            last_request: None,
            pulse_s: INDICATOR_PULSE_S,
            cooldown_s: INDICATOR_COOLDOWN_S,
        }
    }

    /// Side currently held on, if a release is scheduled.
    pub fn held_side(&self) -> Option<Side> {
        self.pending.map(|p| p.side)
    }

    /// Pulses the indicator on `side`. Returns true when the actuator was
    /// driven, false when debounced or when the actuator failed.
    pub fn request(&mut self, side: Side, now: f64, actuator: &mut dyn IndicatorActuator) -> bool {
        if let Some((last_side, at)) = self.last_request {
            if last_side == side && now - at < self.cooldown_s {
                return false;
            }
        }

        let toggled = actuator
            .set_indicator(side.opposite(), false)
            .and_then(|_| actuator.set_indicator(side, true));

        if let Err(e) = toggled {
            error!("Failed to toggle indicators for {} side: {}", side.as_str(), e);
            return false;
        }

        self.pending = Some(PendingRelease {
            side,
            release_at: now + self.pulse_s,
        });
        self.last_request = Some((side, now));
        debug!("Indicator pulse {}", side.as_str());
        true
    }

    /// Releases the held indicator once its pulse width has elapsed.
    pub fn tick(&mut self, now: f64, actuator: &mut dyn IndicatorActuator) {
        let Some(pending) = self.pending else {
            return;
        };

        if now < pending.release_at {
            return;
        }

        if let Err(e) = actuator.set_indicator(pending.side, false) {
            error!("Failed to release indicator: {}", e);
        }
        self.pending = None;
    }
}
