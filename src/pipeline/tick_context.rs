// src/pipeline/tick_context.rs
//
// Single snapshot of everything the controller reads in one tick.
// Decoded once at the start of the tick and never mutated afterwards,
// so every decision in the tick sees the same world.

use crate::signals::{ExternalSignals, TagReader};
use crate::types::{Telemetry, Vehicle};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Wall-clock seconds.
    pub now: f64,
    pub telemetry: Option<Telemetry>,
    /// `None` when the traffic source failed this tick.
    pub traffic: Option<Vec<Vehicle>>,
    pub signals: ExternalSignals,
}

impl TickInput {
    pub fn new(now: f64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn traffic(&self) -> Option<&[Vehicle]> {
        self.traffic.as_deref()
    }
}

/// One recorded tick as the host delivers it: raw, loosely typed JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTick {
    pub now: f64,
    #[serde(default)]
    pub telemetry: Value,
    #[serde(default)]
    pub traffic: Value,
    #[serde(default)]
    pub tags: Value,
    /// Driver takeover notification received since the previous tick.
    #[serde(default)]
    pub takeover: bool,
}

impl RawTick {
    pub fn decode(&self, reader: &mut TagReader) -> TickInput {
        TickInput {
            now: self.now,
            telemetry: reader.read_telemetry(&self.telemetry),
            traffic: reader.read_traffic(&self.traffic),
            signals: reader.read_signals(&self.tags),
        }
    }
}
