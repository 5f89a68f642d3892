// src/lib.rs
//
// Automatic overtake maneuver controller for a driver-assist stack.
// Host-agnostic: inputs arrive as a decoded `TickInput` each tick and
// outputs leave through the sink traits.

pub mod config;
pub mod geometry;
pub mod indicator;
pub mod lane_clearance;
pub mod maneuver;
pub mod pipeline;
pub mod replay;
pub mod signals;
pub mod speed_boost;
pub mod status;
pub mod types;

pub use config::{Config, OvertakeConfig};
pub use maneuver::{OvertakeController, TakeoverHandle};
pub use pipeline::{ControllerEvent, EventBus, RawTick, TickInput};
pub use status::{StatusReport, StatusSink};
pub use types::{ManeuverPhase, Side, Telemetry, Vehicle};
