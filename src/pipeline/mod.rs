// src/pipeline/mod.rs

pub mod event_bus;
pub mod metrics;
pub mod tick_context;

pub use event_bus::{ControllerEvent, EventBus};
pub use metrics::{ControllerMetrics, MetricsSummary};
pub use tick_context::{RawTick, TickInput};
