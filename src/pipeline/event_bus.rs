// src/pipeline/event_bus.rs
//
// In-process stand-in for the host's publish/subscribe bus. Implements
// every controller sink, so a single bus can be injected and drained by
// whoever forwards the events to the real vehicle interface.

use crate::indicator::IndicatorActuator;
use crate::speed_boost::{SpeedDirection, SpeedSignal};
use crate::status::{StatusReport, StatusSink};
use crate::types::Side;
use anyhow::Result;
use std::collections::VecDeque;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    Indicator { side: Side, on: bool },
    SpeedPulse { direction: SpeedDirection, active: bool },
    Status { active: bool, report: StatusReport },
}

pub struct EventBus {
    events: VecDeque<ControllerEvent>,
    max_pending: usize,
    left_indicator: bool,
    right_indicator: bool,
    last_status: Option<(bool, StatusReport)>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    pub fn new(max_pending: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_pending),
            max_pending,
            left_indicator: false,
            right_indicator: false,
            last_status: None,
        }
    }

    fn push(&mut self, event: ControllerEvent) {
        if self.events.len() >= self.max_pending {
            warn!(
                "Event bus full ({} events), dropping oldest",
                self.max_pending
            );
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        self.events.drain(..).collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = &ControllerEvent> {
        self.events.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn indicator_on(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left_indicator,
            Side::Right => self.right_indicator,
        }
    }

    pub fn last_status(&self) -> Option<&(bool, StatusReport)> {
        self.last_status.as_ref()
    }
}

impl IndicatorActuator for EventBus {
    fn set_indicator(&mut self, side: Side, on: bool) -> Result<()> {
        match side {
            Side::Left => self.left_indicator = on,
            Side::Right => self.right_indicator = on,
        }
        self.push(ControllerEvent::Indicator { side, on });
        Ok(())
    }
}

impl SpeedSignal for EventBus {
    fn set_pulse(&mut self, direction: SpeedDirection, active: bool) -> Result<()> {
        self.push(ControllerEvent::SpeedPulse { direction, active });
        Ok(())
    }
}

impl StatusSink for EventBus {
    fn publish(&mut self, active: bool, report: &StatusReport) -> Result<()> {
        self.last_status = Some((active, report.clone()));
        self.push(ControllerEvent::Status {
            active,
            report: report.clone(),
        });
        Ok(())
    }
}
