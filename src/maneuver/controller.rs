// src/maneuver/controller.rs
//
// Overtake state machine. One call to `tick` per host frame (~10 Hz).
//
// Tick order:
//   1. release indicator pulses, converge speed boost
//   2. consume takeover notification
//   3. disabled / dependency / telemetry guards (early publish)
//   4. ego frame + lead-vehicle continuity
//   5. start eligibility
//   6. one phase step
//   7. publish status
//
// The step logic never fails. Actuator errors are logged where they
// happen and the next tick's re-issue acts as the retry.

use super::eligibility::{check_start_conditions, StartConditions};
use super::session::SessionState;
use super::takeover::TakeoverHandle;
use crate::config::{OvertakeConfig, CLEARING_TIMEOUT_S, LANE_CHANGE_STALL_BUFFER_S};
use crate::geometry::EgoFrame;
use crate::indicator::{IndicatorActuator, IndicatorPulseController};
use crate::lane_clearance::{lane_is_clear, overtaken_vehicle_clear, ClearanceParams};
use crate::pipeline::metrics::ControllerMetrics;
use crate::pipeline::tick_context::TickInput;
use crate::signals::{is_executing, LANE_STATUS_IDLE};
use crate::speed_boost::{SpeedBoostArbitrator, SpeedSignal};
use crate::status::{StatusReport, StatusSink};
use crate::types::{ManeuverPhase, Side, Telemetry, Vehicle};
use tracing::{error, info, warn};

const WAITING_FOR_DEPENDENCIES: &str = "Waiting for Map/ACC";

/// Per-tick values shared by the phase handlers.
struct TickView<'a> {
    now: f64,
    telemetry: &'a Telemetry,
    traffic: Option<&'a [Vehicle]>,
    lane_status: &'a str,
}

pub struct OvertakeController<B> {
    session: SessionState,
    indicator: IndicatorPulseController,
    boost: SpeedBoostArbitrator,
    takeover: TakeoverHandle,
    metrics: ControllerMetrics,
    bus: B,
}

impl<B> OvertakeController<B>
where
    B: IndicatorActuator + SpeedSignal + StatusSink,
{
    pub fn new(bus: B, now: f64) -> Self {
        info!("✓ Overtake controller ready");
        Self {
            session: SessionState::new(now),
            indicator: IndicatorPulseController::new(),
            boost: SpeedBoostArbitrator::new(),
            takeover: TakeoverHandle::new(),
            metrics: ControllerMetrics::new(),
            bus,
        }
    }

    pub fn takeover_handle(&self) -> TakeoverHandle {
        self.takeover.clone()
    }

    pub fn metrics(&self) -> &ControllerMetrics {
        &self.metrics
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> ManeuverPhase {
        self.session.phase()
    }

    pub fn boost(&self) -> &SpeedBoostArbitrator {
        &self.boost
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn tick(&mut self, config: &OvertakeConfig, input: &TickInput) -> StatusReport {
        let now = input.now;
        self.metrics.inc(&self.metrics.ticks);

        self.session.pass_side = config.preferred_side.side();
        self.session.frame = None;
        self.indicator.tick(now, &mut self.bus);
        self.boost.tick(now, &mut self.bus);

        if self.takeover.take() && self.session.phase().is_active() {
            warn!(
                "🛑 Overtake interrupted by takeover (was in {})",
                self.session.phase().as_str()
            );
            self.metrics.inc(&self.metrics.takeovers);
            self.abort("Driver takeover", now);
        }

        if !config.enabled {
            self.reset("Disabled", now);
            return self.publish(false, StatusReport::disabled());
        }

        let signals = &input.signals;
        let lead_distance = signals.lead_distance;

        if !signals.dependencies_ready() {
            // steady waiting state, not an abort
            if self.session.phase().is_active() {
                self.reset(WAITING_FOR_DEPENDENCIES, now);
            } else {
                self.session.set_reason(WAITING_FOR_DEPENDENCIES);
            }
            let report = StatusReport::from_session(&self.session, lead_distance, None);
            return self.publish(false, report);
        }

        let Some(telemetry) = input.telemetry.as_ref() else {
            self.abort("Telemetry unavailable", now);
            let report = StatusReport::from_session(&self.session, lead_distance, None);
            return self.publish(false, report);
        };

        self.session.frame = Some(EgoFrame::from_telemetry(telemetry));

        let speed_kph = telemetry.speed_kph();
        let speed_limit_kph = telemetry.speed_limit_kph();

        let previous_lead = self.session.lead_vehicle_id;
        if let Some(id) = signals.lead_vehicle_id {
            self.session.lead_vehicle_id = Some(id);
            self.session.lead_last_seen = Some(now);
        }

        if self.session.lead_vehicle_id.is_some()
            && self.session.lead_vehicle_id != previous_lead
            && self.session.phase().requires_stable_lead()
        {
            self.abort("Lead vehicle changed", now);
            let report = StatusReport::from_session(&self.session, lead_distance, Some(speed_kph));
            return self.publish(false, report);
        }

        let eligibility = check_start_conditions(
            &StartConditions {
                speed_kph,
                speed_limit_kph,
                lead_distance,
                lane_status: &signals.lane_change_status,
                road_type: &signals.road_type,
                next_intersection_distance: signals.next_intersection_distance,
            },
            config,
        );

        let view = TickView {
            now,
            telemetry,
            traffic: input.traffic(),
            lane_status: &signals.lane_change_status,
        };

        match self.session.phase() {
            ManeuverPhase::Idle => match eligibility {
                Ok(()) => {
                    let limit = if speed_limit_kph > 0.0 {
                        speed_limit_kph
                    } else {
                        speed_kph + config.min_speed_delta_kph
                    };
                    info!(
                        "🟡 Overtake initiated: monitoring conditions (lead: {:.1} m, speed: {:.0} km/h, delta: {:.0} km/h)",
                        lead_distance.unwrap_or(-1.0),
                        speed_kph,
                        limit - speed_kph
                    );
                    self.session
                        .set_phase(ManeuverPhase::Monitoring, "Monitoring conditions", now);
                }
                Err(reason) => self.session.set_reason(reason.as_str()),
            },
            ManeuverPhase::Monitoring => match eligibility {
                Ok(()) => self.step_monitoring(config, &view, lead_distance),
                Err(reason) => self.abort(reason.as_str(), now),
            },
            ManeuverPhase::RequestingOut => self.step_requesting_out(config, &view),
            ManeuverPhase::ChangingOut => self.step_changing_out(config, &view),
            ManeuverPhase::Clearing => self.step_clearing(config, &view),
            ManeuverPhase::RequestingReturn => self.step_requesting_return(config, &view),
            ManeuverPhase::Returning => self.step_returning(config, &view),
        }

        let active = self.session.phase().is_active();
        let report = StatusReport::from_session(&self.session, lead_distance, Some(speed_kph));
        self.publish(active, report)
    }

    // ========================================================================
    // PHASE STEPS
    // ========================================================================

    fn step_monitoring(&mut self, config: &OvertakeConfig, view: &TickView<'_>, lead: Option<f64>) {
        if self.session.elapsed(view.now) < config.hold_duration_s {
            self.session.set_reason("Verifying stability");
            return;
        }

        let side = self.session.pass_side;
        let Some(traffic) = view.traffic else {
            self.abort("Traffic data unavailable", view.now);
            return;
        };

        let frame = self.ego_frame(view.telemetry);
        let params = ClearanceParams::from_config(config);
        if !lane_is_clear(side, &frame, view.telemetry.speed_mps, traffic, &params) {
            self.abort("Target lane occupied", view.now);
            return;
        }

        info!(
            "🚀 Starting overtake to {} (lead: {:.1} m, speed: {:.0} km/h)",
            side.as_str(),
            lead.unwrap_or(-1.0),
            view.telemetry.speed_kph()
        );

        self.session.overtaken_vehicle_id = self.session.lead_vehicle_id;
        self.session.original_side = side.opposite();

        self.boost.request_boost(config.boost_steps());
        self.boost.tick(view.now, &mut self.bus);

        self.session.requested_side = Some(side);
        self.request_indicator(side, view.now);
        self.session.observed_execution = false;

        self.metrics.inc(&self.metrics.maneuvers_started);
        self.session.set_phase(
            ManeuverPhase::RequestingOut,
            &format!("Requesting lane change to {}", side.as_str()),
            view.now,
        );
    }

    fn step_requesting_out(&mut self, config: &OvertakeConfig, view: &TickView<'_>) {
        if is_executing(view.lane_status) {
            self.session.observed_execution = true;
            self.session
                .set_phase(ManeuverPhase::ChangingOut, "Lane change started", view.now);
        } else if self.session.elapsed(view.now) > config.request_timeout_s {
            self.abort("Lane change did not start", view.now);
        } else {
            self.session.set_reason("Awaiting lane change start");
            let side = self.session.target_side();
            self.request_indicator(side, view.now);
        }
    }

    fn step_changing_out(&mut self, config: &OvertakeConfig, view: &TickView<'_>) {
        if view.lane_status == LANE_STATUS_IDLE {
            if self.session.observed_execution {
                self.session.set_phase(
                    ManeuverPhase::Clearing,
                    "Waiting for overtaken vehicle clearance",
                    view.now,
                );
            } else {
                self.abort("Lane change cancelled", view.now);
            }
        } else if self.stalled(config, view.now) {
            self.abort("Lane change stalled", view.now);
        } else if is_executing(view.lane_status) {
            self.session.observed_execution = true;
            self.session
                .set_reason(&format!("Executing lane change ({})", view.lane_status));
        } else {
            self.session.set_reason("Waiting for lane change to finish");
        }
    }

    fn step_clearing(&mut self, config: &OvertakeConfig, view: &TickView<'_>) {
        if self.session.elapsed(view.now) > CLEARING_TIMEOUT_S {
            self.abort("Return timeout", view.now);
            return;
        }

        let Some(traffic) = view.traffic else {
            self.session.set_reason("Waiting for traffic data");
            return;
        };

        let frame = self.ego_frame(view.telemetry);
        let overtaken_clear = overtaken_vehicle_clear(
            self.session.overtaken_vehicle_id,
            &frame,
            traffic,
            config.return_clearance_m,
        );
        if !overtaken_clear {
            self.session.set_reason("Waiting for overtaken vehicle to clear");
            return;
        }

        let original = self.session.original_side;
        let params = ClearanceParams::from_config(config);
        if !lane_is_clear(original, &frame, view.telemetry.speed_mps, traffic, &params) {
            self.session.set_reason("Waiting for original lane to clear");
            return;
        }

        self.session.requested_side = Some(original);
        self.request_indicator(original, view.now);
        self.session.observed_execution = false;
        self.session.set_phase(
            ManeuverPhase::RequestingReturn,
            &format!("Requesting return to {}", original.as_str()),
            view.now,
        );
    }

    fn step_requesting_return(&mut self, config: &OvertakeConfig, view: &TickView<'_>) {
        if is_executing(view.lane_status) {
            self.session.observed_execution = true;
            self.session.set_phase(
                ManeuverPhase::Returning,
                "Returning to original lane",
                view.now,
            );
        } else if self.session.elapsed(view.now) > config.request_timeout_s {
            self.abort("Return request timeout", view.now);
        } else {
            self.session.set_reason("Awaiting return lane change start");
            let side = self.session.original_side;
            self.request_indicator(side, view.now);
        }
    }

    fn step_returning(&mut self, config: &OvertakeConfig, view: &TickView<'_>) {
        if view.lane_status == LANE_STATUS_IDLE {
            if self.session.observed_execution {
                info!("✅ Overtake complete");
                self.metrics.inc(&self.metrics.maneuvers_completed);
                self.reset("Overtake complete", view.now);
            } else {
                self.abort("Return cancelled", view.now);
            }
        } else if self.stalled(config, view.now) {
            self.abort("Return stalled", view.now);
        } else if is_executing(view.lane_status) {
            self.session.observed_execution = true;
            self.session
                .set_reason(&format!("Executing return ({})", view.lane_status));
        } else {
            self.session.set_reason("Waiting for return to finish");
        }
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    /// Frame cached for this tick; every projection in the tick shares it.
    fn ego_frame(&self, telemetry: &Telemetry) -> EgoFrame {
        self.session
            .frame
            .unwrap_or_else(|| EgoFrame::from_telemetry(telemetry))
    }

    fn stalled(&self, config: &OvertakeConfig, now: f64) -> bool {
        self.session.elapsed(now) > config.request_timeout_s + LANE_CHANGE_STALL_BUFFER_S
    }

    fn request_indicator(&mut self, side: Side, now: f64) {
        if self.indicator.request(side, now, &mut self.bus) {
            self.metrics.inc(&self.metrics.indicator_pulses);
        }
    }

    /// A maneuver that did not complete as planned.
    fn abort(&mut self, reason: &str, now: f64) {
        if self.session.phase().is_active() {
            warn!(
                "⚠️  Overtake aborted in {}: {}",
                self.session.phase().as_str(),
                reason
            );
            self.metrics.inc(&self.metrics.maneuvers_aborted);
        }
        self.reset(reason, now);
    }

    /// Full reset: back to Idle with all maneuver bookkeeping cleared.
    /// Boost removal converges over the following ticks.
    fn reset(&mut self, reason: &str, now: f64) {
        self.session.set_phase(ManeuverPhase::Idle, reason, now);
        self.session.clear_maneuver();
        self.boost.clear_boost();
        self.boost.tick(now, &mut self.bus);
    }

    fn publish(&mut self, active: bool, report: StatusReport) -> StatusReport {
        if let Err(e) = self.bus.publish(active, &report) {
            error!("Failed to publish overtake status: {}", e);
        }
        report
    }
}
