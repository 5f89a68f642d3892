// src/status.rs
//
// Read-only status contract published after every tick. Nothing in the
// controller reads these values back.

use crate::maneuver::session::SessionState;
use crate::types::Side;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: String,
    pub reason: String,
    /// UI label, e.g. "Requesting Out - Awaiting lane change start".
    pub text: String,
    pub target_side: Option<Side>,
    pub original_side: Option<Side>,
    pub lead_vehicle_id: Option<i64>,
    pub overtaken_vehicle_id: Option<i64>,
    pub lead_distance: Option<f64>,
    pub speed_kph: Option<f64>,
}

impl StatusReport {
    pub fn from_session(
        session: &SessionState,
        lead_distance: Option<f64>,
        speed_kph: Option<f64>,
    ) -> Self {
        let reason = session.reason().to_string();
        Self {
            state: session.phase().as_str().to_string(),
            text: label(session.phase().title(), &reason),
            reason,
            target_side: Some(session.target_side()),
            original_side: Some(session.original_side),
            lead_vehicle_id: session.lead_vehicle_id,
            overtaken_vehicle_id: session.overtaken_vehicle_id,
            lead_distance,
            speed_kph,
        }
    }

    pub fn disabled() -> Self {
        Self {
            state: "Disabled".to_string(),
            reason: "Disabled".to_string(),
            text: "Disabled".to_string(),
            target_side: None,
            original_side: None,
            lead_vehicle_id: None,
            overtaken_vehicle_id: None,
            lead_distance: None,
            speed_kph: None,
        }
    }

    /// Host UI label: "<Phase Title> - <reason>".
    pub fn display_text(&self) -> &str {
        &self.text
    }
}

fn label(title: &str, reason: &str) -> String {
    if reason.is_empty() {
        title.to_string()
    } else {
        format!("{} - {}", title, reason)
    }
}

/// Receives the active flag and the structured report.
pub trait StatusSink {
    fn publish(&mut self, active: bool, report: &StatusReport) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ManeuverPhase;

    #[test]
    fn test_display_text() {
        assert_eq!(label("Idle", ""), "Idle");

        let mut session = SessionState::new(0.0);
        session.set_phase(ManeuverPhase::RequestingOut, "Awaiting lane change start", 1.0);
        let report = StatusReport::from_session(&session, None, None);
        assert_eq!(
            report.display_text(),
            "Requesting Out - Awaiting lane change start"
        );
        assert_eq!(StatusReport::disabled().display_text(), "Disabled");
    }

    #[test]
    fn test_report_uses_camel_case_keys() {
        let session = SessionState::new(0.0);
        let report = StatusReport::from_session(&session, Some(22.5), Some(80.0));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["state"], "IDLE");
        assert_eq!(json["targetSide"], "left");
        assert_eq!(json["originalSide"], "right");
        assert_eq!(json["leadDistance"], 22.5);
        assert_eq!(json["speedKph"], 80.0);
        assert!(json["overtakenVehicleId"].is_null());
    }

    #[test]
    fn test_disabled_report() {
        let report = StatusReport::disabled();
        assert_eq!(report.state, "Disabled");
        assert_eq!(report.reason, "Disabled");
        assert!(report.target_side.is_none());
    }
}
