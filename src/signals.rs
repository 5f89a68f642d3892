// src/signals.rs
//
// Defensive decoding of the host's tag map and traffic list. Nothing here
// fails: malformed data degrades to the conservative default and is
// reported once per tag.

use crate::types::{Telemetry, Vehicle};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const LANE_STATUS_IDLE: &str = "idle";

/// The executor reports "executing", "executing_left", ... while a lane
/// change is in progress.
pub fn is_executing(status: &str) -> bool {
    status.starts_with("executing")
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSignals {
    pub map_ready: bool,
    pub acc_ready: bool,
    pub lane_change_status: String,
    pub road_type: String,
    pub next_intersection_distance: Option<f64>,
    pub lead_distance: Option<f64>,
    pub lead_vehicle_id: Option<i64>,
}

impl Default for ExternalSignals {
    fn default() -> Self {
        Self {
            map_ready: false,
            acc_ready: false,
            lane_change_status: LANE_STATUS_IDLE.to_string(),
            road_type: "none".to_string(),
            next_intersection_distance: None,
            lead_distance: None,
            lead_vehicle_id: None,
        }
    }
}

impl ExternalSignals {
    pub fn dependencies_ready(&self) -> bool {
        self.map_ready && self.acc_ready
    }
}

/// Host-style truthiness: false, 0, "", [], {} and null are all false.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[derive(Debug, Default)]
pub struct TagReader {
    warned: HashSet<String>,
}

impl TagReader {
    pub fn new() -> Self {
        Self::default()
    }

    fn warn_once(&mut self, key: &str, detail: &str) {
        if self.warned.insert(key.to_string()) {
            warn!("Ignoring malformed '{}': {}", key, detail);
        } else {
            debug!("Ignoring malformed '{}': {}", key, detail);
        }
    }

    pub fn read_signals(&mut self, tags: &Value) -> ExternalSignals {
        let mut signals = ExternalSignals::default();

        let tags = match tags {
            Value::Object(map) => map,
            Value::Null => return signals,
            other => {
                self.warn_once("tags", &format!("expected object, got {}", kind(other)));
                return signals;
            }
        };

        match tags.get("status") {
            Some(Value::Object(status)) => {
                signals.map_ready = truthy(status.get("Map"));
                signals.acc_ready = truthy(status.get("AdaptiveCruiseControl"));
            }
            None | Some(Value::Null) => {}
            Some(other) => {
                self.warn_once("status", &format!("expected object, got {}", kind(other)))
            }
        }

        signals.lane_change_status = match tags.get("lane_change_status") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            None | Some(Value::Null) | Some(Value::String(_)) => LANE_STATUS_IDLE.to_string(),
            Some(other) => other.to_string(),
        };

        signals.road_type = match tags.get("road_type") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => "none".to_string(),
        };

        signals.next_intersection_distance =
            self.read_number(tags, "next_intersection_distance");
        signals.lead_distance = self.read_number(tags, "vehicle_in_front_distance");

        signals.lead_vehicle_id = match tags.get("vehicle_highlights") {
            Some(Value::Array(ids)) => ids.first().and_then(Value::as_i64),
            None | Some(Value::Null) => None,
            Some(other) => {
                self.warn_once(
                    "vehicle_highlights",
                    &format!("expected array, got {}", kind(other)),
                );
                None
            }
        };

        signals
    }

    fn read_number(&mut self, tags: &Map<String, Value>, key: &str) -> Option<f64> {
        match tags.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(other) => {
                self.warn_once(key, &format!("expected number, got {}", kind(other)));
                None
            }
        }
    }

    /// `None` means the traffic source is unavailable, as opposed to an
    /// empty road.
    pub fn read_traffic(&mut self, traffic: &Value) -> Option<Vec<Vehicle>> {
        let entries = match traffic {
            Value::Array(entries) => entries,
            Value::Null => {
                self.warn_once("traffic", "traffic data unavailable");
                return None;
            }
            other => {
                self.warn_once("traffic", &format!("expected array, got {}", kind(other)));
                return None;
            }
        };

        let mut vehicles = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<Vehicle>(entry.clone()) {
                Ok(vehicle) => vehicles.push(vehicle),
                Err(e) => debug!("Skipping malformed traffic entry: {}", e),
            }
        }
        Some(vehicles)
    }

    pub fn read_telemetry(&mut self, telemetry: &Value) -> Option<Telemetry> {
        if telemetry.is_null() {
            return None;
        }

        match serde_json::from_value::<Telemetry>(telemetry.clone()) {
            Ok(t) => Some(t),
            Err(e) => {
                self.warn_once("telemetry", &e.to_string());
                None
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_tag_map() {
        let mut reader = TagReader::new();
        let signals = reader.read_signals(&json!({
            "status": {"Map": true, "AdaptiveCruiseControl": true},
            "lane_change_status": "executing_left",
            "road_type": "highway",
            "next_intersection_distance": 420.0,
            "vehicle_in_front_distance": 25,
            "vehicle_highlights": [1234, 99],
        }));

        assert!(signals.dependencies_ready());
        assert!(is_executing(&signals.lane_change_status));
        assert_eq!(signals.road_type, "highway");
        assert_eq!(signals.next_intersection_distance, Some(420.0));
        assert_eq!(signals.lead_distance, Some(25.0));
        assert_eq!(signals.lead_vehicle_id, Some(1234));
    }

    #[test]
    fn test_missing_tags_fall_back_to_defaults() {
        let mut reader = TagReader::new();
        let signals = reader.read_signals(&json!({}));
        assert_eq!(signals, ExternalSignals::default());
        assert!(!signals.dependencies_ready());
        assert_eq!(signals.lane_change_status, "idle");
    }

    #[test]
    fn test_malformed_values_coerced() {
        let mut reader = TagReader::new();
        let signals = reader.read_signals(&json!({
            "status": ["Map"],
            "lane_change_status": "",
            "vehicle_in_front_distance": "close",
            "vehicle_highlights": [12.5],
        }));

        assert!(!signals.map_ready);
        assert_eq!(signals.lane_change_status, "idle");
        assert_eq!(signals.lead_distance, None);
        assert_eq!(signals.lead_vehicle_id, None);
        assert!(reader.warned.contains("status"));
        assert!(reader.warned.contains("vehicle_in_front_distance"));
    }

    #[test]
    fn test_non_object_tags() {
        let mut reader = TagReader::new();
        assert_eq!(reader.read_signals(&json!("oops")), ExternalSignals::default());
        assert!(reader.warned.contains("tags"));
    }

    #[test]
    fn test_truthiness() {
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(truthy(Some(&json!("yes"))));
        assert!(!truthy(None));
    }

    #[test]
    fn test_traffic_decoding() {
        let mut reader = TagReader::new();
        let traffic = reader
            .read_traffic(&json!([
                {"id": 1, "x": 1.0, "z": 2.0},
                {"id": "bad"},
                {"id": 3, "x": 0.0, "z": 0.0, "is_trailer": true},
            ]))
            .unwrap();

        assert_eq!(traffic.len(), 2);
        assert!(traffic[1].is_trailer);

        assert_eq!(reader.read_traffic(&json!({"id": 1})), None);
        assert_eq!(reader.read_traffic(&Value::Null), None);
        assert_eq!(reader.read_traffic(&json!([])), Some(vec![]));
    }

    #[test]
    fn test_telemetry_decoding() {
        let mut reader = TagReader::new();
        let t = reader
            .read_telemetry(&json!({"heading_deg": 90.0, "x": 1.0, "z": 2.0, "speed_mps": 20.0}))
            .unwrap();
        assert_eq!(t.speed_limit_mps, 0.0);
        assert!(reader.read_telemetry(&json!({"x": 1.0})).is_none());
        assert!(reader.read_telemetry(&Value::Null).is_none());
    }
}
