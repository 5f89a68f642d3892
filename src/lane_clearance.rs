// src/lane_clearance.rs
//
// Adjacent-lane occupancy checks in the ego frame.
//
// A lane is a band centred ±lane_width to the side of the ego vehicle.
// A vehicle occupies it when its longitudinal offset lies inside
// [-rear, front] and its lateral offset is within 0.75 × lane_width of
// the band centre.

use crate::config::{OvertakeConfig, LANE_TOLERANCE_FACTOR};
use crate::geometry::EgoFrame;
use crate::types::{Side, Vehicle};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub struct ClearanceParams {
    pub lane_width_m: f64,
    pub front_m: f64,
    /// Minimum rear clearance; the effective value may grow with speed.
    pub rear_m: f64,
    /// `Some(time_gap_s)` enables speed-dependent rear clearance.
    pub dynamic_rear_gap_s: Option<f64>,
}

impl ClearanceParams {
    /// Standard lane-check parameters from the config, with dynamic rear
    /// clearance enabled.
    pub fn from_config(config: &OvertakeConfig) -> Self {
        Self {
            lane_width_m: config.lane_width_m,
            front_m: config.lane_clear_front_m,
            rear_m: config.lane_clear_rear_m,
            dynamic_rear_gap_s: Some(config.rear_time_gap_s),
        }
    }

    pub fn effective_rear_m(&self, speed_mps: f64) -> f64 {
        match self.dynamic_rear_gap_s {
            Some(gap_s) => safe_rear_clearance(self.rear_m, speed_mps, gap_s),
            None => self.rear_m,
        }
    }
}

/// Faster ego speed demands proportionally more trailing room.
pub fn safe_rear_clearance(minimum_m: f64, speed_mps: f64, time_gap_s: f64) -> f64 {
    minimum_m.max(speed_mps * time_gap_s)
}

/// True when no counted vehicle sits in the lane on `side`.
pub fn lane_is_clear(
    side: Side,
    frame: &EgoFrame,
    speed_mps: f64,
    traffic: &[Vehicle],
    params: &ClearanceParams,
) -> bool {
    if traffic.is_empty() {
        return true;
    }

    let rear_m = params.effective_rear_m(speed_mps);
    let lane_center = match side {
        Side::Right => params.lane_width_m,
        Side::Left => -params.lane_width_m,
    };
    let tolerance = params.lane_width_m * LANE_TOLERANCE_FACTOR;

    for vehicle in traffic {
        if !vehicle.counts_for_clearance() {
            continue;
        }

        let (longi, lateral) = frame.project(vehicle.x, vehicle.z);

        if longi > params.front_m || longi < -rear_m {
            continue;
        }

        if (lateral - lane_center).abs() > tolerance {
            continue;
        }

        debug!(
            "Lane {} occupied by #{} at {:.1} m / {:+.1} m",
            side.as_str(),
            vehicle.id,
            longi,
            lateral
        );
        return false;
    }

    true
}

/// The overtaken vehicle is clear once it is more than `min_rear_m`
/// behind us, or when it is no longer in the snapshot at all.
pub fn overtaken_vehicle_clear(
    overtaken_id: Option<i64>,
    frame: &EgoFrame,
    traffic: &[Vehicle],
    min_rear_m: f64,
) -> bool {
    let Some(id) = overtaken_id else {
        return true;
    };

    let Some(vehicle) = traffic.iter().find(|v| v.id == id) else {
        return true;
    };

    let (longi, _) = frame.project(vehicle.x, vehicle.z);
    longi < 0.0 && longi.abs() > min_rear_m
}

#[cfg(test)]
mod tests {
    use super::*;

    // Heading 0 → forward is −z, right is +x.
    fn frame() -> EgoFrame {
        EgoFrame::new(0.0, 0.0, 0.0)
    }

    /// Vehicle at `longi` metres ahead and `lateral` metres right.
    fn at(id: i64, longi: f64, lateral: f64) -> Vehicle {
        Vehicle::new(id, lateral, -longi)
    }

    fn params(front: f64, rear: f64) -> ClearanceParams {
        ClearanceParams {
            lane_width_m: 3.7,
            front_m: front,
            rear_m: rear,
            dynamic_rear_gap_s: None,
        }
    }

    #[test]
    fn test_empty_traffic_is_clear() {
        assert!(lane_is_clear(Side::Left, &frame(), 30.0, &[], &params(55.0, 20.0)));
    }

    #[test]
    fn test_vehicle_in_left_lane_blocks_left_only() {
        let traffic = vec![at(1, 10.0, -3.7)];
        assert!(!lane_is_clear(Side::Left, &frame(), 20.0, &traffic, &params(55.0, 20.0)));
        assert!(lane_is_clear(Side::Right, &frame(), 20.0, &traffic, &params(55.0, 20.0)));
    }

    #[test]
    fn test_own_lane_vehicle_ignored() {
        let traffic = vec![at(1, 15.0, 0.0)];
        assert!(lane_is_clear(Side::Left, &frame(), 20.0, &traffic, &params(55.0, 20.0)));
    }

    #[test]
    fn test_lateral_tolerance_boundary() {
        // tolerance = 0.75 * 3.7 = 2.775
        let inside = vec![at(1, 5.0, -3.7 + 2.7)];
        let outside = vec![at(1, 5.0, -3.7 + 2.8)];
        assert!(!lane_is_clear(Side::Left, &frame(), 0.0, &inside, &params(55.0, 20.0)));
        assert!(lane_is_clear(Side::Left, &frame(), 0.0, &outside, &params(55.0, 20.0)));
    }

    #[test]
    fn test_longitudinal_window() {
        let p = params(55.0, 20.0);
        assert!(lane_is_clear(Side::Left, &frame(), 0.0, &[at(1, 60.0, -3.7)], &p));
        assert!(lane_is_clear(Side::Left, &frame(), 0.0, &[at(1, -25.0, -3.7)], &p));
        assert!(!lane_is_clear(Side::Left, &frame(), 0.0, &[at(1, -19.0, -3.7)], &p));
    }

    #[test]
    fn test_trailers_and_temporary_entities_skipped() {
        let mut trailer = at(1, 5.0, -3.7);
        trailer.is_trailer = true;
        let mut temp = at(2, 5.0, -3.7);
        temp.is_temporary = true;
        assert!(lane_is_clear(
            Side::Left,
            &frame(),
            0.0,
            &[trailer, temp],
            &params(55.0, 20.0)
        ));
    }

    #[test]
    fn test_dynamic_rear_clearance_grows_with_speed() {
        let mut p = params(55.0, 20.0);
        p.dynamic_rear_gap_s = Some(2.5);
        let traffic = vec![at(1, -40.0, -3.7)];

        // 10 m/s → max(20, 25) = 25 m: vehicle 40 m behind is outside
        assert!(lane_is_clear(Side::Left, &frame(), 10.0, &traffic, &p));
        // 25 m/s → 62.5 m: vehicle 40 m behind now counts
        assert!(!lane_is_clear(Side::Left, &frame(), 25.0, &traffic, &p));
        assert_eq!(p.effective_rear_m(2.0), 20.0);
    }

    #[test]
    fn test_clearance_monotonic_in_window_size() {
        let traffic = vec![at(1, 30.0, -3.7), at(2, -12.0, 3.7), at(3, 70.0, -3.5)];

        for side in [Side::Left, Side::Right] {
            let mut previously_clear = false;
            for step in (0..12).rev() {
                let size = 5.0 + step as f64 * 8.0;
                let clear = lane_is_clear(side, &frame(), 0.0, &traffic, &params(size, size));
                // shrinking the window never turns a clear lane into occupied
                assert!(!previously_clear || clear, "side {:?} size {}", side, size);
                previously_clear = clear;
            }
        }
    }

    #[test]
    fn test_overtaken_vehicle_clear() {
        let f = frame();
        assert!(overtaken_vehicle_clear(None, &f, &[], 30.0));
        assert!(overtaken_vehicle_clear(Some(9), &f, &[at(1, 0.0, 0.0)], 30.0));
        assert!(overtaken_vehicle_clear(Some(9), &f, &[at(9, -50.0, 3.7)], 30.0));
        assert!(!overtaken_vehicle_clear(Some(9), &f, &[at(9, -20.0, 3.7)], 30.0));
        assert!(!overtaken_vehicle_clear(Some(9), &f, &[at(9, 10.0, 3.7)], 30.0));
    }
}
