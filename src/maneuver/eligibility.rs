// src/maneuver/eligibility.rs
//
// Ordered start conditions. The first failing check names the reason,
// so the order below is part of the contract.

use crate::config::OvertakeConfig;
use crate::signals::LANE_STATUS_IDLE;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartConditions<'a> {
    pub speed_kph: f64,
    /// 0.0 when unknown.
    pub speed_limit_kph: f64,
    pub lead_distance: Option<f64>,
    pub lane_status: &'a str,
    pub road_type: &'a str,
    pub next_intersection_distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    LaneChangeActive,
    NoLeadVehicle,
    LeadTooFar,
    SpeedTooLow,
    SpeedDeltaTooSmall,
    NotHighway,
    IntersectionTooClose,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LaneChangeActive => "Lane change already active",
            Self::NoLeadVehicle => "No vehicle in front",
            Self::LeadTooFar => "Lead vehicle too far",
            Self::SpeedTooLow => "Speed below threshold",
            Self::SpeedDeltaTooSmall => "Speed delta too small",
            Self::NotHighway => "Road not marked as highway",
            Self::IntersectionTooClose => "Intersection too close",
        }
    }
}

pub fn check_start_conditions(
    c: &StartConditions<'_>,
    config: &OvertakeConfig,
) -> Result<(), BlockReason> {
    if c.lane_status != LANE_STATUS_IDLE {
        return Err(BlockReason::LaneChangeActive);
    }

    let lead_distance = match c.lead_distance {
        Some(d) if d > 0.0 => d,
        _ => return Err(BlockReason::NoLeadVehicle),
    };

    if lead_distance > config.max_lead_distance_m {
        return Err(BlockReason::LeadTooFar);
    }

    if c.speed_kph < config.min_speed_kph {
        return Err(BlockReason::SpeedTooLow);
    }

    if c.speed_limit_kph > 0.0 && c.speed_limit_kph - c.speed_kph < config.min_speed_delta_kph {
        return Err(BlockReason::SpeedDeltaTooSmall);
    }

    if config.require_highway && c.road_type != "highway" {
        return Err(BlockReason::NotHighway);
    }

    if let Some(distance) = c.next_intersection_distance {
        if distance > 0.0 && distance < config.intersection_buffer_m {
            return Err(BlockReason::IntersectionTooClose);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorable() -> StartConditions<'static> {
        StartConditions {
            speed_kph: 80.0,
            speed_limit_kph: 100.0,
            lead_distance: Some(25.0),
            lane_status: "idle",
            road_type: "highway",
            next_intersection_distance: None,
        }
    }

    #[test]
    fn test_favorable_conditions_eligible() {
        assert_eq!(
            check_start_conditions(&favorable(), &OvertakeConfig::default()),
            Ok(())
        );
    }

    #[test]
    fn test_active_lane_change_takes_precedence() {
        // everything else fails too; the lane status still wins
        let c = StartConditions {
            lane_status: "executing_left",
            lead_distance: None,
            speed_kph: 10.0,
            road_type: "city",
            ..favorable()
        };
        assert_eq!(
            check_start_conditions(&c, &OvertakeConfig::default()),
            Err(BlockReason::LaneChangeActive)
        );
        assert_eq!(BlockReason::LaneChangeActive.as_str(), "Lane change already active");
    }

    #[test]
    fn test_lead_distance_checks() {
        let config = OvertakeConfig::default();
        for d in [None, Some(0.0), Some(-3.0)] {
            let c = StartConditions {
                lead_distance: d,
                ..favorable()
            };
            assert_eq!(check_start_conditions(&c, &config), Err(BlockReason::NoLeadVehicle));
        }

        let c = StartConditions {
            lead_distance: Some(40.5),
            ..favorable()
        };
        assert_eq!(check_start_conditions(&c, &config), Err(BlockReason::LeadTooFar));

        let c = StartConditions {
            lead_distance: Some(40.0),
            ..favorable()
        };
        assert_eq!(check_start_conditions(&c, &config), Ok(()));
    }

    #[test]
    fn test_speed_checks() {
        let config = OvertakeConfig::default();

        let slow = StartConditions {
            speed_kph: 44.9,
            ..favorable()
        };
        assert_eq!(check_start_conditions(&slow, &config), Err(BlockReason::SpeedTooLow));

        let tight = StartConditions {
            speed_limit_kph: 90.0,
            ..favorable()
        };
        assert_eq!(
            check_start_conditions(&tight, &config),
            Err(BlockReason::SpeedDeltaTooSmall)
        );

        // unknown limit never blocks on delta
        let unknown = StartConditions {
            speed_limit_kph: 0.0,
            ..favorable()
        };
        assert_eq!(check_start_conditions(&unknown, &config), Ok(()));
    }

    #[test]
    fn test_highway_requirement() {
        let c = StartConditions {
            road_type: "none",
            ..favorable()
        };
        assert_eq!(
            check_start_conditions(&c, &OvertakeConfig::default()),
            Err(BlockReason::NotHighway)
        );

        let relaxed = OvertakeConfig {
            require_highway: false,
            ..OvertakeConfig::default()
        };
        assert_eq!(check_start_conditions(&c, &relaxed), Ok(()));
    }

    #[test]
    fn test_intersection_buffer() {
        let config = OvertakeConfig::default();
        let near = StartConditions {
            next_intersection_distance: Some(120.0),
            ..favorable()
        };
        assert_eq!(
            check_start_conditions(&near, &config),
            Err(BlockReason::IntersectionTooClose)
        );

        for d in [Some(0.0), Some(150.0), Some(900.0)] {
            let c = StartConditions {
                next_intersection_distance: d,
                ..favorable()
            };
            assert_eq!(check_start_conditions(&c, &config), Ok(()));
        }
    }
}
