// src/types.rs

use serde::{Deserialize, Serialize};

// ============================================================================
// SIDES
// ============================================================================

/// Lateral side relative to the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Configured passing side, as exposed by the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PreferredSide {
    #[default]
    PassLeft,
    PassRight,
}

impl PreferredSide {
    pub fn side(self) -> Side {
        match self {
            PreferredSide::PassLeft => Side::Left,
            PreferredSide::PassRight => Side::Right,
        }
    }
}

// ============================================================================
// WORLD STATE
// ============================================================================

/// One entity from the traffic snapshot, in world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub x: f64,
    pub z: f64,
    #[serde(default)]
    pub is_trailer: bool,
    #[serde(default, alias = "is_tmp")]
    pub is_temporary: bool,
}

impl Vehicle {
    pub fn new(id: i64, x: f64, z: f64) -> Self {
        Self {
            id,
            x,
            z,
            is_trailer: false,
            is_temporary: false,
        }
    }

    /// Trailers and temporary entities never occupy a lane for clearance purposes.
    pub fn counts_for_clearance(&self) -> bool {
        !self.is_trailer && !self.is_temporary
    }
}

/// Ego telemetry sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Heading in degrees; any value is accepted and normalized to [0, 360).
    pub heading_deg: f64,
    pub x: f64,
    pub z: f64,
    pub speed_mps: f64,
    /// 0.0 when no limit is known.
    #[serde(default)]
    pub speed_limit_mps: f64,
}

impl Telemetry {
    pub fn speed_kph(&self) -> f64 {
        self.speed_mps * 3.6
    }

    pub fn speed_limit_kph(&self) -> f64 {
        self.speed_limit_mps * 3.6
    }
}

// ============================================================================
// MANEUVER PHASE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManeuverPhase {
    Idle,
    Monitoring,
    RequestingOut,
    ChangingOut,
    Clearing,
    RequestingReturn,
    Returning,
}

impl ManeuverPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Monitoring => "MONITORING",
            Self::RequestingOut => "REQUESTING_OUT",
            Self::ChangingOut => "CHANGING_OUT",
            Self::Clearing => "CLEARING",
            Self::RequestingReturn => "REQUESTING_RETURN",
            Self::Returning => "RETURNING",
        }
    }

    /// Human label used by the host UI ("Requesting Out").
    pub fn title(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Monitoring => "Monitoring",
            Self::RequestingOut => "Requesting Out",
            Self::ChangingOut => "Changing Out",
            Self::Clearing => "Clearing",
            Self::RequestingReturn => "Requesting Return",
            Self::Returning => "Returning",
        }
    }

    pub fn is_active(&self) -> bool {
        *self != Self::Idle
    }

    /// Phases in which a change of lead vehicle invalidates the maneuver.
    pub fn requires_stable_lead(&self) -> bool {
        matches!(self, Self::Monitoring | Self::RequestingOut)
    }
}
