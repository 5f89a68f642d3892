// src/geometry.rs
//
// World → ego frame projection. The game world uses x/z on the ground
// plane; heading 0° looks down −z.

use crate::types::Telemetry;

/// Ego position plus forward/right unit vectors, computed once per tick so
/// every projection in that tick shares the same frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoFrame {
    pub origin: (f64, f64),
    pub forward: (f64, f64),
    pub right: (f64, f64),
}

impl EgoFrame {
    pub fn new(heading_deg: f64, x: f64, z: f64) -> Self {
        let yaw = normalize_heading(heading_deg).to_radians();
        Self {
            origin: (x, z),
            forward: (-yaw.sin(), -yaw.cos()),
            right: (yaw.cos(), -yaw.sin()),
        }
    }

    pub fn from_telemetry(telemetry: &Telemetry) -> Self {
        Self::new(telemetry.heading_deg, telemetry.x, telemetry.z)
    }

    /// Returns (longitudinal, lateral): positive ahead / positive right.
    pub fn project(&self, x: f64, z: f64) -> (f64, f64) {
        let dx = x - self.origin.0;
        let dz = z - self.origin.1;

        let longitudinal = dx * self.forward.0 + dz * self.forward.1;
        let lateral = dx * self.right.0 + dz * self.right.1;
        (longitudinal, lateral)
    }
}

/// Wraps any heading into [0, 360).
pub fn normalize_heading(heading_deg: f64) -> f64 {
    let wrapped = heading_deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_heading_zero_faces_negative_z() {
        let frame = EgoFrame::new(0.0, 0.0, 0.0);
        let (longi, lat) = frame.project(0.0, -10.0);
        assert!((longi - 10.0).abs() < EPS);
        assert!(lat.abs() < EPS);

        // +x is to the right at heading 0
        let (longi, lat) = frame.project(3.7, 0.0);
        assert!(longi.abs() < EPS);
        assert!((lat - 3.7).abs() < EPS);
    }

    #[test]
    fn test_heading_ninety_faces_negative_x() {
        let frame = EgoFrame::new(90.0, 100.0, 50.0);
        let (longi, lat) = frame.project(80.0, 50.0);
        assert!((longi - 20.0).abs() < EPS);
        assert!(lat.abs() < EPS);

        let (_, lat) = frame.project(100.0, 46.0);
        assert!((lat - 4.0).abs() < EPS);
    }

    #[test]
    fn test_negative_heading_is_normalized() {
        let a = EgoFrame::new(-90.0, 0.0, 0.0);
        let b = EgoFrame::new(270.0, 0.0, 0.0);
        assert!((a.forward.0 - b.forward.0).abs() < EPS);
        assert!((a.forward.1 - b.forward.1).abs() < EPS);
        assert_eq!(normalize_heading(-1e-20), 0.0);
        assert!((normalize_heading(725.0) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_vectors_are_orthonormal() {
        for heading in [0.0, 33.0, 145.5, 271.0] {
            let frame = EgoFrame::new(heading, 0.0, 0.0);
            let dot = frame.forward.0 * frame.right.0 + frame.forward.1 * frame.right.1;
            let norm = frame.forward.0.hypot(frame.forward.1);
            assert!(dot.abs() < EPS);
            assert!((norm - 1.0).abs() < EPS);
        }
    }
}
