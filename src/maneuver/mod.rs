// src/maneuver/mod.rs
//
// Overtake maneuver orchestration.
//
// Phase flow:
//   Idle → Monitoring → RequestingOut → ChangingOut → Clearing
//        → RequestingReturn → Returning → Idle
//
// Every failure path funnels through a full reset back to Idle.

pub mod controller;
pub mod eligibility;
pub mod session;
pub mod takeover;

pub use controller::OvertakeController;
pub use eligibility::{check_start_conditions, BlockReason, StartConditions};
pub use session::SessionState;
pub use takeover::TakeoverHandle;
