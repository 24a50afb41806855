//! Individual movement steps

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Facing, HexCoord};

/// Sideways aerospace maneuvers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maneuver {
    SideSlipLeft,
    SideSlipRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    GetUp,
    StartJump,
    Accelerate,
    Decelerate,
    Maneuver(Maneuver),
    FlyOff,
}

/// Steps tried from every ground state
pub const GROUND_STEPS: [StepType; 5] = [
    StepType::Forward,
    StepType::Backward,
    StepType::TurnLeft,
    StepType::TurnRight,
    StepType::GetUp,
];

/// Steps tried from every airborne state
pub const AIRBORNE_STEPS: [StepType; 8] = [
    StepType::Accelerate,
    StepType::Decelerate,
    StepType::Forward,
    StepType::TurnLeft,
    StepType::TurnRight,
    StepType::Maneuver(Maneuver::SideSlipLeft),
    StepType::Maneuver(Maneuver::SideSlipRight),
    StepType::FlyOff,
];

impl StepType {
    /// Does the step change the hex the unit stands in?
    pub fn changes_hex(&self) -> bool {
        matches!(
            self,
            StepType::Forward | StepType::Backward | StepType::Maneuver(_)
        )
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            StepType::Forward => "F",
            StepType::Backward => "B",
            StepType::TurnLeft => "L",
            StepType::TurnRight => "R",
            StepType::GetUp => "UP",
            StepType::StartJump => "J",
            StepType::Accelerate => "ACC",
            StepType::Decelerate => "DEC",
            StepType::Maneuver(Maneuver::SideSlipLeft) => "SSL",
            StepType::Maneuver(Maneuver::SideSlipRight) => "SSR",
            StepType::FlyOff => "OFF",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A step with the position, facing and cumulative MP after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveStep {
    pub step_type: StepType,
    pub position: HexCoord,
    pub facing: Facing,
    pub mp_used: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_changing_steps() {
        assert!(StepType::Forward.changes_hex());
        assert!(StepType::Maneuver(Maneuver::SideSlipLeft).changes_hex());
        assert!(!StepType::TurnLeft.changes_hex());
        assert!(!StepType::FlyOff.changes_hex());
    }

    #[test]
    fn test_step_names_are_unique() {
        let mut names: Vec<&str> = GROUND_STEPS
            .iter()
            .chain(AIRBORNE_STEPS.iter())
            .map(|s| s.short_name())
            .collect();
        names.sort();
        names.dedup();
        // TurnLeft, TurnRight and Forward appear in both lists
        assert_eq!(names.len(), GROUND_STEPS.len() + AIRBORNE_STEPS.len() - 3);
    }
}
