// THEORY:
// The `motion_command` module is the command mapper: a total, pure function from
// a `ControlZone` to one discrete drive command, plus the wire shape the drive
// base expects. Magnitudes are fixed configuration values. They are never scaled
// by how far off-center the target is; there is no proportional control here.

use crate::core_modules::centering::ControlZone;
use serde::{Deserialize, Serialize};

/// Every command goes out with this behavior id in its `T` field.
pub const BEHAVIOR_COMMAND_ID: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpinDirection {
    /// Clockwise, towards a target right of center. Encoded as `-1`.
    Right,
    /// Counter-clockwise, towards a target left of center. Encoded as `+1`.
    Left,
}

impl SpinDirection {
    pub fn sign(self) -> i64 {
        match self {
            SpinDirection::Right => -1,
            SpinDirection::Left => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    Spin(SpinDirection),
    DriveOnHeading(f64),
    BackUp(f64),
    Stop,
}

/// The fixed step sizes used for the linear commands.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommandMagnitudes {
    pub drive_distance: f64,
    pub backup_distance: f64,
}

impl Default for CommandMagnitudes {
    fn default() -> Self {
        Self {
            drive_distance: 0.01,
            backup_distance: 0.01,
        }
    }
}

/// Maps a control zone to its motion command.
pub fn map(zone: ControlZone, magnitudes: &CommandMagnitudes) -> MotionCommand {
    match zone {
        ControlZone::Right => MotionCommand::Spin(SpinDirection::Right),
        ControlZone::Left => MotionCommand::Spin(SpinDirection::Left),
        ControlZone::Forward => MotionCommand::DriveOnHeading(magnitudes.drive_distance),
        ControlZone::Backward => MotionCommand::BackUp(magnitudes.backup_distance),
        ControlZone::Centered => MotionCommand::Stop,
    }
}

/// The `data` field: spin and stop travel as integers, distances as decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandData {
    Integer(i64),
    Decimal(f64),
}

/// One element of the serialized command list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "T")]
    pub behavior: u8,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: CommandData,
}

impl MotionCommand {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            MotionCommand::Spin(_) => "spin",
            MotionCommand::DriveOnHeading(_) => "drive_on_heading",
            MotionCommand::BackUp(_) => "back_up",
            MotionCommand::Stop => "stop",
        }
    }

    pub fn magnitude(&self) -> CommandData {
        match self {
            MotionCommand::Spin(direction) => CommandData::Integer(direction.sign()),
            MotionCommand::DriveOnHeading(distance) | MotionCommand::BackUp(distance) => {
                CommandData::Decimal(*distance)
            }
            MotionCommand::Stop => CommandData::Integer(0),
        }
    }

    pub fn envelope(&self) -> CommandEnvelope {
        CommandEnvelope {
            behavior: BEHAVIOR_COMMAND_ID,
            kind: self.name().to_string(),
            data: self.magnitude(),
        }
    }

    /// Serializes the command as the single-element JSON list the drive base consumes.
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(&[self.envelope()])
    }
}
