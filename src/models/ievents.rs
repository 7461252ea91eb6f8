//! # Garage Door Event Definitions

//! This module defines the `DoorEvent` enum pushed from the door controller to the host layer.
//! The host forwards these to whatever it reports externally.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use derive_more::Display;
use crate::models::istates::{CurrentDoorState, TargetDoorState};

/// Represents the notifications emitted by a garage door controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DoorEvent {
    /// The door's real-time position was set
    CurrentStateChanged(CurrentStateChangedEvent),
    /// The door's commanded end position was set
    TargetStateChanged(TargetStateChangedEvent),
}

impl DoorEvent {
    /// Retrieves the name of the door associated with the event
    pub fn get_door_name(&self) -> &str {
        match self {
            DoorEvent::CurrentStateChanged(e) => &e.door_name,
            DoorEvent::TargetStateChanged(e) => &e.door_name,
        }
    }
}

/// What caused a target state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum ChangeSource {
    /// A target state request issued by the host layer
    HostRequest,
    /// The open stage expired and the target reverted to closed
    AutoRevert,
    /// The auto-close delay expired and the controller closed the door itself
    AutoClose,
}

/// Represents a change of the door's current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStateChangedEvent {
    /// The name of the door
    pub door_name: String,
    /// The current state before the change
    pub old_state: CurrentDoorState,
    /// The current state after the change
    pub new_state: CurrentDoorState,
    /// When the change happened
    pub timestamp: NaiveDateTime,
}

/// Represents a change of the door's target state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStateChangedEvent {
    /// The name of the door
    pub door_name: String,
    /// The target state before the change
    pub old_state: TargetDoorState,
    /// The target state after the change
    pub new_state: TargetDoorState,
    /// What caused the change
    pub source: ChangeSource,
    /// When the change happened
    pub timestamp: NaiveDateTime,
}
