//! # Garage Door State Enums

//! This module defines the enums describing where a simulated garage door is and where it has been told to go.
//! Numeric values follow the host platform's door characteristic encoding, so a raw value received from the
//! host layer can be converted with `TryFrom<u8>`.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use derive_more::{Display, FromStr};

/// The real-time position of the door.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, FromStr, Display)]
pub enum CurrentDoorState {
    /// The door is fully open.
    Open,
    /// The door is fully closed.
    Closed,
    /// The door is travelling towards open.
    Opening,
    /// The door is travelling towards closed.
    Closing,
}

impl CurrentDoorState {
    /// The host characteristic value for this state
    pub fn as_u8(self) -> u8 {
        match self {
            CurrentDoorState::Open => 0,
            CurrentDoorState::Closed => 1,
            CurrentDoorState::Opening => 2,
            CurrentDoorState::Closing => 3,
        }
    }

    /// Whether this is a terminal position rather than a travel stage
    pub fn is_settled(self) -> bool {
        matches!(self, CurrentDoorState::Open | CurrentDoorState::Closed)
    }
}

impl From<TargetDoorState> for CurrentDoorState {
    fn from(target: TargetDoorState) -> Self {
        match target {
            TargetDoorState::Open => CurrentDoorState::Open,
            TargetDoorState::Closed => CurrentDoorState::Closed,
        }
    }
}

/// The commanded end position of the door.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, FromStr, Display)]
pub enum TargetDoorState {
    /// The door has been told to open.
    Open,
    /// The door has been told to close.
    Closed,
}

impl TargetDoorState {
    /// The host characteristic value for this state
    pub fn as_u8(self) -> u8 {
        match self {
            TargetDoorState::Open => 0,
            TargetDoorState::Closed => 1,
        }
    }

    /// The value written to the persistence backend once this target has settled
    pub fn persisted_value(self) -> bool {
        matches!(self, TargetDoorState::Open)
    }
}

impl TryFrom<u8> for TargetDoorState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TargetDoorState::Open),
            1 => Ok(TargetDoorState::Closed),
            other => Err(other),
        }
    }
}

/// Selects which current state is reported while the door is travelling.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Serialize, Deserialize, Default)]
pub enum TravelReporting {
    /// Report the settled state the door is leaving (CLOSED while opening, OPEN while closing)
    #[default]
    SourceState,
    /// Report OPENING / CLOSING while the door is travelling
    TravelStates,
}

impl TravelReporting {
    /// The current state shown while the door travels towards `target`
    pub fn in_transit(self, target: TargetDoorState) -> CurrentDoorState {
        match (self, target) {
            (TravelReporting::SourceState, TargetDoorState::Open) => CurrentDoorState::Closed,
            (TravelReporting::SourceState, TargetDoorState::Closed) => CurrentDoorState::Open,
            (TravelReporting::TravelStates, TargetDoorState::Open) => CurrentDoorState::Opening,
            (TravelReporting::TravelStates, TargetDoorState::Closed) => CurrentDoorState::Closing,
        }
    }
}

/// What happens once an opening sequence has settled OPEN.
#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum PostOpenAction {
    /// The door stays open until told otherwise
    #[default]
    None,
    /// After the delay the target reverts to CLOSED; the current state is left alone
    RevertTarget(Duration),
    /// After the delay the controller runs the closing sequence itself
    AutoClose(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_target_values() {
        assert_eq!(TargetDoorState::try_from(0), Ok(TargetDoorState::Open));
        assert_eq!(TargetDoorState::try_from(1), Ok(TargetDoorState::Closed));
        assert_eq!(TargetDoorState::try_from(4), Err(4));
    }

    #[test]
    fn transit_states_follow_reporting_mode() {
        assert_eq!(TravelReporting::SourceState.in_transit(TargetDoorState::Open), CurrentDoorState::Closed);
        assert_eq!(TravelReporting::TravelStates.in_transit(TargetDoorState::Closed), CurrentDoorState::Closing);
        assert!(!CurrentDoorState::Opening.is_settled());
    }
}
