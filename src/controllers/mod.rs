pub mod garage_door;

pub use garage_door::{DoorSnapshot, GarageDoorController, RequestOutcome};
