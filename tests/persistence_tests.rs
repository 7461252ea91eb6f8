use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use iqx_garagedoor::config::DoorSettings;
use iqx_garagedoor::controllers::GarageDoorController;
use iqx_garagedoor::models::{CurrentDoorState, TargetDoorState};
use iqx_garagedoor::repositories::{FileStateRepository, StateStore};
use iqx_garagedoor::state_management::RecordingSink;

fn create_door(dir: &TempDir) -> GarageDoorController {
    let store = FileStateRepository::open(dir.path()).unwrap();
    let mut settings = DoorSettings::named("Dummy Garage");
    settings.closing_state_duration = Duration::from_secs(1);
    GarageDoorController::new(settings, Arc::new(store), Arc::new(RecordingSink::new()))
}

#[test]
fn test_closed_door_stays_closed_across_restart() {
    let dir = TempDir::new().unwrap();

    let mut door = create_door(&dir);
    assert_eq!(door.current_state(), CurrentDoorState::Open);
    door.request_target_state(1);
    door.advance_by(Duration::from_secs(1));
    assert_eq!(door.current_state(), CurrentDoorState::Closed);
    drop(door);

    let restarted = create_door(&dir);
    assert_eq!(restarted.current_state(), CurrentDoorState::Closed);
    assert_eq!(restarted.target_state(), TargetDoorState::Closed);
}

#[test]
fn test_unsettled_close_is_not_persisted() {
    let dir = TempDir::new().unwrap();

    let mut door = create_door(&dir);
    door.request_target_state(1);
    door.advance_by(Duration::from_millis(500));
    drop(door);

    let restarted = create_door(&dir);
    assert_eq!(restarted.current_state(), CurrentDoorState::Open);
}

#[test]
fn test_corrupt_state_file_starts_open() {
    let dir = TempDir::new().unwrap();
    let store = FileStateRepository::open(dir.path()).unwrap();
    std::fs::write(store.record_path("Dummy Garage"), "false, maybe").unwrap();
    assert_eq!(store.get("Dummy Garage"), None);

    let door = create_door(&dir);
    assert_eq!(door.current_state(), CurrentDoorState::Open);
}
