use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use iqx_garagedoor::config::DoorSettings;
use iqx_garagedoor::controllers::{GarageDoorController, RequestOutcome};
use iqx_garagedoor::models::{ChangeSource, CurrentDoorState, DoorEvent, TargetDoorState};
use iqx_garagedoor::repositories::{MemoryStateRepository, StateStore};
use iqx_garagedoor::state_management::{EventDispatcher, GarageDoorStateManager};

struct RunningDoor {
    manager: GarageDoorStateManager,
    store: Arc<MemoryStateRepository>,
    events: UnboundedReceiver<DoorEvent>,
    handle: JoinHandle<()>,
}

fn spawn_door(settings: DoorSettings) -> RunningDoor {
    let store = Arc::new(MemoryStateRepository::new());
    let (dispatcher, events) = EventDispatcher::channel();
    let controller = GarageDoorController::new(settings, Arc::clone(&store) as Arc<dyn StateStore>, Arc::new(dispatcher));
    let (manager, processor) = GarageDoorStateManager::new(controller);
    let handle = tokio::spawn(async move {
        processor.run().await.unwrap();
    });
    RunningDoor { manager, store, events, handle }
}

fn door_settings(opening: u64, closing: u64, auto_close: u64) -> DoorSettings {
    let mut settings = DoorSettings::named("Runtime Garage");
    settings.opening_state_duration = Duration::from_secs(opening);
    settings.closing_state_duration = Duration::from_secs(closing);
    settings.auto_close_delay = Duration::from_secs(auto_close);
    settings
}

#[tokio::test(start_paused = true)]
async fn test_request_is_acknowledged_before_travel_finishes() {
    let door = spawn_door(door_settings(60, 60, 0));

    let outcome = door.manager.request_target_state(0).await.unwrap();
    assert_eq!(outcome, RequestOutcome::Accepted(TargetDoorState::Open));

    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);
    assert_eq!(door.manager.get_target_state().await.unwrap(), TargetDoorState::Open);
    assert_eq!(door.manager.snapshot().await.unwrap().pending_stages, 1);
    assert_eq!(door.store.get("Runtime Garage"), None);
}

#[tokio::test(start_paused = true)]
async fn test_open_then_close_in_tokio_time() {
    let door = spawn_door(door_settings(2, 1, 0));

    door.manager.request_target_state(0).await.unwrap();
    sleep(Duration::from_millis(1900)).await;
    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Open);
    assert_eq!(door.store.get("Runtime Garage"), Some(true));

    sleep(Duration::from_secs(3)).await;
    door.manager.request_target_state(1).await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);
    assert_eq!(door.store.get("Runtime Garage"), Some(false));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_value_is_acknowledged() {
    let door = spawn_door(door_settings(1, 1, 0));

    let outcome = door.manager.request_target_state(42).await.unwrap();
    assert_eq!(outcome, RequestOutcome::Ignored(42));
    assert_eq!(door.manager.get_target_state().await.unwrap(), TargetDoorState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_auto_close_runs_without_host_involvement() {
    let mut door = spawn_door(door_settings(0, 1, 3));

    door.manager.request_target_state(0).await.unwrap();
    sleep(Duration::from_millis(4500)).await;

    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);
    assert_eq!(door.store.get("Runtime Garage"), Some(false));

    let mut sources = Vec::new();
    while let Ok(event) = door.events.try_recv() {
        if let DoorEvent::TargetStateChanged(e) = event {
            sources.push(e.source);
        }
    }
    assert_eq!(sources, vec![ChangeSource::HostRequest, ChangeSource::AutoClose]);
}

#[tokio::test(start_paused = true)]
async fn test_huge_duration_keeps_processor_running() {
    let mut settings: DoorSettings = serde_json::from_value(serde_json::json!({
        "name": "Runtime Garage",
        "opening_state_duration": 1.8e19,
    })).unwrap();
    settings.closing_state_duration = Duration::from_secs(1);
    assert_eq!(settings.opening_state_duration, Duration::from_secs(18_000_000_000_000_000_000));
    let door = spawn_door(settings);

    let outcome = door.manager.request_target_state(0).await.unwrap();
    assert_eq!(outcome, RequestOutcome::Accepted(TargetDoorState::Open));
    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);
    assert_eq!(door.manager.snapshot().await.unwrap().pending_stages, 1);

    sleep(Duration::from_secs(3600)).await;
    door.manager.request_target_state(1).await.unwrap();
    sleep(Duration::from_millis(1100)).await;
    assert_eq!(door.manager.get_current_state().await.unwrap(), CurrentDoorState::Closed);
    assert_eq!(door.store.get("Runtime Garage"), Some(false));
    assert!(!door.handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_processor() {
    let door = spawn_door(door_settings(30, 30, 0));
    door.manager.request_target_state(1).await.unwrap();

    door.manager.shutdown();
    door.handle.await.unwrap();

    assert!(door.manager.is_shutdown());
    assert!(door.manager.get_current_state().await.is_err());
    assert_eq!(door.store.get("Runtime Garage"), None, "Abandoned stages never settle");
}

#[tokio::test(start_paused = true)]
async fn test_processor_stops_when_handles_dropped() {
    let door = spawn_door(door_settings(0, 0, 0));
    drop(door.manager);
    door.handle.await.unwrap();
}
