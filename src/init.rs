use std::sync::Arc;
use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use crate::config::{PersistenceBackend, Settings};
use crate::controllers::GarageDoorController;
use crate::models::DoorEvent;
use crate::repositories::{FileStateRepository, MemoryStateRepository, StateStore};
use crate::state_management::command_processor::CommandProcessor;
use crate::state_management::{EventDispatcher, GarageDoorStateManager};

/// Everything needed to run one simulated door
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn StateStore>,
    /// The host layer's handle to the door
    pub state_manager: GarageDoorStateManager,
    /// Must be spawned for the door to make progress
    pub command_processor: CommandProcessor,
    /// Notifications the host layer forwards outward
    pub event_receiver: UnboundedReceiver<DoorEvent>,
}

/// Opens the configured state store
pub fn open_store(settings: &Settings) -> Result<Arc<dyn StateStore>> {
    let store: Arc<dyn StateStore> = match settings.persistence.backend {
        PersistenceBackend::File => Arc::new(FileStateRepository::open(&settings.persistence.path)?),
        PersistenceBackend::Memory => Arc::new(MemoryStateRepository::new()),
    };
    Ok(store)
}

/// Wires the store, controller and runtime together from `settings`
///
/// Logging is left to the caller so the log guard can outlive this context.
pub fn initialize(settings: Settings) -> Result<AppContext> {
    let settings = Arc::new(settings);
    let store = open_store(&settings)?;

    let (dispatcher, event_receiver) = EventDispatcher::channel();
    let controller = GarageDoorController::new(
        settings.door.clone(),
        Arc::clone(&store),
        Arc::new(dispatcher),
    );
    info!(
        "Initialized {} ({:?}): current {}, target {}",
        controller.name(),
        controller.accessory_information(),
        controller.current_state(),
        controller.target_state()
    );

    let (state_manager, command_processor) = GarageDoorStateManager::new(controller);

    Ok(AppContext {
        settings,
        store,
        state_manager,
        command_processor,
        event_receiver,
    })
}
