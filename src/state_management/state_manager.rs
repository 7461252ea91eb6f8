use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;
use crate::controllers::garage_door::{DoorSnapshot, GarageDoorController, RequestOutcome};
use crate::errors::GarageDoorResult;
use crate::models::{CurrentDoorState, TargetDoorState};
use crate::state_management::command_processor::{CommandProcessor, DoorCommand};
use crate::state_management::state_manager_lifecycle::StateManagerLifecycle;

const COMMAND_CHANNEL_CAPACITY: usize = 100;

/// The host layer's handle to a running garage door.
///
/// Cheap to clone; every clone talks to the same `CommandProcessor`.
#[derive(Clone)]
pub struct GarageDoorStateManager {
    name: String,
    command_sender: mpsc::Sender<DoorCommand>,
    lifecycle: Arc<StateManagerLifecycle>,
}

impl GarageDoorStateManager {
    /// Creates a handle for `controller` and the processor that must be spawned to drive it
    ///
    /// # Returns
    ///
    /// A tuple of the handle and the `CommandProcessor` owning the controller.
    pub fn new(controller: GarageDoorController) -> (Self, CommandProcessor) {
        let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let lifecycle = Arc::new(StateManagerLifecycle::new());
        let name = controller.name().to_string();

        let processor = CommandProcessor::new(command_receiver, controller, Arc::clone(&lifecycle));
        (Self { name, command_sender, lifecycle }, processor)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Requests a new target state and waits only for the acknowledgment
    ///
    /// The acknowledgment arrives once the transition has been scheduled, regardless of the configured
    /// stage durations. Values other than OPEN (0) and CLOSED (1) are acknowledged as `RequestOutcome::Ignored`.
    pub async fn request_target_state(&self, value: u8) -> GarageDoorResult<RequestOutcome> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.command_sender.send(DoorCommand::RequestTargetState(value, ack_tx)).await?;
        Ok(ack_rx.await?)
    }

    pub async fn get_current_state(&self) -> GarageDoorResult<CurrentDoorState> {
        let (tx, rx) = oneshot::channel();
        self.command_sender.send(DoorCommand::GetCurrentState(tx)).await?;
        Ok(rx.await?)
    }

    pub async fn get_target_state(&self) -> GarageDoorResult<TargetDoorState> {
        let (tx, rx) = oneshot::channel();
        self.command_sender.send(DoorCommand::GetTargetState(tx)).await?;
        Ok(rx.await?)
    }

    pub async fn snapshot(&self) -> GarageDoorResult<DoorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.command_sender.send(DoorCommand::GetSnapshot(tx)).await?;
        Ok(rx.await?)
    }

    /// Signals the processor to stop; pending stages are abandoned
    pub fn shutdown(&self) {
        info!("Shutting down {}", self.name);
        self.lifecycle.trigger_shutdown();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lifecycle.is_shutdown_triggered()
    }
}
