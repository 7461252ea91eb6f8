use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};
use crate::controllers::garage_door::{DoorSnapshot, GarageDoorController, RequestOutcome};
use crate::errors::GarageDoorResult;
use crate::models::{CurrentDoorState, TargetDoorState};
use crate::state_management::state_manager_lifecycle::StateManagerLifecycle;

/// Represents the commands the host layer can send to a running door
#[derive(Debug)]
pub enum DoorCommand {
    RequestTargetState(u8, oneshot::Sender<RequestOutcome>),
    GetCurrentState(oneshot::Sender<CurrentDoorState>),
    GetTargetState(oneshot::Sender<TargetDoorState>),
    GetSnapshot(oneshot::Sender<DoorSnapshot>),
}

/// Why the processing loop woke up
enum Wake {
    Shutdown,
    Command(Option<DoorCommand>),
    StageDue,
}

/// Owns a door controller and drives it from a single task
///
/// Commands arrive over a channel and the controller's virtual clock is tied to tokio time, so every
/// stage runs on this task between commands. There is never more than one thread of control over the door.
pub struct CommandProcessor {
    command_receiver: mpsc::Receiver<DoorCommand>,
    controller: GarageDoorController,
    lifecycle: Arc<StateManagerLifecycle>,
    /// The tokio instant corresponding to virtual time zero
    origin: Instant,
}

impl CommandProcessor {
    /// Creates a new CommandProcessor
    ///
    /// # Arguments
    ///
    /// * `command_receiver` - The receiver end of the command channel
    /// * `controller` - The door controller this processor owns
    /// * `lifecycle` - The shutdown signal shared with the state manager
    pub fn new(
        command_receiver: mpsc::Receiver<DoorCommand>,
        controller: GarageDoorController,
        lifecycle: Arc<StateManagerLifecycle>,
    ) -> Self {
        Self {
            command_receiver,
            controller,
            lifecycle,
            origin: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    /// Runs the command processing loop
    ///
    /// Returns when shutdown is triggered or every command sender has been dropped.
    /// Stages still pending at that point are abandoned.
    pub async fn run(mut self) -> GarageDoorResult<()> {
        info!("Starting command processor for {}", self.controller.name());
        loop {
            // A stage too far out to express as an Instant never wakes the loop
            let deadline = self.controller.next_due().and_then(|due| self.origin.checked_add(due));

            let wake = tokio::select! {
                biased;
                _ = self.lifecycle.wait_for_shutdown() => Wake::Shutdown,
                command = self.command_receiver.recv() => Wake::Command(command),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => Wake::StageDue,
            };

            match wake {
                Wake::Shutdown => {
                    info!("Shutdown signal received, stopping {}", self.controller.name());
                    break;
                }
                Wake::Command(Some(command)) => self.process_command(command),
                Wake::Command(None) => {
                    info!("All handles to {} dropped, stopping", self.controller.name());
                    break;
                }
                Wake::StageDue => {}
            }

            let fired = self.controller.advance_to(self.elapsed());
            if fired > 0 {
                debug!("{} stage(s) fired for {}", fired, self.controller.name());
            }
        }

        let pending = self.controller.pending_stages().len();
        if pending > 0 {
            warn!("{}: abandoning {} pending stage(s) at shutdown", self.controller.name(), pending);
        }
        Ok(())
    }

    /// Processes a single command
    ///
    /// Overdue stages fire first so a request is always timed from the current instant.
    /// A request is acknowledged as soon as it is scheduled; none of its stages have run yet.
    fn process_command(&mut self, command: DoorCommand) {
        self.controller.advance_to(self.elapsed());

        match command {
            DoorCommand::RequestTargetState(value, ack) => {
                let outcome = self.controller.request_target_state(value);
                if ack.send(outcome).is_err() {
                    debug!("Requester for {} went away before acknowledgment", self.controller.name());
                }
            }
            DoorCommand::GetCurrentState(reply) => {
                let _ = reply.send(self.controller.current_state());
            }
            DoorCommand::GetTargetState(reply) => {
                let _ = reply.send(self.controller.target_state());
            }
            DoorCommand::GetSnapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
            }
        }
    }
}
