use std::sync::Arc;
use std::time::Duration;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::DoorSettings;
use crate::models::{
    local_now, AccessoryInformation, ChangeSource, CurrentDoorState, CurrentStateChangedEvent, DoorEvent,
    PostOpenAction, TargetDoorState, TargetStateChangedEvent, TravelReporting,
};
use crate::repositories::StateStore;
use crate::state_management::event_dispatcher::NotificationSink;
use crate::state_management::transition_scheduler::{ScheduledStage, Stage, TransitionScheduler};

/// The result of a target state request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request started a transition towards this target
    Accepted(TargetDoorState),
    /// The raw value was not a target state; nothing changed
    Ignored(u8),
}

/// A point-in-time view of a door for the host layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorSnapshot {
    pub name: String,
    pub current_state: CurrentDoorState,
    pub target_state: TargetDoorState,
    pub last_opened_at: Option<NaiveDateTime>,
    /// Stages scheduled but not yet fired
    pub pending_stages: usize,
}

/// The timed state machine behind a simulated garage door
///
/// The controller owns the door's current and target states, runs transition sequences on a virtual clock,
/// and writes each settled position to the state store. It never blocks: a request only schedules stages,
/// and `advance_to` fires whatever has come due. Superseded sequences are not cancelled, so when requests
/// overlap the last stage to fire decides the final state.
pub struct GarageDoorController {
    settings: DoorSettings,
    post_open_action: PostOpenAction,
    travel_reporting: TravelReporting,
    accessory_information: AccessoryInformation,
    current_state: CurrentDoorState,
    target_state: TargetDoorState,
    last_opened_at: Option<NaiveDateTime>,
    latest_sequence: u64,
    scheduler: TransitionScheduler,
    store: Arc<dyn StateStore>,
    sink: Arc<dyn NotificationSink>,
}

impl GarageDoorController {
    /// Creates a controller, restoring its position from the state store
    ///
    /// A door last stored as closed starts CLOSED with a CLOSED target. A door with no readable record,
    /// or one last stored as open, starts OPEN. Nothing is emitted or written here.
    ///
    /// # Arguments
    ///
    /// * `settings`: The door's name and stage durations
    /// * `store`: Where settled states are read from and written to
    /// * `sink`: Where state change notifications are pushed
    pub fn new(settings: DoorSettings, store: Arc<dyn StateStore>, sink: Arc<dyn NotificationSink>) -> Self {
        let cached_state = store.get(&settings.name);
        debug!("{}: cached state {:?}", settings.name, cached_state);

        let (current_state, target_state) = match cached_state {
            Some(false) => {
                info!("{}: restoring saved CLOSED state", settings.name);
                (CurrentDoorState::Closed, TargetDoorState::Closed)
            }
            _ => {
                info!("{}: starting OPEN", settings.name);
                (CurrentDoorState::Open, TargetDoorState::Open)
            }
        };

        Self {
            post_open_action: settings.post_open_action(),
            travel_reporting: settings.travel_reporting(),
            accessory_information: settings.accessory_information(),
            settings,
            current_state,
            target_state,
            last_opened_at: None,
            latest_sequence: 0,
            scheduler: TransitionScheduler::new(),
            store,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn current_state(&self) -> CurrentDoorState {
        self.current_state
    }

    pub fn target_state(&self) -> TargetDoorState {
        self.target_state
    }

    /// When the most recent opening sequence was requested
    pub fn last_opened_at(&self) -> Option<NaiveDateTime> {
        self.last_opened_at
    }

    pub fn accessory_information(&self) -> &AccessoryInformation {
        &self.accessory_information
    }

    pub fn post_open_action(&self) -> PostOpenAction {
        self.post_open_action
    }

    /// The controller's virtual time
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// The virtual time the next pending stage fires at
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn pending_stages(&self) -> Vec<ScheduledStage> {
        self.scheduler.pending_stages()
    }

    pub fn snapshot(&self) -> DoorSnapshot {
        DoorSnapshot {
            name: self.settings.name.clone(),
            current_state: self.current_state,
            target_state: self.target_state,
            last_opened_at: self.last_opened_at,
            pending_stages: self.scheduler.pending(),
        }
    }

    /// Handles a target state request from the host layer
    ///
    /// Returns as soon as the transition is scheduled. Values other than OPEN (0) and CLOSED (1) are
    /// acknowledged without any effect. Requesting the target the door already holds restarts the sequence.
    pub fn request_target_state(&mut self, value: u8) -> RequestOutcome {
        match TargetDoorState::try_from(value) {
            Ok(target) => {
                self.begin_transition(target, ChangeSource::HostRequest);
                RequestOutcome::Accepted(target)
            }
            Err(value) => {
                debug!("{}: ignoring target state value {}", self.settings.name, value);
                RequestOutcome::Ignored(value)
            }
        }
    }

    /// Runs every stage due at or before `now`, in order
    ///
    /// Stages scheduled while firing, including zero-delay ones, run in the same pass if they fall due by `now`.
    ///
    /// # Returns
    ///
    /// The number of stages fired
    pub fn advance_to(&mut self, now: Duration) -> usize {
        let mut fired = 0;
        while let Some(task) = self.scheduler.pop_due(now) {
            self.fire(task);
            fired += 1;
        }
        self.scheduler.advance_clock(now);
        fired
    }

    /// Moves the virtual clock forward by `elapsed`
    pub fn advance_by(&mut self, elapsed: Duration) -> usize {
        let now = self.scheduler.now().saturating_add(elapsed);
        self.advance_to(now)
    }

    fn begin_transition(&mut self, target: TargetDoorState, source: ChangeSource) {
        self.latest_sequence += 1;
        let sequence = self.latest_sequence;

        let travel = match target {
            TargetDoorState::Open => {
                self.last_opened_at = Some(local_now());
                self.settings.opening_state_duration
            }
            TargetDoorState::Closed => self.settings.closing_state_duration,
        };
        info!(
            "{}: moving to {} ({}), settling in {:?}",
            self.settings.name, target, source, travel
        );

        self.set_current_state(self.travel_reporting.in_transit(target));
        self.set_target_state(target, source);
        self.scheduler.schedule(sequence, Stage::Settle(target), travel);
    }

    fn fire(&mut self, task: ScheduledStage) {
        debug!("{}: firing {} from sequence {} at {:?}", self.settings.name, task.stage, task.sequence, task.due);
        if task.sequence != self.latest_sequence {
            debug!(
                "{}: sequence {} superseded by {}, applying {} anyway",
                self.settings.name, task.sequence, self.latest_sequence, task.stage
            );
        }

        match task.stage {
            Stage::Settle(target) => self.settle(task.sequence, target),
            Stage::RevertTarget => {
                info!("{}: open stage expired, target reverts to CLOSED", self.settings.name);
                self.set_target_state(TargetDoorState::Closed, ChangeSource::AutoRevert);
            }
            Stage::AutoClose => {
                info!("{}: auto-close delay expired", self.settings.name);
                self.begin_transition(TargetDoorState::Closed, ChangeSource::AutoClose);
            }
        }
    }

    fn settle(&mut self, sequence: u64, target: TargetDoorState) {
        info!("{}: settled {}", self.settings.name, target);
        self.set_current_state(target.into());
        self.persist(target);

        if target == TargetDoorState::Open {
            match self.post_open_action {
                PostOpenAction::None => {}
                PostOpenAction::RevertTarget(delay) => {
                    info!("{}: staying open for {:?}", self.settings.name, delay);
                    self.scheduler.schedule(sequence, Stage::RevertTarget, delay);
                }
                PostOpenAction::AutoClose(delay) => {
                    info!("{}: closing automatically in {:?}", self.settings.name, delay);
                    self.scheduler.schedule(sequence, Stage::AutoClose, delay);
                }
            }
        }
    }

    fn persist(&self, target: TargetDoorState) {
        if let Err(e) = self.store.set(&self.settings.name, target.persisted_value()) {
            error!("{}: failed to persist {} state: {}", self.settings.name, target, e);
        }
    }

    fn set_current_state(&mut self, new_state: CurrentDoorState) {
        let old_state = self.current_state;
        self.current_state = new_state;
        self.sink.notify(DoorEvent::CurrentStateChanged(CurrentStateChangedEvent {
            door_name: self.settings.name.clone(),
            old_state,
            new_state,
            timestamp: local_now(),
        }));
    }

    fn set_target_state(&mut self, new_state: TargetDoorState, source: ChangeSource) {
        let old_state = self.target_state;
        self.target_state = new_state;
        self.sink.notify(DoorEvent::TargetStateChanged(TargetStateChangedEvent {
            door_name: self.settings.name.clone(),
            old_state,
            new_state,
            source,
            timestamp: local_now(),
        }));
    }
}
