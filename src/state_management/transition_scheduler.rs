//! # Transition Scheduler

//! A virtual-clock task queue for door transition stages. Each stage of a transition schedules its successor
//! as plain data (`ScheduledStage`) with a due time; the owner advances the clock and fires whatever has come due.
//! Nothing here sleeps, so tests can fast-forward through minutes of door travel instantly.
//! Scheduled stages are never cancelled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;
use derive_more::Display;
use crate::models::TargetDoorState;

/// The follow-up steps a transition can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    /// Travel towards `TargetDoorState` has finished; set the current state and persist it
    #[display("Settle({_0})")]
    Settle(TargetDoorState),
    /// The open stage expired; revert the target to CLOSED without touching the current state
    RevertTarget,
    /// The auto-close delay expired; start a closing sequence
    AutoClose,
}

/// A stage waiting for its due time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStage {
    /// The transition sequence that scheduled this stage
    pub sequence: u64,
    pub stage: Stage,
    /// Virtual time at which the stage fires
    pub due: Duration,
    /// Insertion counter; breaks ties between stages due at the same instant
    order: u64,
}

impl Ord for ScheduledStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.order.cmp(&other.order))
    }
}

impl PartialOrd for ScheduledStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Holds pending stages ordered by due time, then by the order they were scheduled
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    now: Duration,
    next_order: u64,
    queue: BinaryHeap<Reverse<ScheduledStage>>,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `stage` to fire `delay` after the current virtual time
    ///
    /// A zero delay is due immediately but still only fires on the next `pop_due` pass.
    pub fn schedule(&mut self, sequence: u64, stage: Stage, delay: Duration) -> ScheduledStage {
        let task = ScheduledStage {
            sequence,
            stage,
            due: self.now.saturating_add(delay),
            order: self.next_order,
        };
        self.next_order += 1;
        self.queue.push(Reverse(task));
        task
    }

    /// The due time of the earliest pending stage
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(task)| task.due)
    }

    /// Removes and returns the earliest stage due at or before `until`
    ///
    /// The clock moves to the returned stage's due time, so anything it schedules is timed from that instant.
    pub fn pop_due(&mut self, until: Duration) -> Option<ScheduledStage> {
        match self.queue.peek() {
            Some(Reverse(task)) if task.due <= until => {
                let task = *task;
                self.queue.pop();
                self.now = self.now.max(task.due);
                Some(task)
            }
            _ => None,
        }
    }

    /// Moves the clock forward to `until`; the clock never runs backwards
    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pending stages in firing order
    pub fn pending_stages(&self) -> Vec<ScheduledStage> {
        let mut stages: Vec<_> = self.queue.iter().map(|Reverse(task)| *task).collect();
        stages.sort();
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_pop_in_due_then_insertion_order() {
        let mut scheduler = TransitionScheduler::new();
        scheduler.schedule(1, Stage::Settle(TargetDoorState::Open), Duration::from_secs(2));
        scheduler.schedule(2, Stage::Settle(TargetDoorState::Closed), Duration::from_secs(1));
        scheduler.schedule(3, Stage::AutoClose, Duration::from_secs(1));

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(Duration::from_secs(10)))
            .map(|task| task.sequence)
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(scheduler.now(), Duration::from_secs(2));
    }

    #[test]
    fn nothing_fires_before_it_is_due() {
        let mut scheduler = TransitionScheduler::new();
        scheduler.schedule(1, Stage::RevertTarget, Duration::from_secs(5));
        assert!(scheduler.pop_due(Duration::from_secs(4)).is_none());
        assert_eq!(scheduler.next_due(), Some(Duration::from_secs(5)));
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn delays_are_measured_from_the_firing_stage() {
        let mut scheduler = TransitionScheduler::new();
        scheduler.schedule(1, Stage::Settle(TargetDoorState::Open), Duration::from_secs(2));
        let fired = scheduler.pop_due(Duration::from_secs(100)).unwrap();
        assert_eq!(fired.due, Duration::from_secs(2));

        let follow_up = scheduler.schedule(1, Stage::AutoClose, Duration::from_secs(3));
        assert_eq!(follow_up.due, Duration::from_secs(5));
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut scheduler = TransitionScheduler::new();
        scheduler.advance_clock(Duration::from_secs(7));
        scheduler.advance_clock(Duration::from_secs(3));
        assert_eq!(scheduler.now(), Duration::from_secs(7));
    }
}
