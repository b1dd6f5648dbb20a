//! Tick-based deferred task facility.
//!
//! Owners keep the [`TaskHandle`] returned by [`DeferredTasks::schedule`] and
//! cancel through it; a job never cancels itself. Cancelling twice, or
//! cancelling a job that already fired, is a no-op that returns `false`.
//!
//! [`TickScheduler`] is the in-process implementation driven by the runtime's
//! tick loop. Due jobs pop in `(due tick, schedule order)` order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::effects::EffectTaskId;
use crate::state::{ActorHandle, Tick};

/// Cancellable handle of a scheduled job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskHandle(pub u64);

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Work the host performs when a scheduled job comes due.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredJob {
    /// A timed effect reached its expiry.
    ExpireEffect(EffectTaskId),
    /// The global cast throttle of `actor` elapsed.
    ClearThrottle { actor: ActorHandle },
    /// Periodic resource regeneration for every actor.
    RegenResources,
}

pub trait DeferredTasks {
    /// Current tick of the host clock.
    fn now(&self) -> Tick;

    /// Schedules `job` to fire `delay` ticks from now (at least one).
    fn schedule(&mut self, delay: u64, job: DeferredJob) -> TaskHandle;

    /// Cancels a pending job. Returns whether it was still pending.
    fn cancel(&mut self, handle: TaskHandle) -> bool;
}

/// Job that came due, with the handle it was scheduled under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DueJob {
    pub handle: TaskHandle,
    pub due: Tick,
    pub job: DeferredJob,
}

#[derive(Clone, Debug, Default)]
pub struct TickScheduler {
    now: Tick,
    next_handle: u64,
    queue: BTreeMap<(Tick, TaskHandle), DeferredJob>,
    pending: BTreeSet<TaskHandle>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: Tick) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.pending.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pops the next job due at or before `until` and moves the clock to its
    /// due tick. Returns `None` once nothing else is due; the clock is then
    /// left at `until`.
    pub fn pop_due(&mut self, until: Tick) -> Option<DueJob> {
        loop {
            let Some((&(due, handle), _)) = self.queue.first_key_value() else {
                self.now = self.now.max(until);
                return None;
            };
            if due > until {
                self.now = self.now.max(until);
                return None;
            }
            let job = self.queue.remove(&(due, handle))?;
            self.now = self.now.max(due);
            if self.pending.remove(&handle) {
                trace!(%handle, due = %due, ?job, "deferred job due");
                return Some(DueJob { handle, due, job });
            }
        }
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&mut self, now: Tick) {
        self.now = self.now.max(now);
    }
}

impl DeferredTasks for TickScheduler {
    fn now(&self) -> Tick {
        self.now
    }

    fn schedule(&mut self, delay: u64, job: DeferredJob) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        let due = self.now + delay.max(1);
        self.queue.insert((due, handle), job);
        self.pending.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        if !self.pending.remove(&handle) {
            return false;
        }
        self.queue.retain(|(_, queued), _| *queued != handle);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_fire_in_due_then_schedule_order() {
        let mut scheduler = TickScheduler::new();
        let late = scheduler.schedule(5, DeferredJob::RegenResources);
        let first = scheduler.schedule(2, DeferredJob::ClearThrottle { actor: ActorHandle(1) });
        let second = scheduler.schedule(2, DeferredJob::ClearThrottle { actor: ActorHandle(2) });

        let order: Vec<_> = std::iter::from_fn(|| scheduler.pop_due(Tick(10)))
            .map(|due| due.handle)
            .collect();
        assert_eq!(order, vec![first, second, late]);
        assert_eq!(scheduler.now(), Tick(10));
    }

    #[test]
    fn nothing_fires_before_its_tick() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(3, DeferredJob::RegenResources);
        assert_eq!(scheduler.pop_due(Tick(2)), None);
        assert_eq!(scheduler.now(), Tick(2));
        assert!(scheduler.pop_due(Tick(3)).is_some());
    }

    #[test]
    fn zero_delay_still_waits_one_tick() {
        let mut scheduler = TickScheduler::new();
        scheduler.schedule(0, DeferredJob::RegenResources);
        assert_eq!(scheduler.pop_due(Tick(0)), None);
        assert!(scheduler.pop_due(Tick(1)).is_some());
    }

    #[test]
    fn cancel_is_exactly_once() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(1, DeferredJob::RegenResources);
        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        assert_eq!(scheduler.pop_due(Tick(5)), None);
    }

    #[test]
    fn cancelling_a_fired_job_is_a_no_op() {
        let mut scheduler = TickScheduler::new();
        let handle = scheduler.schedule(1, DeferredJob::RegenResources);
        assert!(scheduler.pop_due(Tick(1)).is_some());
        assert!(!scheduler.cancel(handle));
    }
}
