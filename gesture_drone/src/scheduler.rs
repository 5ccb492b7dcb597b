//! Repeating motion tasks.
//!
//! Continuous-forward and return-home both move the drone on a fixed
//! cadence until cancelled.  They share one slot: starting either replaces
//! whatever was running, so the two can never step the drone at once.
//!
//! Time never comes from a clock here.  Callers pass "now" as the elapsed
//! time since the session began and pull due ticks with [`MotionScheduler::due`].

use std::time::Duration;

/// A task this many intervals behind drops its backlog instead of
/// replaying it.
const MAX_LAG_TICKS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionKind {
    ContinuousForward,
    ReturnHome,
}

impl MotionKind {
    pub fn name(self) -> &'static str {
        match self {
            MotionKind::ContinuousForward => "continuous-forward",
            MotionKind::ReturnHome        => "return-home",
        }
    }
}

/// A running repeating task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionTask {
    pub kind:     MotionKind,
    pub interval: Duration,
    next_due:     Duration,
}

impl MotionTask {
    pub fn next_due(&self) -> Duration { self.next_due }
}

#[derive(Clone, Debug)]
pub struct MotionScheduler {
    interval: Duration,
    slot:     Option<MotionTask>,
}

impl MotionScheduler {
    pub fn new(interval: Duration) -> Self {
        MotionScheduler {
            interval: interval.max(Duration::from_millis(1)),
            slot:     None,
        }
    }

    /// Start `kind`; its first step is due one interval from `now`.
    /// Returns the kind that was displaced, if any.
    pub fn start(&mut self, kind: MotionKind, now: Duration) -> Option<MotionKind> {
        let previous = self.cancel();
        self.slot = Some(MotionTask { kind, interval: self.interval, next_due: now + self.interval });
        previous
    }

    pub fn cancel(&mut self) -> Option<MotionKind> {
        self.slot.take().map(|t| t.kind)
    }

    /// Cancel only if `kind` is the one running.
    pub fn cancel_kind(&mut self, kind: MotionKind) -> bool {
        if self.is_active(kind) {
            self.slot = None;
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<MotionKind> {
        self.slot.map(|t| t.kind)
    }

    pub fn is_active(&self, kind: MotionKind) -> bool {
        self.active() == Some(kind)
    }

    pub fn task(&self) -> Option<&MotionTask> {
        self.slot.as_ref()
    }

    /// Fire at most one step if one is due at `now`.
    ///
    /// Call in a loop to catch up after a long frame; each call advances
    /// the schedule by exactly one interval.  After a stall of
    /// `MAX_LAG_TICKS` intervals or more, only one tick fires and the
    /// cadence restarts from `now`.
    pub fn due(&mut self, now: Duration) -> Option<MotionKind> {
        let task = self.slot.as_mut()?;
        if now >= task.next_due {
            if now - task.next_due >= task.interval * MAX_LAG_TICKS {
                task.next_due = now;
            }
            task.next_due += task.interval;
            Some(task.kind)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn first_tick_after_one_interval() {
        let mut s = MotionScheduler::new(ms(120));
        s.start(MotionKind::ContinuousForward, ms(1000));
        assert_eq!(s.due(ms(1119)), None);
        assert_eq!(s.due(ms(1120)), Some(MotionKind::ContinuousForward));
        assert_eq!(s.due(ms(1120)), None);
    }

    #[test]
    fn catches_up_one_tick_per_call() {
        let mut s = MotionScheduler::new(ms(100));
        s.start(MotionKind::ReturnHome, ms(0));
        let mut fired = 0;
        while s.due(ms(450)).is_some() { fired += 1; }
        assert_eq!(fired, 4);
        assert_eq!(s.task().unwrap().next_due(), ms(500));
    }

    #[test]
    fn long_stall_fires_once_and_reanchors() {
        let mut s = MotionScheduler::new(ms(120));
        s.start(MotionKind::ContinuousForward, ms(0));
        assert_eq!(s.due(ms(5000)), Some(MotionKind::ContinuousForward));
        assert_eq!(s.due(ms(5000)), None);
        assert_eq!(s.task().unwrap().next_due(), ms(5120));
        assert_eq!(s.due(ms(5120)), Some(MotionKind::ContinuousForward));
    }

    #[test]
    fn only_one_task_at_a_time() {
        let mut s = MotionScheduler::new(ms(120));
        assert_eq!(s.start(MotionKind::ContinuousForward, ms(0)), None);
        assert_eq!(s.start(MotionKind::ReturnHome, ms(10)), Some(MotionKind::ContinuousForward));
        assert!(s.is_active(MotionKind::ReturnHome));
        assert!(!s.is_active(MotionKind::ContinuousForward));
    }

    #[test]
    fn cancel_kind_leaves_other_kind_alone() {
        let mut s = MotionScheduler::new(ms(120));
        s.start(MotionKind::ReturnHome, ms(0));
        assert!(!s.cancel_kind(MotionKind::ContinuousForward));
        assert_eq!(s.active(), Some(MotionKind::ReturnHome));
        assert!(s.cancel_kind(MotionKind::ReturnHome));
        assert_eq!(s.active(), None);
        assert_eq!(s.due(ms(10_000)), None);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut s = MotionScheduler::new(Duration::ZERO);
        s.start(MotionKind::ContinuousForward, ms(0));
        let mut fired = 0;
        while s.due(ms(5)).is_some() { fired += 1; }
        assert_eq!(fired, 5);
    }
}
