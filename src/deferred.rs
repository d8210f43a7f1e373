//! Fire-and-forget timers drained on the UI thread, e.g. "remove this block
//! once its fade-out is over".

use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    Delete(Uuid),
}

struct DeferredTask {
    remaining: Duration,
    action: DeferredAction,
}

#[derive(Default)]
pub struct DeferredQueue {
    tasks: Vec<DeferredTask>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay: Duration, action: DeferredAction) {
        self.tasks.push(DeferredTask {
            remaining: delay,
            action,
        });
    }

    pub fn is_scheduled(&self, action: DeferredAction) -> bool {
        self.tasks.iter().any(|t| t.action == action)
    }

    /// Time left before `action` fires, if it is scheduled.
    pub fn remaining(&self, action: DeferredAction) -> Option<Duration> {
        self.tasks
            .iter()
            .find(|t| t.action == action)
            .map(|t| t.remaining)
    }

    /// Advances every timer by `dt` seconds and returns the actions that came
    /// due, in scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredAction> {
        let elapsed = Duration::from_secs_f32(dt.max(0.0));
        let mut due = Vec::new();
        self.tasks.retain_mut(|task| {
            task.remaining = task.remaining.saturating_sub(elapsed);
            if task.remaining.is_zero() {
                due.push(task.action);
                false
            } else {
                true
            }
        });
        due
    }

    /// How long until the next action fires, for scheduling a repaint.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.tasks.iter().map(|t| t.remaining).min()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
