use std::collections::VecDeque;

use crate::models::{OrderId, RouteId};
use crate::selection::ParticipantId;

/// Work postponed until the current gesture has fully completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Drop logical entities the participant that drove the selection cannot show
    PruneForeignSelection(ParticipantId),
    /// Give a route created with a blank name its default name
    NameRoute(RouteId),
    /// Give an order created with a blank name its default name
    NameOrder(OrderId),
}

/// FIFO of deferred tasks, drained on the next idle tick
#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: VecDeque<DeferredTask>,
}

impl DeferredQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Take the tasks queued so far; tasks pushed while running them wait for the next tick
    pub fn take_batch(&mut self) -> Vec<DeferredTask> {
        self.tasks.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
