//! Structural change notifications for the project's collections.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EntityRef, RouteId, ScheduleId};

/// Identifies one change-notifying collection of the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKey {
    /// All orders of the project
    Orders,
    /// Schedule versions of one day
    Schedules(NaiveDate),
    /// Routes of one schedule
    Routes(ScheduleId),
    /// Stops of one route
    Stops(RouteId),
    /// Unassigned orders of one schedule
    Unassigned(ScheduleId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionChange {
    Added(Vec<EntityRef>),
    Removed(Vec<EntityRef>),
    /// The collection changed too much to describe item by item
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub key: CollectionKey,
    pub change: CollectionChange,
}

impl CollectionEvent {
    #[must_use]
    pub fn added(key: CollectionKey, items: Vec<EntityRef>) -> Self {
        Self { key, change: CollectionChange::Added(items) }
    }

    #[must_use]
    pub fn removed(key: CollectionKey, items: Vec<EntityRef>) -> Self {
        Self { key, change: CollectionChange::Removed(items) }
    }

    #[must_use]
    pub fn reset(key: CollectionKey) -> Self {
        Self { key, change: CollectionChange::Reset }
    }

    /// Entities that left the collection
    #[must_use]
    pub fn removed_items(&self) -> &[EntityRef] {
        match &self.change {
            CollectionChange::Removed(items) => items,
            CollectionChange::Added(_) | CollectionChange::Reset => &[],
        }
    }
}

/// Pending events recorded by project mutations, oldest first
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    pending: Vec<CollectionEvent>,
}

impl ChangeLog {
    pub fn record(&mut self, event: CollectionEvent) {
        // Skip empty item lists, they carry no change
        if let CollectionChange::Added(items) | CollectionChange::Removed(items) = &event.change {
            if items.is_empty() {
                return;
            }
        }
        self.pending.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = CollectionEvent>) {
        for event in events {
            self.record(event);
        }
    }

    pub fn drain(&mut self) -> Vec<CollectionEvent> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
