use indexmap::IndexMap;

use super::ViewId;
use crate::models::CollectionKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Which view listens to which project collection
///
/// Subscribing twice to the same key is allowed and yields two deliveries,
/// so a page that forgets to unsubscribe shows up as duplicate delivery.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: IndexMap<SubscriptionId, (ViewId, CollectionKey)>,
    next: u64,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, view: ViewId, key: CollectionKey) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.entries.insert(id, (view, key));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    /// Number of live subscriptions held by `view`
    #[must_use]
    pub fn count_for(&self, view: ViewId) -> usize {
        self.entries.values().filter(|(v, _)| *v == view).count()
    }

    /// Views to deliver an event of `key` to, once per subscription
    #[must_use]
    pub fn subscribers(&self, key: &CollectionKey) -> Vec<ViewId> {
        self.entries
            .values()
            .filter(|(_, k)| k == key)
            .map(|(view, _)| *view)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleId;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut registry = SubscriptionRegistry::new();
        let schedule = ScheduleId::new();
        let routes = registry.subscribe(ViewId::Routes, CollectionKey::Routes(schedule));
        registry.subscribe(ViewId::Time, CollectionKey::Routes(schedule));
        registry.subscribe(ViewId::Orders, CollectionKey::Orders);

        assert_eq!(
            registry.subscribers(&CollectionKey::Routes(schedule)),
            vec![ViewId::Routes, ViewId::Time]
        );
        assert!(registry.unsubscribe(routes));
        assert!(!registry.unsubscribe(routes));
        assert_eq!(registry.count_for(ViewId::Routes), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_subscription_delivers_twice() {
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(ViewId::Map, CollectionKey::Orders);
        registry.subscribe(ViewId::Map, CollectionKey::Orders);
        assert_eq!(registry.subscribers(&CollectionKey::Orders).len(), 2);
    }
}
