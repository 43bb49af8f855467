use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::{EntityKinds, EntityRef, RouteId};
use crate::views::ViewId;

/// Handle returned by [`SelectionHub::register`](super::SelectionHub::register)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub(super) u32);

/// Identifies one propagation pass of the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassToken(pub(super) u64);

/// What a participant is busy with; selection is locked while not idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing,
    Geocoding,
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Geocoding => "geocoding",
        };
        f.write_str(label)
    }
}

/// Change applied to a view-local selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    Add(Vec<EntityRef>),
    Remove(Vec<EntityRef>),
    Reset,
}

/// Change notification fired by a selection list, as a UI control would
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeChange {
    pub action: SelectionAction,
    /// Set when the hub itself made the change
    pub token: Option<PassToken>,
}

/// How an entity can be shown in a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Direct,
    /// Detail row under a collapsed route; expand the route first
    Collapsed(RouteId),
    Unavailable,
}

/// One view's selection list plus what the view can currently display
#[derive(Debug, Clone)]
pub struct Participant {
    view: ViewId,
    kinds: EntityKinds,
    selected: IndexSet<EntityRef>,
    items: HashSet<EntityRef>,
    details: HashMap<EntityRef, RouteId>,
    expanded: HashSet<RouteId>,
    edit_state: EditState,
    native: Vec<NativeChange>,
    revision: u64,
}

impl Participant {
    pub(super) fn new(view: ViewId, kinds: EntityKinds) -> Self {
        Self {
            view,
            kinds,
            selected: IndexSet::new(),
            items: HashSet::new(),
            details: HashMap::new(),
            expanded: HashSet::new(),
            edit_state: EditState::Idle,
            native: Vec::new(),
            revision: 0,
        }
    }

    #[must_use]
    pub const fn view(&self) -> ViewId {
        self.view
    }

    #[must_use]
    pub const fn kinds(&self) -> EntityKinds {
        self.kinds
    }

    #[must_use]
    pub const fn selected(&self) -> &IndexSet<EntityRef> {
        &self.selected
    }

    #[must_use]
    pub const fn edit_state(&self) -> EditState {
        self.edit_state
    }

    #[must_use]
    pub fn is_expanded(&self, route: RouteId) -> bool {
        self.expanded.contains(&route)
    }

    /// Number of times the selection list changed
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn placement(&self, entity: &EntityRef) -> Placement {
        if !self.kinds.contains(entity.kind()) {
            return Placement::Unavailable;
        }
        if self.items.contains(entity) {
            return Placement::Direct;
        }
        match self.details.get(entity) {
            Some(parent) if self.expanded.contains(parent) => Placement::Direct,
            Some(parent) => Placement::Collapsed(*parent),
            None => Placement::Unavailable,
        }
    }

    pub(super) fn set_edit_state(&mut self, state: EditState) {
        self.edit_state = state;
    }

    pub(super) fn expand(&mut self, route: RouteId) -> bool {
        self.expanded.insert(route)
    }

    pub(super) fn collapse(&mut self, route: RouteId) -> bool {
        self.expanded.remove(&route)
    }

    /// Replace the representable items; returns selected entities that vanished
    pub(super) fn set_items(
        &mut self,
        items: HashSet<EntityRef>,
        details: HashMap<EntityRef, RouteId>,
    ) -> Vec<EntityRef> {
        self.items = items;
        self.details = details;
        let parents: HashSet<RouteId> = self.details.values().copied().collect();
        // A route emptied of stops keeps its expansion while its row is shown
        let items = &self.items;
        self.expanded
            .retain(|route| parents.contains(route) || items.contains(&EntityRef::Route(*route)));

        self.selected
            .iter()
            .filter(|e| !self.items.contains(e) && !self.details.contains_key(e))
            .copied()
            .collect()
    }

    /// Apply a change to the list and fire the matching native notification
    ///
    /// Only the effective part of the change is reported; a change with no
    /// effect fires nothing.
    pub(super) fn apply(&mut self, action: SelectionAction, token: Option<PassToken>) {
        let effective = match action {
            SelectionAction::Add(entities) => {
                let added: Vec<EntityRef> = entities
                    .into_iter()
                    .filter(|e| self.selected.insert(*e))
                    .collect();
                (!added.is_empty()).then_some(SelectionAction::Add(added))
            }
            SelectionAction::Remove(entities) => {
                let removed: Vec<EntityRef> = entities
                    .into_iter()
                    .filter(|e| self.selected.shift_remove(e))
                    .collect();
                (!removed.is_empty()).then_some(SelectionAction::Remove(removed))
            }
            SelectionAction::Reset => {
                // A user reset always notifies, even on an empty list
                let had_items = !self.selected.is_empty();
                self.selected.clear();
                (had_items || token.is_none()).then_some(SelectionAction::Reset)
            }
        };

        if let Some(action) = effective {
            self.revision += 1;
            self.native.push(NativeChange { action, token });
        }
    }

    pub(super) fn take_native(&mut self) -> Vec<NativeChange> {
        std::mem::take(&mut self.native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderId, StopId};

    #[test]
    fn test_placement() {
        let mut participant = Participant::new(ViewId::Routes, EntityKinds::ROUTES | EntityKinds::STOPS);
        let route = RouteId::new();
        let stop = EntityRef::Stop(StopId::new());
        participant.set_items(
            HashSet::from([EntityRef::Route(route)]),
            HashMap::from([(stop, route)]),
        );

        assert_eq!(participant.placement(&EntityRef::Route(route)), Placement::Direct);
        assert_eq!(participant.placement(&stop), Placement::Collapsed(route));
        participant.expand(route);
        assert_eq!(participant.placement(&stop), Placement::Direct);
        assert_eq!(participant.placement(&EntityRef::Order(OrderId::new())), Placement::Unavailable);
    }

    #[test]
    fn test_apply_reports_only_effective_changes() {
        let mut participant = Participant::new(ViewId::Orders, EntityKinds::ORDERS);
        let order = EntityRef::Order(OrderId::new());

        participant.apply(SelectionAction::Add(vec![order]), None);
        participant.apply(SelectionAction::Add(vec![order]), None);
        participant.apply(SelectionAction::Remove(vec![EntityRef::Order(OrderId::new())]), None);

        let native = participant.take_native();
        assert_eq!(native.len(), 1);
        assert_eq!(native[0].action, SelectionAction::Add(vec![order]));
        assert_eq!(participant.revision(), 1);
    }

    #[test]
    fn test_hub_reset_of_empty_list_is_silent() {
        let mut participant = Participant::new(ViewId::Orders, EntityKinds::ORDERS);
        participant.apply(SelectionAction::Reset, Some(PassToken(1)));
        assert!(participant.take_native().is_empty());

        participant.apply(SelectionAction::Reset, None);
        assert_eq!(participant.take_native().len(), 1);
    }

    #[test]
    fn test_set_items_reports_vanished_selection() {
        let mut participant = Participant::new(ViewId::Orders, EntityKinds::ORDERS);
        let kept = EntityRef::Order(OrderId::new());
        let gone = EntityRef::Order(OrderId::new());
        participant.set_items(HashSet::from([kept, gone]), HashMap::new());
        participant.apply(SelectionAction::Add(vec![kept, gone]), None);

        let vanished = participant.set_items(HashSet::from([kept]), HashMap::new());
        assert_eq!(vanished, vec![gone]);
    }

    #[test]
    fn test_edit_state_display() {
        assert_eq!(EditState::Editing.to_string(), "editing");
        assert_eq!(EditState::default(), EditState::Idle);
    }
}
