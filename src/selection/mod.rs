//! Keeps one logical selection consistent across the views' selection lists.
//!
//! Every list mutation fires a [`NativeChange`]. Changes made by the hub carry
//! the [`PassToken`] of the propagation pass that wrote them, so the hub can
//! recognise and drop its own echoes instead of feeding them back.

mod participant;

pub use participant::{
    EditState, NativeChange, Participant, ParticipantId, PassToken, Placement, SelectionAction,
};

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

use crate::error::SelectionError;
use crate::models::{EntityKinds, EntityRef, RouteId};
use crate::views::ViewId;

#[derive(Debug, Default)]
pub struct SelectionHub {
    participants: IndexMap<ParticipantId, Participant>,
    logical: IndexSet<EntityRef>,
    next_participant: u32,
    next_pass: u64,
}

impl SelectionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view's selection list as a participant
    pub fn register(&mut self, view: ViewId, kinds: EntityKinds) -> ParticipantId {
        let id = ParticipantId(self.next_participant);
        self.next_participant += 1;
        self.participants.insert(id, Participant::new(view, kinds));
        crate::dev_log!("Registered selection participant {:?} for {} view", id, view);
        id
    }

    pub fn unregister(&mut self, id: ParticipantId) -> bool {
        self.participants.shift_remove(&id).is_some()
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// The view-independent selection
    #[must_use]
    pub const fn logical_selection(&self) -> &IndexSet<EntityRef> {
        &self.logical
    }

    /// Selection list of one participant
    #[must_use]
    pub fn selected(&self, id: ParticipantId) -> Option<&IndexSet<EntityRef>> {
        self.participants.get(&id).map(Participant::selected)
    }

    /// Edit state of the first busy participant other than `except`
    #[must_use]
    pub fn blocking_edit(&self, except: Option<ParticipantId>) -> Option<EditState> {
        self.participants
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .map(|(_, p)| p.edit_state())
            .find(|state| *state != EditState::Idle)
    }

    /// # Errors
    /// Returns `UnknownParticipant` if `id` is not registered
    pub fn set_edit_state(&mut self, id: ParticipantId, state: EditState) -> Result<(), SelectionError> {
        self.participant_mut(id)?.set_edit_state(state);
        Ok(())
    }

    /// Replace what a participant can display
    ///
    /// Selected entities that are no longer displayable are dropped from the
    /// participant's list; the logical selection keeps them.
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if `id` is not registered
    pub fn set_items(
        &mut self,
        id: ParticipantId,
        items: HashSet<EntityRef>,
        details: HashMap<EntityRef, RouteId>,
    ) -> Result<(), SelectionError> {
        let pass = self.begin_pass();
        let participant = self.participant_mut(id)?;
        let vanished = participant.set_items(items, details);
        if !vanished.is_empty() {
            participant.apply(SelectionAction::Remove(vanished), Some(pass));
        }
        self.dispatch();
        Ok(())
    }

    /// Expand the detail group of `route`; returns false if it already was
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if `id` is not registered
    pub fn expand(&mut self, id: ParticipantId, route: RouteId) -> Result<bool, SelectionError> {
        Ok(self.participant_mut(id)?.expand(route))
    }

    /// # Errors
    /// Returns `UnknownParticipant` if `id` is not registered
    pub fn collapse(&mut self, id: ParticipantId, route: RouteId) -> Result<bool, SelectionError> {
        Ok(self.participant_mut(id)?.collapse(route))
    }

    /// Apply a change the user made in one view and propagate it
    ///
    /// # Errors
    /// Returns `WrongKind` when adding an entity the view cannot display and
    /// `EditInProgress` while another participant is editing or geocoding.
    pub fn user_change(&mut self, id: ParticipantId, action: SelectionAction) -> Result<(), SelectionError> {
        let participant = self.participants.get(&id).ok_or(SelectionError::UnknownParticipant)?;
        if let SelectionAction::Add(entities) = &action {
            check_kinds(participant, entities)?;
        }
        if let Some(state) = self.blocking_edit(Some(id)) {
            return Err(SelectionError::EditInProgress(state));
        }

        self.participant_mut(id)?.apply(action, None);
        self.dispatch();
        Ok(())
    }

    /// Programmatically make `entities` the selection, as seen from one view
    ///
    /// Nothing changes when an error is returned.
    ///
    /// # Errors
    /// Returns `WrongKind` for an entity the view cannot display and
    /// `EditInProgress` while any participant is editing or geocoding.
    pub fn select(&mut self, id: ParticipantId, entities: &[EntityRef]) -> Result<(), SelectionError> {
        let participant = self.participants.get(&id).ok_or(SelectionError::UnknownParticipant)?;
        check_kinds(participant, entities)?;
        self.select_logical(entities)
    }

    /// Make `entities` the logical selection in every view that can show them
    ///
    /// # Errors
    /// Returns `EditInProgress` while any participant is editing or geocoding
    pub fn select_logical(&mut self, entities: &[EntityRef]) -> Result<(), SelectionError> {
        if let Some(state) = self.blocking_edit(None) {
            return Err(SelectionError::EditInProgress(state));
        }

        let pass = self.begin_pass();
        self.logical = entities.iter().copied().collect();
        for participant in self.participants.values_mut() {
            let wanted: IndexSet<EntityRef> = entities
                .iter()
                .filter(|e| reveal(participant, e))
                .copied()
                .collect();
            let stale: Vec<EntityRef> = participant
                .selected()
                .iter()
                .filter(|e| !wanted.contains(*e))
                .copied()
                .collect();
            participant.apply(SelectionAction::Remove(stale), Some(pass));
            participant.apply(SelectionAction::Add(wanted.into_iter().collect()), Some(pass));
        }
        self.dispatch();
        Ok(())
    }

    /// Clear the logical selection and every participant's list
    pub fn reset(&mut self) {
        let pass = self.begin_pass();
        self.logical.clear();
        for participant in self.participants.values_mut() {
            participant.apply(SelectionAction::Reset, Some(pass));
        }
        self.dispatch();
    }

    /// Drop entities that were removed from the domain
    pub fn forget(&mut self, entities: &[EntityRef]) {
        if entities.is_empty() {
            return;
        }
        let pass = self.begin_pass();
        for entity in entities {
            self.logical.shift_remove(entity);
        }
        for participant in self.participants.values_mut() {
            participant.apply(SelectionAction::Remove(entities.to_vec()), Some(pass));
        }
        self.dispatch();
    }

    /// Drop logical entities the initiator cannot display, everywhere
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if `initiator` is not registered
    pub fn prune_foreign(&mut self, initiator: ParticipantId) -> Result<(), SelectionError> {
        let participant = self.participants.get(&initiator).ok_or(SelectionError::UnknownParticipant)?;
        let foreign: Vec<EntityRef> = self
            .logical
            .iter()
            .filter(|e| participant.placement(e) == Placement::Unavailable)
            .copied()
            .collect();
        if !foreign.is_empty() {
            crate::dev_log!("Pruning {} foreign selected entities", foreign.len());
        }
        self.forget(&foreign);
        Ok(())
    }

    fn participant_mut(&mut self, id: ParticipantId) -> Result<&mut Participant, SelectionError> {
        self.participants.get_mut(&id).ok_or(SelectionError::UnknownParticipant)
    }

    fn begin_pass(&mut self) -> PassToken {
        self.next_pass += 1;
        PassToken(self.next_pass)
    }

    /// Drain native changes until none are left, propagating user changes
    fn dispatch(&mut self) {
        loop {
            let batch: Vec<(ParticipantId, NativeChange)> = self
                .participants
                .iter_mut()
                .flat_map(|(id, participant)| {
                    let id = *id;
                    participant.take_native().into_iter().map(move |change| (id, change))
                })
                .collect();
            if batch.is_empty() {
                return;
            }

            for (id, change) in batch {
                if change.token.is_some() {
                    continue;
                }
                self.propagate(id, change.action);
            }
        }
    }

    fn propagate(&mut self, initiator: ParticipantId, action: SelectionAction) {
        let pass = self.begin_pass();
        match action {
            SelectionAction::Reset => {
                self.logical.clear();
                for (id, participant) in &mut self.participants {
                    if *id != initiator {
                        participant.apply(SelectionAction::Reset, Some(pass));
                    }
                }
            }
            SelectionAction::Add(entities) => {
                self.logical.extend(entities.iter().copied());
                for (id, participant) in &mut self.participants {
                    if *id == initiator {
                        continue;
                    }
                    let shown: Vec<EntityRef> = entities
                        .iter()
                        .filter(|e| reveal(participant, e))
                        .copied()
                        .collect();
                    participant.apply(SelectionAction::Add(shown), Some(pass));
                }
            }
            SelectionAction::Remove(entities) => {
                for entity in &entities {
                    self.logical.shift_remove(entity);
                }
                for (id, participant) in &mut self.participants {
                    if *id != initiator {
                        participant.apply(SelectionAction::Remove(entities.clone()), Some(pass));
                    }
                }
            }
        }
    }
}

fn check_kinds(participant: &Participant, entities: &[EntityRef]) -> Result<(), SelectionError> {
    match entities.iter().find(|e| !participant.kinds().contains(e.kind())) {
        Some(entity) => Err(SelectionError::WrongKind {
            view: participant.view(),
            kind: entity.kind(),
        }),
        None => Ok(()),
    }
}

/// Whether `entity` can be selected in `participant`, expanding its group if needed
fn reveal(participant: &mut Participant, entity: &EntityRef) -> bool {
    match participant.placement(entity) {
        Placement::Direct => true,
        Placement::Collapsed(route) => {
            participant.expand(route);
            true
        }
        Placement::Unavailable => false,
    }
}
