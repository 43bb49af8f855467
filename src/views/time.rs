use std::collections::{HashMap, HashSet};

use super::{route_keys, Page, PageCore, Selectable, ViewId};
use crate::context::DeskContext;
use crate::error::SelectionError;
use crate::gantt::GanttProjection;
use crate::models::{CollectionEvent, CollectionKey, EntityKinds, EntityRef, Project, RouteId, StopId};
use crate::selection::{ParticipantId, SelectionAction, SelectionHub};

/// Gantt timeline of the shown schedule
#[derive(Debug)]
pub struct TimePage {
    core: PageCore,
    gantt: GanttProjection,
    /// Hub revision of our selection list last pushed into the timeline
    synced_revision: Option<u64>,
}

impl TimePage {
    pub fn enter(hub: &mut SelectionHub) -> Self {
        Self {
            core: PageCore::enter(hub, ViewId::Time, EntityKinds::ROUTES | EntityKinds::STOPS),
            gantt: GanttProjection::new(),
            synced_revision: None,
        }
    }

    #[must_use]
    pub const fn gantt(&self) -> &GanttProjection {
        &self.gantt
    }

    pub fn set_visible(&mut self, project: &Project, visible: bool) {
        self.gantt.set_visible(project, visible);
    }

    /// Push this page's selection list into the timeline if the hub changed it
    pub fn sync_from_hub(&mut self, project: &Project, hub: &SelectionHub) {
        let Some(participant) = hub.participant(self.participant()) else { return };
        if self.synced_revision == Some(participant.revision()) {
            return;
        }
        let selected: Vec<EntityRef> = participant.selected().iter().copied().collect();
        self.gantt.apply_selection(project, &selected);
        self.synced_revision = Some(participant.revision());
    }

    /// The user changed the selection on the timeline
    ///
    /// # Errors
    /// Returns the hub's refusal, e.g. while another view is editing
    pub fn timeline_selection_changed(
        &mut self,
        project: &Project,
        hub: &mut SelectionHub,
        elements: &[StopId],
        items: &[RouteId],
    ) -> Result<(), SelectionError> {
        let Some(entities) = self.gantt.on_timeline_selection_changed(project, elements, items) else {
            return Ok(());
        };
        let participant = self.participant();
        let current: Vec<EntityRef> = hub
            .selected(participant)
            .map(|selected| selected.iter().copied().collect())
            .unwrap_or_default();

        let removed: Vec<EntityRef> = current.iter().filter(|e| !entities.contains(e)).copied().collect();
        let added: Vec<EntityRef> = entities.iter().filter(|e| !current.contains(e)).copied().collect();
        if let Err(err) = Self::push_change(hub, participant, removed, added) {
            // Put back the highlight of the selection the hub kept
            self.synced_revision = None;
            self.sync_from_hub(project, hub);
            return Err(err);
        }
        // The timeline already shows this selection
        self.synced_revision = hub.participant(participant).map(|p| p.revision());
        Ok(())
    }

    fn push_change(
        hub: &mut SelectionHub,
        participant: ParticipantId,
        removed: Vec<EntityRef>,
        added: Vec<EntityRef>,
    ) -> Result<(), SelectionError> {
        if !removed.is_empty() {
            hub.user_change(participant, SelectionAction::Remove(removed))?;
        }
        if !added.is_empty() {
            hub.user_change(participant, SelectionAction::Add(added))?;
        }
        Ok(())
    }
}

impl Page for TimePage {
    fn core(&self) -> &PageCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut PageCore {
        &mut self.core
    }

    fn keys(&self, ctx: &DeskContext, project: &Project) -> Vec<CollectionKey> {
        route_keys(ctx, project)
    }

    fn rebind(&mut self, ctx: &DeskContext, project: &Project) {
        self.gantt.bind(project, ctx.schedule);
        self.synced_revision = None;
    }

    fn on_collection_changed(&mut self, _ctx: &DeskContext, project: &Project, event: &CollectionEvent) {
        self.gantt.on_collection_changed(project, event);
    }

    fn selectable(&self) -> Selectable {
        let items: HashSet<EntityRef> = self
            .gantt
            .items()
            .iter()
            .flat_map(|item| {
                std::iter::once(EntityRef::Route(item.route))
                    .chain(item.elements.iter().map(|element| EntityRef::Stop(element.stop)))
            })
            .collect();
        (items, HashMap::new())
    }
}
