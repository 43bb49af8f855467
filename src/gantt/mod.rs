//! Read-only timeline model derived from the routes of one schedule.
//!
//! The projection is rebuilt from scratch, never patched: one item per route,
//! one element per stop. Offsets are hours from midnight of the schedule day.

use indexmap::IndexSet;
use std::cmp::Ordering;

use crate::models::{
    CollectionEvent, CollectionKey, EntityRef, Project, Route, RouteId, ScheduleId, StopId,
    StopObject,
};
use crate::time::time_to_fraction;

/// One stop on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct GanttElement {
    pub stop: StopId,
    /// Object the stop visited when the element was built
    pub tag: StopObject,
    pub start: f64,
    pub end: f64,
}

/// One route row on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct GanttItem {
    pub route: RouteId,
    pub name: String,
    pub color: String,
    pub elements: Vec<GanttElement>,
}

/// Stable route order: name ignoring case, then creation time, then id
#[must_use]
pub fn compare_routes(a: &Route, b: &Route) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[derive(Debug)]
pub struct GanttProjection {
    schedule: Option<ScheduleId>,
    items: Vec<GanttItem>,
    visible: bool,
    needs_rebuild: bool,
    highlighted: IndexSet<EntityRef>,
    swallow_next_change: bool,
    rebuilds: u64,
}

impl Default for GanttProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl GanttProjection {
    #[must_use]
    pub fn new() -> Self {
        Self {
            schedule: None,
            items: Vec::new(),
            visible: true,
            needs_rebuild: false,
            highlighted: IndexSet::new(),
            swallow_next_change: false,
            rebuilds: 0,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[GanttItem] {
        &self.items
    }

    #[must_use]
    pub const fn schedule(&self) -> Option<ScheduleId> {
        self.schedule
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// How many times the items were rebuilt
    #[must_use]
    pub const fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Entities currently highlighted on the timeline
    #[must_use]
    pub const fn highlighted(&self) -> &IndexSet<EntityRef> {
        &self.highlighted
    }

    /// Point the projection at another schedule (or none)
    pub fn bind(&mut self, project: &Project, schedule: Option<ScheduleId>) {
        if self.schedule != schedule {
            // Items of another schedule are never shown, even while hidden
            self.items.clear();
            self.schedule = schedule;
        }
        self.highlighted.clear();
        self.request_rebuild(project);
    }

    /// React to a collection change of the project
    pub fn on_collection_changed(&mut self, project: &Project, event: &CollectionEvent) {
        let Some(bound) = self.schedule else { return };
        let affects = match event.key {
            CollectionKey::Routes(schedule) => schedule == bound,
            CollectionKey::Stops(route) => project.find_route(route).is_some_and(|(s, _)| s == bound),
            CollectionKey::Orders | CollectionKey::Schedules(_) | CollectionKey::Unassigned(_) => false,
        };
        if affects {
            self.request_rebuild(project);
        }
    }

    /// Show or hide the timeline; a pending rebuild runs on becoming visible
    pub fn set_visible(&mut self, project: &Project, visible: bool) {
        self.visible = visible;
        if visible && self.needs_rebuild {
            self.rebuild(project);
        }
    }

    fn request_rebuild(&mut self, project: &Project) {
        if self.visible {
            self.rebuild(project);
        } else {
            self.needs_rebuild = true;
        }
    }

    /// Regenerate all items from the bound schedule
    pub fn rebuild(&mut self, project: &Project) {
        self.needs_rebuild = false;
        self.rebuilds += 1;
        self.items.clear();

        let Some(schedule) = self.schedule.and_then(|id| project.schedule(id)) else {
            return;
        };
        let day = schedule.planned_date;
        let mut routes: Vec<&Route> = schedule.routes.iter().collect();
        routes.sort_by(|a, b| compare_routes(a, b));

        for route in routes {
            let mut cursor = 0.0;
            let elements = route
                .stops
                .iter()
                .map(|stop| {
                    let start = stop.arrive_time.map_or(cursor, |arrive| time_to_fraction(arrive, day));
                    #[allow(clippy::cast_precision_loss)]
                    let end = start + stop.service.num_seconds() as f64 / 3600.0;
                    cursor = end;
                    GanttElement { stop: stop.id, tag: stop.object, start, end }
                })
                .collect();
            self.items.push(GanttItem {
                route: route.id,
                name: route.name.clone(),
                color: route.color.clone(),
                elements,
            });
        }
        crate::dev_log!("Rebuilt timeline: {} items", self.items.len());
    }

    /// Highlight the elements and items standing for `entities`
    ///
    /// The timeline answers with a selection-changed notification of its own;
    /// the next one is therefore swallowed.
    pub fn apply_selection(&mut self, project: &Project, entities: &[EntityRef]) {
        self.highlighted.clear();
        for entity in entities {
            let shown = match entity {
                EntityRef::Route(route) => self.item(*route).is_some(),
                EntityRef::Stop(stop) => self.stop_shown(project, *stop),
                EntityRef::Order(_) => false,
            };
            if shown {
                self.highlighted.insert(*entity);
            }
        }
        self.swallow_next_change = true;
    }

    /// Translate a selection made on the timeline into domain entities
    ///
    /// Returns `None` for the echo of [`apply_selection`](Self::apply_selection).
    pub fn on_timeline_selection_changed(
        &mut self,
        project: &Project,
        elements: &[StopId],
        items: &[RouteId],
    ) -> Option<Vec<EntityRef>> {
        if std::mem::take(&mut self.swallow_next_change) {
            return None;
        }

        let mut entities: Vec<EntityRef> = items
            .iter()
            .filter(|route| self.item(**route).is_some())
            .map(|route| EntityRef::Route(*route))
            .collect();
        for stop in elements {
            let Some(element) = self.element(*stop) else { continue };
            let current = project.find_stop(*stop).map(|(_, _, s)| s.object);
            if current != Some(element.tag) {
                desync(&format!("element tag of stop {stop} disagrees with its stop"));
                continue;
            }
            entities.push(EntityRef::Stop(*stop));
        }
        self.highlighted = entities.iter().copied().collect();
        Some(entities)
    }

    #[must_use]
    pub fn item(&self, route: RouteId) -> Option<&GanttItem> {
        self.items.iter().find(|item| item.route == route)
    }

    #[must_use]
    pub fn element(&self, stop: StopId) -> Option<&GanttElement> {
        self.items
            .iter()
            .flat_map(|item| item.elements.iter())
            .find(|element| element.stop == stop)
    }

    /// Whether a stop has an element; a stop of the bound schedule without one is a fault
    fn stop_shown(&self, project: &Project, stop: StopId) -> bool {
        if self.element(stop).is_some() {
            return true;
        }
        if let Some((schedule, route, _)) = project.find_stop(stop) {
            if Some(schedule) == self.schedule && !self.needs_rebuild && self.item(route).is_none() {
                desync(&format!("selected stop {stop} belongs to route {route} missing from the timeline"));
            }
        }
        false
    }
}

fn desync(message: &str) {
    log::warn!("Timeline out of sync: {message}");
    debug_assert!(false, "timeline out of sync: {message}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{at, created, scenario};
    use crate::models::{RouteFlags, Stop};
    use chrono::Duration;

    fn tags(projection: &GanttProjection) -> Vec<Vec<StopObject>> {
        projection
            .items()
            .iter()
            .map(|item| item.elements.iter().map(|e| e.tag).collect())
            .collect()
    }

    #[test]
    fn test_items_follow_stable_route_order() {
        let mut s = scenario();
        s.project
            .add_route(s.schedule, Route::new("alpha", "#000000", created(5)));
        s.project
            .add_route(s.schedule, Route::new("Alpha", "#000000", created(2)));

        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));

        let names: Vec<&str> = projection.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "Route 1", "Route 2"]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let s = scenario();
        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));
        let first = tags(&projection);
        projection.rebuild(&s.project);
        assert_eq!(tags(&projection), first);
        assert_eq!(projection.rebuild_count(), 2);
    }

    #[test]
    fn test_element_offsets() {
        let mut s = scenario();
        let order = s.unassigned[0];
        let mut staged = s.project.schedule(s.schedule).cloned().expect("schedule exists");
        if let Some(route) = staged.route_mut(s.r1) {
            route.stops.push(Stop::for_order(order, Duration::minutes(30)).with_arrival(at(10, 30)));
            route.stops.push(Stop::for_order(s.unassigned[1], Duration::minutes(15)));
        }
        s.project.commit_schedule(staged, Vec::new());

        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));
        let item = projection.item(s.r1).expect("route shown");
        assert_eq!(item.elements[0].start, 10.5);
        assert_eq!(item.elements[0].end, 11.0);
        // Without an arrival the element follows its predecessor
        assert_eq!(item.elements[1].start, 11.0);
        assert_eq!(item.elements[1].end, 11.25);
    }

    #[test]
    fn test_hidden_projection_rebuilds_lazily() {
        let mut s = scenario();
        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));
        projection.set_visible(&s.project, false);

        s.project.set_route_flags(s.r1, RouteFlags::empty());
        s.project
            .add_route(s.schedule, Route::new("Route 3", "#000000", created(9)));
        for event in s.project.drain_events() {
            projection.on_collection_changed(&s.project, &event);
        }
        assert!(projection.needs_rebuild());
        assert_eq!(projection.items().len(), 2);

        projection.set_visible(&s.project, true);
        assert!(!projection.needs_rebuild());
        assert_eq!(projection.items().len(), 3);
    }

    #[test]
    fn test_unrelated_changes_do_not_rebuild() {
        let mut s = scenario();
        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));
        let count = projection.rebuild_count();

        s.project
            .add_order(crate::models::Order::new("New", Some(s.day)));
        for event in s.project.drain_events() {
            projection.on_collection_changed(&s.project, &event);
        }
        assert_eq!(projection.rebuild_count(), count);
    }

    #[test]
    fn test_applied_selection_echo_is_swallowed() {
        let s = scenario();
        let mut projection = GanttProjection::new();
        projection.bind(&s.project, Some(s.schedule));
        let stop = s.r2_stops[1];

        projection.apply_selection(&s.project, &[EntityRef::Stop(stop), EntityRef::Order(s.unassigned[0])]);
        assert_eq!(projection.highlighted().len(), 1);

        assert_eq!(projection.on_timeline_selection_changed(&s.project, &[stop], &[]), None);
        assert_eq!(
            projection.on_timeline_selection_changed(&s.project, &[stop], &[s.r1]),
            Some(vec![EntityRef::Route(s.r1), EntityRef::Stop(stop)])
        );
    }
}
