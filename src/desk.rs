//! The dispatcher desk: owns the project and wires pages, selection,
//! drag-and-drop and schedule versions together.

use chrono::{DateTime, NaiveDate, Utc};

use crate::context::DeskContext;
use crate::deferred::{DeferredQueue, DeferredTask};
use crate::dnd::{self, DragPayload, DragSession, DropOutcome, HitTarget};
use crate::error::{DropRejection, SelectionError, VersionError};
use crate::models::{
    generate_route_color, next_default_name, EntityRef, GeoPoint, Order, OrderId, Project, Route,
    RouteId, Schedule, ScheduleId, ScheduleType, StopId, UserSettings,
};
use crate::selection::{EditState, ParticipantId, SelectionAction, SelectionHub};
use crate::storage::ProjectStore;
use crate::versions::VersionManager;
use crate::views::{MapPage, OrdersPage, Page, RoutesPage, SubscriptionRegistry, TimePage, ViewId};

pub struct Desk<S: ProjectStore> {
    project: Project,
    store: S,
    ctx: DeskContext,
    hub: SelectionHub,
    registry: SubscriptionRegistry,
    versions: VersionManager,
    deferred: DeferredQueue,
    orders: OrdersPage,
    routes: RoutesPage,
    map: MapPage,
    time: TimePage,
    drag: Option<DragSession>,
    busy: bool,
    status: Option<String>,
}

impl<S: ProjectStore> Desk<S> {
    /// Open the desk on `date`, creating the day's Current schedule if it has none
    ///
    /// # Errors
    /// Returns `SaveFailure` if a new Current schedule could not be saved
    pub fn new(
        mut project: Project,
        mut store: S,
        settings: UserSettings,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, VersionError> {
        let versions = VersionManager::new(&settings);
        let current = versions.ensure_current(&mut project, &mut store, date, now)?;
        // Pages bind to the project as it is now
        project.drain_events();

        let mut hub = SelectionHub::new();
        let orders = OrdersPage::enter(&mut hub);
        let routes = RoutesPage::enter(&mut hub);
        let map = MapPage::enter(&mut hub);
        let time = TimePage::enter(&mut hub);

        let mut desk = Self {
            project,
            store,
            ctx: DeskContext::new(date, settings),
            hub,
            registry: SubscriptionRegistry::new(),
            versions,
            deferred: DeferredQueue::new(),
            orders,
            routes,
            map,
            time,
            drag: None,
            busy: false,
            status: None,
        };
        desk.show_schedule(current);
        Ok(desk)
    }

    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub const fn context(&self) -> &DeskContext {
        &self.ctx
    }

    #[must_use]
    pub const fn hub(&self) -> &SelectionHub {
        &self.hub
    }

    #[must_use]
    pub const fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub const fn orders_page(&self) -> &OrdersPage {
        &self.orders
    }

    #[must_use]
    pub const fn routes_page(&self) -> &RoutesPage {
        &self.routes
    }

    #[must_use]
    pub const fn map_page(&self) -> &MapPage {
        &self.map
    }

    #[must_use]
    pub const fn time_page(&self) -> &TimePage {
        &self.time
    }

    #[must_use]
    pub const fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// True while a version operation runs
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Message of the last failed version operation
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    #[must_use]
    pub fn participant(&self, view: ViewId) -> ParticipantId {
        self.page(view).participant()
    }

    /// Selection list of one view
    #[must_use]
    pub fn selected(&self, view: ViewId) -> Vec<EntityRef> {
        self.hub
            .selected(self.participant(view))
            .map(|selected| selected.iter().copied().collect())
            .unwrap_or_default()
    }

    fn page(&self, view: ViewId) -> &dyn Page {
        match view {
            ViewId::Orders => &self.orders,
            ViewId::Routes => &self.routes,
            ViewId::Map => &self.map,
            ViewId::Time => &self.time,
        }
    }

    // Schedules

    /// Show another schedule on every page
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown schedule
    pub fn select_schedule(&mut self, id: ScheduleId) -> Result<(), VersionError> {
        if self.project.schedule(id).is_none() {
            return Err(VersionError::NotFound(id));
        }
        self.show_schedule(id);
        Ok(())
    }

    /// Show the Current schedule of another day, creating it if needed
    ///
    /// # Errors
    /// Returns `SaveFailure` if a new Current schedule could not be saved
    pub fn set_date(&mut self, date: NaiveDate, now: DateTime<Utc>) -> Result<ScheduleId, VersionError> {
        self.run_version_op(|versions, project, store| versions.ensure_current(project, store, date, now))
    }

    fn show_schedule(&mut self, id: ScheduleId) {
        self.drag = None;
        if let Some(schedule) = self.project.schedule(id) {
            self.ctx.date = schedule.planned_date;
        }
        self.ctx.schedule = Some(id);

        let pages: [&mut dyn Page; 4] = [&mut self.orders, &mut self.routes, &mut self.map, &mut self.time];
        for page in pages {
            if let Err(err) = page.switch_schedule(&self.ctx, &self.project, &mut self.registry, &mut self.hub) {
                log::warn!("{} page could not switch schedule: {err}", page.view());
            }
        }
        self.time.sync_from_hub(&self.project, &self.hub);
        crate::dev_log!("Showing schedule {}", id);
    }

    /// Deliver pending project changes to the subscribed pages
    ///
    /// Returns the number of changes delivered.
    pub fn pump(&mut self) -> usize {
        let events = self.project.drain_events();
        for event in &events {
            let gone: Vec<EntityRef> = event
                .removed_items()
                .iter()
                .filter(|entity| !self.exists(entity))
                .copied()
                .collect();
            self.hub.forget(&gone);

            for view in self.registry.subscribers(&event.key) {
                let page: &mut dyn Page = match view {
                    ViewId::Orders => &mut self.orders,
                    ViewId::Routes => &mut self.routes,
                    ViewId::Map => &mut self.map,
                    ViewId::Time => &mut self.time,
                };
                if let Err(err) = page.deliver(&self.ctx, &self.project, event, &mut self.registry, &mut self.hub) {
                    log::warn!("Change not delivered to {view} page: {err}");
                }
            }
        }
        self.time.sync_from_hub(&self.project, &self.hub);
        events.len()
    }

    fn exists(&self, entity: &EntityRef) -> bool {
        match entity {
            EntityRef::Order(id) => self.project.order(*id).is_some(),
            EntityRef::Route(id) => self.project.find_route(*id).is_some(),
            EntityRef::Stop(id) => self.project.find_stop(*id).is_some(),
        }
    }

    // Selection

    /// A selection gesture in one view
    ///
    /// # Errors
    /// Returns the hub's refusal; nothing changes in that case
    pub fn user_select(&mut self, view: ViewId, action: SelectionAction) -> Result<(), SelectionError> {
        let participant = self.participant(view);
        let grid_driven = matches!(view, ViewId::Orders | ViewId::Routes) && action != SelectionAction::Reset;
        self.hub.user_change(participant, action)?;
        if grid_driven {
            self.deferred.push(DeferredTask::PruneForeignSelection(participant));
        }
        self.time.sync_from_hub(&self.project, &self.hub);
        Ok(())
    }

    /// Programmatic selection in one view
    ///
    /// # Errors
    /// Returns `WrongKind` or `EditInProgress`; nothing changes in that case
    pub fn select(&mut self, view: ViewId, entities: &[EntityRef]) -> Result<(), SelectionError> {
        self.hub.select(self.participant(view), entities)?;
        self.time.sync_from_hub(&self.project, &self.hub);
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownParticipant` after teardown
    pub fn set_edit_state(&mut self, view: ViewId, state: EditState) -> Result<(), SelectionError> {
        self.hub.set_edit_state(self.participant(view), state)
    }

    /// Selection made on the timeline control
    ///
    /// # Errors
    /// Returns the hub's refusal, e.g. while another view is editing
    pub fn timeline_selection_changed(&mut self, elements: &[StopId], items: &[RouteId]) -> Result<(), SelectionError> {
        self.time
            .timeline_selection_changed(&self.project, &mut self.hub, elements, items)
    }

    pub fn set_timeline_visible(&mut self, visible: bool) {
        self.time.set_visible(&self.project, visible);
        if let Err(err) = self.time.publish_selectable(&mut self.hub) {
            log::warn!("Timeline items not published: {err}");
        }
        self.time.sync_from_hub(&self.project, &self.hub);
    }

    // Drag and drop

    /// Start dragging the selection of `view`; false if it cannot be dragged
    pub fn begin_drag(&mut self, view: ViewId) -> bool {
        let Some(schedule) = self.ctx.schedule else { return false };
        let selection = self.selected(view);
        if !dnd::is_drag_allowed(&self.project, schedule, &selection) {
            return false;
        }
        let Some(payload) = DragPayload::from_selection(&selection) else { return false };
        self.drag = Some(DragSession::new(payload, schedule, self.ctx.settings.drag_expand_dwell()));
        true
    }

    /// Pointer moved during a drag; returns whether dropping here is allowed
    pub fn drag_over(&mut self, hit: HitTarget, now: DateTime<Utc>) -> bool {
        let target = hit.resolve();
        let collapsed = target
            .and_then(|t| t.route())
            .is_some_and(|route| self.has_collapsed_detail(route));
        let Some(session) = self.drag.as_mut() else { return false };
        session.drag_over(target, collapsed, now);
        target.is_some_and(|t| dnd::is_drop_allowed(&self.project, session.schedule(), &t, session.payload()))
    }

    pub fn drag_leave(&mut self) {
        if let Some(session) = self.drag.as_mut() {
            session.drag_leave();
        }
    }

    /// Poll the dwell timer; returns the route expanded by this tick
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<RouteId> {
        let route = self.drag.as_mut()?.tick(now)?;
        if let Err(err) = self.hub.expand(self.routes.participant(), route) {
            log::warn!("Route {route} not expanded: {err}");
        }
        crate::dev_log!("Expanded route {} after dwell", route);
        Some(route)
    }

    /// Drop the dragged payload where the pointer is
    ///
    /// Routes expanded only for the drag collapse again unless they received
    /// the payload. On success the new entities become the selection everywhere.
    ///
    /// # Errors
    /// Returns the rejection; the schedule is unchanged in that case
    pub fn end_drag(&mut self, hit: HitTarget) -> Result<DropOutcome, DropRejection> {
        let session = self.drag.take().ok_or(DropRejection::NoDrag)?;
        let schedule = session.schedule();
        let payload = session.payload().clone();
        let auto_expanded = session.finish();

        let result = hit
            .resolve()
            .ok_or(DropRejection::NoTarget)
            .and_then(|target| dnd::drop(&mut self.project, schedule, &target, &payload));
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(rejection) => {
                crate::dev_log!("Drop rejected: {}", rejection);
                self.collapse_routes(auto_expanded);
                return Err(rejection);
            }
        };

        self.pump();
        let received = outcome.target_route;
        self.collapse_routes(auto_expanded.into_iter().filter(|route| Some(*route) != received));
        if let Err(err) = self.hub.select_logical(&outcome.selection) {
            log::warn!("Selection not moved to dropped entities: {err}");
        }
        self.time.sync_from_hub(&self.project, &self.hub);
        Ok(outcome)
    }

    /// Abandon the drag; nothing changes except auto-expanded routes collapsing
    pub fn cancel_drag(&mut self) {
        if let Some(session) = self.drag.take() {
            self.collapse_routes(session.finish());
        }
    }

    fn has_collapsed_detail(&self, route: RouteId) -> bool {
        let has_stops = self.routes.row(route).is_some_and(|row| !row.stops.is_empty());
        let expanded = self
            .hub
            .participant(self.routes.participant())
            .is_some_and(|p| p.is_expanded(route));
        has_stops && !expanded
    }

    fn collapse_routes(&mut self, routes: impl IntoIterator<Item = RouteId>) {
        let participant = self.routes.participant();
        for route in routes {
            if let Err(err) = self.hub.collapse(participant, route) {
                log::warn!("Route {route} not collapsed: {err}");
            }
        }
    }

    // Versions

    /// Versions of the shown day in display order
    #[must_use]
    pub fn versions(&self) -> Vec<&Schedule> {
        self.versions.versions_on(&self.project, self.ctx.date)
    }

    /// Clone the shown schedule as a new Edited version and show it
    ///
    /// # Errors
    /// Returns `NothingShown` or the version manager's error; the shown schedule stays
    pub fn create_version(&mut self, now: DateTime<Utc>) -> Result<ScheduleId, VersionError> {
        let source = self.ctx.schedule.ok_or(VersionError::NothingShown)?;
        self.run_version_op(|versions, project, store| versions.create_version(project, store, source, now))
    }

    /// Commit the shown schedule as the day's Current schedule and show it
    ///
    /// # Errors
    /// Returns `NothingShown` or the version manager's error; the shown schedule stays
    pub fn commit_to_current(&mut self, now: DateTime<Utc>) -> Result<ScheduleId, VersionError> {
        let source = self.ctx.schedule.ok_or(VersionError::NothingShown)?;
        self.run_version_op(|versions, project, store| versions.commit_to_current(project, store, source, now))
    }

    /// Store a solver result for the shown day and show the new Current schedule
    ///
    /// # Errors
    /// Returns `SaveFailure` if the store refuses the result
    pub fn record_build_snapshot(&mut self, routes: Vec<Route>, now: DateTime<Utc>) -> Result<ScheduleId, VersionError> {
        let date = self.ctx.date;
        self.run_version_op(|versions, project, store| {
            versions.record_build_snapshot(project, store, date, routes, now)
        })
    }

    /// Delete an Edited version
    ///
    /// Pages showing it move to the day's Current schedule before the version
    /// and its unassigned orders are released. A day without a Current
    /// schedule gets one first.
    ///
    /// # Errors
    /// Returns the version manager's error; pages return to the deleted version in that case
    pub fn delete_version(&mut self, id: ScheduleId, now: DateTime<Utc>) -> Result<Option<ScheduleId>, VersionError> {
        let schedule = self.project.schedule(id).ok_or(VersionError::NotFound(id))?;
        let (date, editable) = (schedule.planned_date, schedule.kind == ScheduleType::Edited);

        self.busy = true;
        let shown = self.ctx.schedule == Some(id);
        if shown && editable {
            match self.versions.ensure_current(&mut self.project, &mut self.store, date, now) {
                Ok(current) => self.show_schedule(current),
                Err(err) => {
                    self.fail(&err, None);
                    self.pump();
                    self.busy = false;
                    return Err(err);
                }
            }
        }

        let result = self.versions.delete_version(&mut self.project, &mut self.store, id);
        match &result {
            Ok(next) => {
                self.status = None;
                if let Some(next) = next.filter(|next| shown && self.ctx.schedule != Some(*next)) {
                    self.show_schedule(next);
                }
            }
            Err(err) => self.fail(err, shown.then_some(id)),
        }
        self.pump();
        self.busy = false;
        result
    }

    /// # Errors
    /// Returns the version manager's error
    pub fn rename_version(&mut self, id: ScheduleId, name: &str) -> Result<(), VersionError> {
        self.busy = true;
        let result = self.versions.rename_version(&mut self.project, &mut self.store, id, name);
        match &result {
            Ok(()) => self.status = None,
            Err(err) => self.fail(err, None),
        }
        self.pump();
        self.busy = false;
        result
    }

    /// Run an operation that yields the schedule to show next
    fn run_version_op(
        &mut self,
        op: impl FnOnce(&VersionManager, &mut Project, &mut S) -> Result<ScheduleId, VersionError>,
    ) -> Result<ScheduleId, VersionError> {
        self.busy = true;
        let previous = self.ctx.schedule;
        let result = op(&self.versions, &mut self.project, &mut self.store);
        match &result {
            Ok(id) => {
                self.status = None;
                self.show_schedule(*id);
            }
            Err(err) => self.fail(err, previous),
        }
        self.pump();
        self.busy = false;
        result
    }

    /// Report a failed version operation and show `restore` again
    fn fail(&mut self, err: &VersionError, restore: Option<ScheduleId>) {
        log::error!("Schedule operation failed: {err}");
        self.status = Some(err.to_string());
        if let Some(id) = restore.filter(|id| self.project.schedule(*id).is_some()) {
            self.show_schedule(id);
        }
    }

    // Editing

    /// Add a route to the shown schedule; a blank name is filled in on the next idle tick
    pub fn add_route(&mut self, name: &str, now: DateTime<Utc>) -> Option<RouteId> {
        let schedule = self.project.schedule(self.ctx.schedule?)?;
        if schedule.kind == ScheduleType::BuildRoutesSnapshot {
            return None;
        }
        let (schedule, color) = (schedule.id, generate_route_color(schedule.routes.len()));
        let name = name.trim();
        let id = self.project.add_route(schedule, Route::new(name, color, now))?;
        if name.is_empty() {
            self.deferred.push(DeferredTask::NameRoute(id));
        }
        self.pump();
        Some(id)
    }

    /// Add an order for the shown day; a blank name is filled in on the next idle tick
    pub fn add_order(&mut self, name: &str, point: Option<GeoPoint>) -> OrderId {
        let name = name.trim();
        let mut order = Order::new(name, Some(self.ctx.date));
        order.point = point;
        let id = self.project.add_order(order);
        if name.is_empty() {
            self.deferred.push(DeferredTask::NameOrder(id));
        }
        self.pump();
        id
    }

    /// Run the tasks queued before this tick; returns how many ran
    pub fn run_idle(&mut self) -> usize {
        let batch = self.deferred.take_batch();
        for task in &batch {
            match *task {
                DeferredTask::PruneForeignSelection(participant) => {
                    if let Err(err) = self.hub.prune_foreign(participant) {
                        crate::dev_log!("Skipping selection pruning: {}", err);
                    }
                }
                DeferredTask::NameRoute(route) => self.assign_route_name(route),
                DeferredTask::NameOrder(order) => self.assign_order_name(order),
            }
        }
        self.pump();
        batch.len()
    }

    fn assign_route_name(&mut self, id: RouteId) {
        let Some((schedule, route)) = self.project.find_route(id) else { return };
        if !route.name.is_empty() {
            return;
        }
        let name = next_default_name(
            &self.ctx.settings.default_route_prefix,
            self.project
                .schedule(schedule)
                .into_iter()
                .flat_map(|s| s.routes.iter())
                .map(|r| r.name.as_str()),
        );
        self.project.set_route_name(id, name);
    }

    fn assign_order_name(&mut self, id: OrderId) {
        if self.project.order(id).map_or(true, |order| !order.name.is_empty()) {
            return;
        }
        let name = next_default_name(
            &self.ctx.settings.default_order_prefix,
            self.project.orders().map(|o| o.name.as_str()),
        );
        self.project.set_order_name(id, name);
    }

    /// Leave every page; afterwards no subscription or participant remains
    pub fn teardown(&mut self) {
        self.drag = None;
        let pages: [&mut dyn Page; 4] = [&mut self.orders, &mut self.routes, &mut self.map, &mut self.time];
        for page in pages {
            page.exit(&mut self.registry, &mut self.hub);
        }
    }
}
