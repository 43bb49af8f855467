use indexmap::IndexSet;

use super::{DragPayload, DropPosition, DropTarget};
use crate::error::DropRejection;
use crate::models::{
    CollectionEvent, CollectionKey, EntityRef, OrderId, Project, Route, RouteId, Schedule,
    ScheduleId, ScheduleType, Stop, StopId, StopObject,
};

/// Result of a successful drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropOutcome {
    pub schedule: ScheduleId,
    /// Route that received the payload, `None` for a drop on the unassigned surface
    pub target_route: Option<RouteId>,
    /// Entities that now stand for the dragged payload
    pub selection: Vec<EntityRef>,
    /// Source routes left without stops by the move
    pub emptied_routes: Vec<RouteId>,
}

/// A schedule with the drop applied, not yet committed
struct StagedDrop {
    schedule: Schedule,
    events: Vec<CollectionEvent>,
    outcome: DropOutcome,
}

/// Whether `selection` may start a drag in `schedule`
///
/// Mixed order and stop selections are refused, as are routes, orders that
/// already have a stop, location stops, stops of locked routes and anything
/// in a build snapshot.
#[must_use]
pub fn is_drag_allowed(project: &Project, schedule: ScheduleId, selection: &[EntityRef]) -> bool {
    let Some(schedule) = project.schedule(schedule) else { return false };
    if schedule.kind == ScheduleType::BuildRoutesSnapshot {
        return false;
    }

    match DragPayload::from_selection(selection) {
        None => false,
        Some(DragPayload::Orders(orders)) => orders
            .iter()
            .all(|id| project.order(*id).is_some() && schedule.is_unassigned(*id)),
        Some(DragPayload::Stops(stops)) => stops.iter().all(|id| {
            schedule.find_stop(*id).is_some_and(|pos| {
                schedule.route(pos.route).is_some_and(|route| {
                    !route.is_locked() && matches!(route.stops[pos.index].object, StopObject::Order(_))
                })
            })
        }),
    }
}

/// Validate a drop without performing it
///
/// # Errors
/// Returns the first rule the drop violates
pub fn check_drop(
    project: &Project,
    schedule: ScheduleId,
    target: &DropTarget,
    payload: &DragPayload,
) -> Result<(), DropRejection> {
    stage(project, schedule, target, payload).map(|_| ())
}

#[must_use]
pub fn is_drop_allowed(project: &Project, schedule: ScheduleId, target: &DropTarget, payload: &DragPayload) -> bool {
    check_drop(project, schedule, target, payload).is_ok()
}

/// Move the payload onto the target
///
/// Either every payload member moves or the project is left untouched.
///
/// # Errors
/// Returns the first rule the drop violates; nothing is changed in that case
pub fn drop(
    project: &mut Project,
    schedule: ScheduleId,
    target: &DropTarget,
    payload: &DragPayload,
) -> Result<DropOutcome, DropRejection> {
    let staged = stage(project, schedule, target, payload)?;
    crate::dev_log!(
        "Dropping {} entities on {:?} in schedule {}",
        payload.len(),
        target,
        schedule
    );
    if !project.commit_schedule(staged.schedule, staged.events) {
        return Err(DropRejection::UnknownSchedule(schedule));
    }
    Ok(staged.outcome)
}

fn stage(
    project: &Project,
    schedule_id: ScheduleId,
    target: &DropTarget,
    payload: &DragPayload,
) -> Result<StagedDrop, DropRejection> {
    let source = project
        .schedule(schedule_id)
        .ok_or(DropRejection::UnknownSchedule(schedule_id))?;
    if source.kind == ScheduleType::BuildRoutesSnapshot {
        return Err(DropRejection::ImmutableSchedule(source.name.clone()));
    }
    if payload.is_empty() {
        return Err(DropRejection::EmptyPayload);
    }

    let mut staged = StagedDrop {
        schedule: source.clone(),
        events: Vec::new(),
        outcome: DropOutcome {
            schedule: schedule_id,
            target_route: None,
            selection: Vec::new(),
            emptied_routes: Vec::new(),
        },
    };

    match payload {
        DragPayload::Orders(orders) => stage_orders(project, &mut staged, target, orders)?,
        DragPayload::Stops(stops) => stage_stops(project, &mut staged, target, stops)?,
    }

    if same_assignment(source, &staged.schedule) {
        return Err(DropRejection::NoOp);
    }
    Ok(staged)
}

fn stage_orders(
    project: &Project,
    staged: &mut StagedDrop,
    target: &DropTarget,
    orders: &[OrderId],
) -> Result<(), DropRejection> {
    let day = staged.schedule.planned_date;
    // An order is served by at most one stop
    let orders: Vec<OrderId> = orders.iter().copied().collect::<IndexSet<_>>().into_iter().collect();
    let mut new_stops = Vec::with_capacity(orders.len());
    for &id in &orders {
        let order = project.order(id).ok_or(DropRejection::UnknownOrder(id))?;
        if !order.fits_date(day) {
            return Err(DropRejection::WrongDate(id));
        }
        if !staged.schedule.is_unassigned(id) {
            return Err(DropRejection::OrderAssigned(id));
        }
        new_stops.push(Stop::for_order(id, order.service_time));
    }
    if *target == DropTarget::Unassigned {
        return Err(DropRejection::AlreadyUnassigned);
    }

    let (route_id, index) = insertion_point(&staged.schedule, target)?;
    let route = staged.schedule.route(route_id).ok_or(DropRejection::UnknownTarget)?;
    check_route_accepts(project, route, &orders)?;

    if let Some(unassigned) = staged.schedule.unassigned.as_mut() {
        for id in &orders {
            unassigned.remove(*id);
        }
    }
    let added: Vec<EntityRef> = new_stops.iter().map(|s| EntityRef::Stop(s.id)).collect();
    let route = staged.schedule.route_mut(route_id).ok_or(DropRejection::UnknownTarget)?;
    route.stops.splice(index..index, new_stops);

    let schedule_id = staged.schedule.id;
    staged.events.push(CollectionEvent::removed(
        CollectionKey::Unassigned(schedule_id),
        orders.iter().copied().map(EntityRef::Order).collect(),
    ));
    staged.events.push(CollectionEvent::added(CollectionKey::Stops(route_id), added.clone()));
    staged.outcome.target_route = Some(route_id);
    staged.outcome.selection = added;
    Ok(())
}

fn stage_stops(
    project: &Project,
    staged: &mut StagedDrop,
    target: &DropTarget,
    stops: &[StopId],
) -> Result<(), DropRejection> {
    let stops: Vec<StopId> = stops.iter().copied().collect::<IndexSet<_>>().into_iter().collect();
    let stops = stops.as_slice();
    let mut orders = Vec::with_capacity(stops.len());
    let mut sources: IndexSet<RouteId> = IndexSet::new();
    for &id in stops {
        let pos = staged.schedule.find_stop(id).ok_or(DropRejection::UnknownStop(id))?;
        let route = staged.schedule.route(pos.route).ok_or(DropRejection::UnknownStop(id))?;
        let StopObject::Order(order) = route.stops[pos.index].object else {
            return Err(DropRejection::LocationStop(id));
        };
        if route.is_locked() {
            return Err(DropRejection::LockedRoute(route.name.clone()));
        }
        orders.push(order);
        sources.insert(pos.route);
    }

    if let DropTarget::Stop { stop, .. } = target {
        if stops.contains(stop) {
            return Err(DropRejection::NoOp);
        }
    }

    let schedule_id = staged.schedule.id;
    if *target == DropTarget::Unassigned {
        let detached = staged.schedule.detach_stops(stops);
        if let Some(unassigned) = staged.schedule.unassigned.as_mut() {
            for order in &orders {
                unassigned.insert(*order);
            }
        }
        push_removals(&mut staged.events, &detached);
        staged.events.push(CollectionEvent::added(
            CollectionKey::Unassigned(schedule_id),
            orders.iter().copied().map(EntityRef::Order).collect(),
        ));
        staged.outcome.selection = orders.into_iter().map(EntityRef::Order).collect();
    } else {
        // Validate the target before detaching so a bad target leaves the copy intact
        let (target_route, _) = insertion_point(&staged.schedule, target)?;
        let route = staged.schedule.route(target_route).ok_or(DropRejection::UnknownTarget)?;
        check_route_accepts(project, route, &orders)?;

        let detached = staged.schedule.detach_stops(stops);
        let (route_id, index) = insertion_point(&staged.schedule, target)?;
        push_removals(&mut staged.events, &detached);
        let moved: Vec<Stop> = detached.into_iter().map(|(_, stop)| stop).collect();
        let added: Vec<EntityRef> = moved.iter().map(|s| EntityRef::Stop(s.id)).collect();
        let route = staged.schedule.route_mut(route_id).ok_or(DropRejection::UnknownTarget)?;
        route.stops.splice(index..index, moved);

        staged.events.push(CollectionEvent::added(CollectionKey::Stops(route_id), added.clone()));
        staged.outcome.target_route = Some(route_id);
        staged.outcome.selection = added;
    }

    staged.outcome.emptied_routes = sources
        .into_iter()
        .filter(|id| Some(*id) != staged.outcome.target_route)
        .filter(|id| staged.schedule.route(*id).is_some_and(|r| r.stops.is_empty()))
        .collect();
    Ok(())
}

/// Route and index at which dropped stops are inserted
fn insertion_point(schedule: &Schedule, target: &DropTarget) -> Result<(RouteId, usize), DropRejection> {
    match target {
        DropTarget::Route(id) => schedule
            .route(*id)
            .map(|route| (route.id, route.stops.len()))
            .ok_or(DropRejection::UnknownTarget),
        DropTarget::Stop { stop, position } => {
            let pos = schedule.find_stop(*stop).ok_or(DropRejection::UnknownTarget)?;
            let index = match position {
                DropPosition::Before => pos.index,
                DropPosition::After => pos.index + 1,
            };
            Ok((pos.route, index))
        }
        DropTarget::Unassigned => Err(DropRejection::UnknownTarget),
    }
}

/// Lock and hard-zone rules of the receiving route
fn check_route_accepts(project: &Project, route: &Route, orders: &[OrderId]) -> Result<(), DropRejection> {
    if route.is_locked() {
        return Err(DropRejection::LockedRoute(route.name.clone()));
    }

    let zones = route.hard_zones();
    if zones.is_empty() {
        return Ok(());
    }
    for &id in orders {
        let point = project.order(id).and_then(|order| order.point);
        let inside = point.is_some_and(|point| {
            zones
                .iter()
                .filter_map(|zone| project.zone(*zone))
                .any(|zone| zone.contains(point))
        });
        if !inside {
            return Err(DropRejection::ZoneViolation {
                order: id,
                route: route.name.clone(),
            });
        }
    }
    Ok(())
}

fn push_removals(events: &mut Vec<CollectionEvent>, detached: &[(RouteId, Stop)]) {
    let mut by_route: Vec<(RouteId, Vec<EntityRef>)> = Vec::new();
    for (route, stop) in detached {
        match by_route.iter_mut().find(|(id, _)| id == route) {
            Some((_, removed)) => removed.push(EntityRef::Stop(stop.id)),
            None => by_route.push((*route, vec![EntityRef::Stop(stop.id)])),
        }
    }
    for (route, removed) in by_route {
        events.push(CollectionEvent::removed(CollectionKey::Stops(route), removed));
    }
}

/// True if both schedules have identical stop sequences and unassigned orders
fn same_assignment(before: &Schedule, after: &Schedule) -> bool {
    before.routes.len() == after.routes.len()
        && before
            .routes
            .iter()
            .zip(&after.routes)
            .all(|(a, b)| a.id == b.id && a.stop_ids() == b.stop_ids())
        && before.unassigned_orders().eq(after.unassigned_orders())
}
