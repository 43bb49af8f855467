use chrono::{DateTime, Duration, Utc};

use super::{DragPayload, DropTarget};
use crate::models::{RouteId, ScheduleId};

/// Debounced auto-expand of a hovered route
///
/// Polled with [`DwellTimer::tick`]; fires at most once per hover.
#[derive(Debug, Clone)]
pub struct DwellTimer {
    interval: Duration,
    armed: Option<(RouteId, DateTime<Utc>)>,
}

impl DwellTimer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval, armed: None }
    }

    /// Start timing `route`, unless it is already being timed
    pub fn hover(&mut self, route: RouteId, now: DateTime<Utc>) {
        if self.armed.is_some_and(|(armed, _)| armed == route) {
            return;
        }
        self.armed = Some((route, now));
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// The route to expand, once the dwell interval has elapsed
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<RouteId> {
        let (route, since) = self.armed?;
        if now - since < self.interval {
            return None;
        }
        self.armed = None;
        Some(route)
    }
}

/// State of one drag gesture, from drag start to drop or cancel
#[derive(Debug, Clone)]
pub struct DragSession {
    payload: DragPayload,
    schedule: ScheduleId,
    timer: DwellTimer,
    hovered: Option<DropTarget>,
    auto_expanded: Vec<RouteId>,
}

impl DragSession {
    #[must_use]
    pub fn new(payload: DragPayload, schedule: ScheduleId, dwell: Duration) -> Self {
        Self {
            payload,
            schedule,
            timer: DwellTimer::new(dwell),
            hovered: None,
            auto_expanded: Vec::new(),
        }
    }

    #[must_use]
    pub const fn payload(&self) -> &DragPayload {
        &self.payload
    }

    #[must_use]
    pub const fn schedule(&self) -> ScheduleId {
        self.schedule
    }

    #[must_use]
    pub const fn hovered(&self) -> Option<DropTarget> {
        self.hovered
    }

    /// Routes expanded by the dwell timer during this session
    #[must_use]
    pub fn auto_expanded(&self) -> &[RouteId] {
        &self.auto_expanded
    }

    #[must_use]
    pub const fn is_timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    /// Pointer moved over `target`; `collapsed` tells whether a route target hides its stops
    pub fn drag_over(&mut self, target: Option<DropTarget>, collapsed: bool, now: DateTime<Utc>) {
        self.hovered = target;
        match target.and_then(|t| t.route()) {
            Some(route) if collapsed => self.timer.hover(route, now),
            _ => self.timer.cancel(),
        }
    }

    /// Pointer left the drop surface
    pub fn drag_leave(&mut self) {
        self.hovered = None;
        self.timer.cancel();
    }

    /// Route whose detail should expand now, if the dwell interval elapsed
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<RouteId> {
        let route = self.timer.tick(now)?;
        if !self.auto_expanded.contains(&route) {
            self.auto_expanded.push(route);
        }
        Some(route)
    }

    /// End the session, returning the routes it expanded
    #[must_use]
    pub fn finish(self) -> Vec<RouteId> {
        self.auto_expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderId;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    fn session() -> DragSession {
        DragSession::new(
            DragPayload::Orders(vec![OrderId::new()]),
            ScheduleId::new(),
            Duration::milliseconds(750),
        )
    }

    #[test]
    fn test_timer_fires_once_after_interval() {
        let mut timer = DwellTimer::new(Duration::milliseconds(750));
        let route = RouteId::new();
        timer.hover(route, start());
        assert_eq!(timer.tick(start() + Duration::milliseconds(700)), None);
        assert_eq!(timer.tick(start() + Duration::milliseconds(750)), Some(route));
        assert_eq!(timer.tick(start() + Duration::milliseconds(2000)), None);
    }

    #[test]
    fn test_hovering_same_route_keeps_start_time() {
        let mut timer = DwellTimer::new(Duration::milliseconds(750));
        let route = RouteId::new();
        timer.hover(route, start());
        timer.hover(route, start() + Duration::milliseconds(500));
        assert_eq!(timer.tick(start() + Duration::milliseconds(800)), Some(route));
    }

    #[test]
    fn test_leaving_cancels_expand() {
        let mut session = session();
        let route = RouteId::new();
        session.drag_over(Some(DropTarget::Route(route)), true, start());
        session.drag_leave();
        assert_eq!(session.tick(start() + Duration::seconds(1)), None);
        assert!(session.auto_expanded().is_empty());
    }

    #[test]
    fn test_expanded_route_or_other_target_does_not_arm() {
        let mut session = session();
        let route = RouteId::new();
        session.drag_over(Some(DropTarget::Route(route)), false, start());
        assert!(!session.is_timer_armed());
        session.drag_over(Some(DropTarget::Unassigned), true, start());
        assert!(!session.is_timer_armed());
    }

    #[test]
    fn test_switching_route_restarts_timer() {
        let mut session = session();
        let first = RouteId::new();
        let second = RouteId::new();
        session.drag_over(Some(DropTarget::Route(first)), true, start());
        session.drag_over(Some(DropTarget::Route(second)), true, start() + Duration::milliseconds(600));
        assert_eq!(session.tick(start() + Duration::milliseconds(800)), None);
        assert_eq!(session.tick(start() + Duration::milliseconds(1400)), Some(second));
        assert_eq!(session.finish(), vec![second]);
    }
}
